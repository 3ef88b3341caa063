//! ICS payload generation and parsing.
//!
//! This module writes and reads invite payloads according to RFC 5545.

mod generate;
mod parse;
mod timezone;

pub use generate::generate_ics;
pub use parse::{PayloadSummary, parse_invite};
pub use timezone::{Observance, observances, vtimezone};
