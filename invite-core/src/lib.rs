//! Core of invite-server.
//!
//! This crate provides everything behind the server's tools:
//! - `invite` for routing, composing and delivering calendar invites
//! - `ics` for writing and reading the iCalendar payload
//! - `vault` for the markdown notes folder
//! - `protocol` for the JSON request/response types spoken over stdio

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod invite;
pub mod message;
pub mod protocol;
pub mod router;
pub mod time_window;
pub mod transport;
pub mod vault;

pub use error::{InviteError, InviteResult};
