//! The calendar event carried by an invite.

use serde::{Deserialize, Serialize};

use crate::time_window::TimeWindow;

/// Everything the payload generator needs for one invite.
#[derive(Debug, Clone)]
pub struct InviteEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    pub window: TimeWindow,
    /// Creation stamp, reused for DTSTAMP, CREATED and LAST-MODIFIED.
    pub stamp: String,
    pub organizer: Organizer,
    pub attendees: Vec<String>,
}

/// Event organizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    /// Email address
    pub email: String,
    /// Display name
    pub name: Option<String>,
}
