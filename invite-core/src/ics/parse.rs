//! Reading an invite payload back, using the icalendar crate's parser.

use icalendar::parser::{Property, read_calendar, unfold};
use serde::{Deserialize, Serialize};

/// The fields of an invite payload a caller may want to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSummary {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    /// Compact local start, e.g. 20250925T123000
    pub start: String,
    /// Compact local end, or UTC with a trailing Z when the local form
    /// would be ambiguous.
    pub end: String,
    pub timezone: Option<String>,
    pub organizer: Option<String>,
    pub attendees: Vec<String>,
}

/// Parse ICS content into a PayloadSummary
pub fn parse_invite(content: &str) -> Option<PayloadSummary> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vevent = calendar.components.iter().find(|c| c.name == "VEVENT")?;

    let uid = vevent.find_prop("UID")?.val.to_string();
    let dtstart = vevent.find_prop("DTSTART")?;
    let start = dtstart.val.to_string();
    let end = vevent.find_prop("DTEND")?.val.to_string();

    let timezone = dtstart
        .params
        .iter()
        .find(|p| p.key == "TZID")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()));

    // The parser has already unescaped TEXT values.
    let text = |name: &str| vevent.find_prop(name).map(|p| p.val.to_string());

    let organizer = vevent.find_prop("ORGANIZER").map(mailto_address);
    let attendees = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(mailto_address)
        .collect();

    Some(PayloadSummary {
        uid,
        summary: text("SUMMARY").unwrap_or_default(),
        description: text("DESCRIPTION").unwrap_or_default(),
        location: text("LOCATION"),
        start,
        end,
        timezone,
        organizer,
        attendees,
    })
}

fn mailto_address(prop: &Property) -> String {
    let val = prop.val.as_ref();
    val.strip_prefix("mailto:")
        .or_else(|| val.strip_prefix("MAILTO:"))
        .unwrap_or(val)
        .to_string()
}
