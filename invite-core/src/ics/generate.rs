//! ICS payload generation for invites.

use chrono::Datelike;
use icalendar::{Calendar, Component, EventLike, Property};

use super::timezone::vtimezone;
use crate::event::InviteEvent;

/// Generate the REQUEST calendar document for an invite.
pub fn generate_ics(event: &InviteEvent, product_id: &str) -> String {
    let window = &event.window;
    let tzid = window.tz().name();

    let mut cal = Calendar::empty();
    cal.append_property(Property::new("PRODID", product_id));
    cal.append_property(Property::new("VERSION", "2.0"));
    cal.append_property(Property::new("CALSCALE", "GREGORIAN"));
    cal.append_property(Property::new("METHOD", "REQUEST"));

    cal.push(vtimezone(window.tz(), window.start.year()));

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.summary);
    ics_event.description(&event.description);

    ics_event.add_property("DTSTAMP", &event.stamp);
    ics_event.add_property("CREATED", &event.stamp);
    ics_event.add_property("LAST-MODIFIED", &event.stamp);

    add_zoned_property(&mut ics_event, "DTSTART", tzid, &window.start_stamp());
    if window.end_is_repeated_wall_clock() {
        ics_event.add_property("DTEND", window.end_utc_stamp());
    } else {
        add_zoned_property(&mut ics_event, "DTEND", tzid, &window.end_stamp());
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    ics_event.add_property("SEQUENCE", "0");
    ics_event.add_property("STATUS", "CONFIRMED");
    ics_event.add_property("TRANSP", "OPAQUE");

    // ORGANIZER
    let mut prop = Property::new("ORGANIZER", format!("mailto:{}", event.organizer.email));
    if let Some(ref name) = event.organizer.name {
        // DQUOTE cannot appear in a parameter value
        let name: String = name.chars().filter(|c| *c != '"').collect();
        prop.add_parameter("CN", &name);
    }
    ics_event.append_property(prop);

    // ATTENDEE - one line per address
    for email in &event.attendees {
        let mut prop = Property::new("ATTENDEE", format!("mailto:{}", email));
        prop.add_parameter("CUTYPE", "INDIVIDUAL");
        prop.add_parameter("ROLE", "REQ-PARTICIPANT");
        prop.add_parameter("PARTSTAT", "NEEDS-ACTION");
        prop.add_parameter("RSVP", "TRUE");
        prop.add_parameter("X-NUM-GUESTS", "0");
        ics_event.append_multi_property(prop);
    }

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    strip_timezone_stamps(&cal.to_string())
}

fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, tzid: &str, stamp: &str) {
    let mut prop = Property::new(name, stamp);
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

/// Remove the DTSTAMP and UID lines the icalendar crate adds to every
/// component, which VTIMEZONE and its observances must not carry.
fn strip_timezone_stamps(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_vtimezone = false;

    for line in ics.lines() {
        if line == "BEGIN:VTIMEZONE" {
            in_vtimezone = true;
        } else if line == "END:VTIMEZONE" {
            in_vtimezone = false;
        }

        if in_vtimezone && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
