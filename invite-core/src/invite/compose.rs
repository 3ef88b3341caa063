//! Turns caller arguments into an invite payload.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::config::CalendarSettings;
use crate::error::InviteResult;
use crate::event::{InviteEvent, Organizer};
use crate::ics::generate_ics;
use crate::message::fallback_body;
use crate::protocol::SendInvite;
use crate::time_window::{TimeWindow, compact_stamp};

/// A composed invite, ready to be wrapped in a mail.
#[derive(Debug, Clone)]
pub struct ComposedInvite {
    pub event: InviteEvent,
    pub payload: String,
    pub plain_body: String,
}

#[derive(Debug, Clone)]
pub struct InviteComposer {
    tz: Tz,
    product_id: String,
    organizer_name: Option<String>,
}

impl InviteComposer {
    pub fn new(settings: &CalendarSettings) -> InviteResult<Self> {
        Ok(InviteComposer {
            tz: settings.tz()?,
            product_id: settings.product_id.clone(),
            organizer_name: settings.organizer_name.clone(),
        })
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Compose the payload. Only an unparseable date/time can fail.
    pub fn compose(
        &self,
        request: &SendInvite,
        organizer_email: &str,
        attendees: &[String],
        now: DateTime<Utc>,
    ) -> InviteResult<ComposedInvite> {
        let window = TimeWindow::parse(&request.date, &request.time, self.tz)?;
        let description = request.description.effective().to_string();

        let event = InviteEvent {
            uid: new_uid(organizer_email),
            summary: request.subject.clone(),
            description: description.clone(),
            location: request.location.clone().filter(|l| !l.trim().is_empty()),
            window,
            stamp: compact_stamp(now, self.tz),
            organizer: Organizer {
                email: organizer_email.to_string(),
                name: self.organizer_name.clone(),
            },
            attendees: attendees.to_vec(),
        };

        let payload = generate_ics(&event, &self.product_id);
        let plain_body = fallback_body(&request.title, &description);

        Ok(ComposedInvite {
            event,
            payload,
            plain_body,
        })
    }
}

/// Random UID qualified by the organizer's mail domain.
fn new_uid(organizer_email: &str) -> String {
    let domain = organizer_email
        .rsplit_once('@')
        .map(|(_, d)| d)
        .filter(|d| !d.is_empty())
        .unwrap_or("localhost");
    format!("{}@{}", Uuid::new_v4(), domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InviteError;
    use crate::invite::Description;
    use chrono::TimeZone;

    fn composer() -> InviteComposer {
        InviteComposer::new(&CalendarSettings {
            organizer_name: Some("Hiring Team".into()),
            ..Default::default()
        })
        .unwrap()
    }

    fn request(description: Description) -> SendInvite {
        SendInvite {
            category: "recruiter-call".into(),
            subject: "The recruiter call is scheduled for Ramani".into(),
            title: "Recruiter call".into(),
            date: "2025-09-25".into(),
            time: "12:30 PM".into(),
            description,
            location: None,
        }
    }

    fn attendees() -> Vec<String> {
        vec!["alice@example.com".into(), "bob@example.com".into()]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 20, 17, 15, 0).unwrap()
    }

    /// Unfolded lines that start with `prefix`.
    fn lines_with(payload: &str, prefix: &str) -> Vec<String> {
        payload
            .replace("\r\n ", "")
            .split("\r\n")
            .filter(|l| l.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn window_and_stamp_are_in_reference_zone() {
        let composed = composer()
            .compose(
                &request(Description::Text("Details".into())),
                "organizer@example.com",
                &attendees(),
                now(),
            )
            .unwrap();

        assert!(composed
            .payload
            .contains("DTSTART;TZID=America/Los_Angeles:20250925T123000\r\n"));
        assert!(composed
            .payload
            .contains("DTEND;TZID=America/Los_Angeles:20250925T133000\r\n"));
        // 17:15 UTC is 10:15 PDT
        assert_eq!(composed.event.stamp, "20250920T101500");
        assert!(composed.payload.contains("DTSTAMP:20250920T101500\r\n"));
    }

    #[test]
    fn repeated_composition_differs_only_in_uid() {
        let c = composer();
        let req = request(Description::Text("Details".into()));
        let first = c.compose(&req, "organizer@example.com", &attendees(), now()).unwrap();
        let second = c.compose(&req, "organizer@example.com", &attendees(), now()).unwrap();

        assert_ne!(first.event.uid, second.event.uid);
        assert!(first.event.uid.ends_with("@example.com"));

        for prefix in ["DTSTART", "DTEND", "ATTENDEE"] {
            assert_eq!(
                lines_with(&first.payload, prefix),
                lines_with(&second.payload, prefix)
            );
        }

        let without_uid = |p: &str| p.replace(&lines_with(p, "UID:")[0], "");
        assert_eq!(without_uid(&first.payload), without_uid(&second.payload));
    }

    #[test]
    fn list_description_uses_last_element() {
        let composed = composer()
            .compose(
                &request(Description::Parts(vec![
                    "first draft".into(),
                    "final wording".into(),
                ])),
                "organizer@example.com",
                &attendees(),
                now(),
            )
            .unwrap();

        assert_eq!(composed.event.description, "final wording");
        assert!(composed.payload.contains("DESCRIPTION:final wording\r\n"));
        assert!(!composed.payload.contains("first draft"));
        assert!(composed.plain_body.ends_with("final wording"));
    }

    #[test]
    fn bad_time_fails_composition() {
        let mut req = request(Description::Text("Details".into()));
        req.time = "12:30".into();

        let err = composer()
            .compose(&req, "organizer@example.com", &attendees(), now())
            .unwrap_err();
        assert!(matches!(err, InviteError::InvalidDateTime(_)));
    }

    #[test]
    fn blank_location_is_dropped() {
        let mut req = request(Description::Text("Details".into()));
        req.location = Some("   ".into());

        let composed = composer()
            .compose(&req, "organizer@example.com", &attendees(), now())
            .unwrap();
        assert_eq!(composed.event.location, None);
    }
}
