//! MIME assembly of an invite mail.
//!
//! ```text
//! multipart/mixed
//! └── multipart/alternative
//!     ├── text/plain      fallback body
//!     └── text/calendar   the REQUEST payload (invite.ics)
//! ```

use lettre::Message;
use lettre::message::header::{ContentDisposition, ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart, SinglePart};

use crate::error::{InviteError, InviteResult};

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; method=REQUEST; name=invite.ics; charset=utf-8";
const ATTACHMENT_NAME: &str = "invite.ics";

/// `Content-Class` header that marks the part as a meeting request for
/// Outlook-family clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentClass(String);

impl ContentClass {
    pub fn calendar_message() -> Self {
        ContentClass("urn:content-classes:calendarmessage".to_string())
    }
}

impl Header for ContentClass {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Class")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(ContentClass(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Plain-text body shown by clients that do not render calendar parts.
pub fn fallback_body(title: &str, description: &str) -> String {
    format!("You have been invited to: {} \n {}", title, description)
}

/// Build the mail carrying `payload` to every attendee as a direct recipient.
pub fn build_invite_message(
    sender: &str,
    attendees: &[String],
    subject: &str,
    plain_body: String,
    payload: String,
) -> InviteResult<Message> {
    let from: Mailbox = parse_mailbox(sender)?;

    let mut builder = Message::builder().from(from).subject(subject);
    for attendee in attendees {
        builder = builder.to(parse_mailbox(attendee)?);
    }

    let content_type = ContentType::parse(CALENDAR_CONTENT_TYPE)
        .map_err(|e| InviteError::DeliveryFailure(format!("Invalid content type: {}", e)))?;

    let calendar_part = SinglePart::builder()
        .header(content_type)
        .header(ContentDisposition::inline_with_name(ATTACHMENT_NAME))
        .header(ContentClass::calendar_message())
        .body(payload);

    let body = MultiPart::mixed().multipart(
        MultiPart::alternative()
            .singlepart(SinglePart::plain(plain_body))
            .singlepart(calendar_part),
    );

    builder
        .multipart(body)
        .map_err(|e| InviteError::DeliveryFailure(format!("Could not build message: {}", e)))
}

fn parse_mailbox(address: &str) -> InviteResult<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| InviteError::DeliveryFailure(format!("Invalid address '{}': {}", address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendees() -> Vec<String> {
        vec!["alice@example.com".to_string(), "bob@example.com".to_string()]
    }

    fn build() -> Message {
        build_invite_message(
            "organizer@example.com",
            &attendees(),
            "Recruiter call for Ramani",
            fallback_body("Recruiter call", "Details inside"),
            "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn every_attendee_is_an_envelope_recipient() {
        let message = build();
        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();

        assert_eq!(to, attendees());
        assert_eq!(
            message.envelope().from().map(|a| a.to_string()).as_deref(),
            Some("organizer@example.com")
        );
    }

    #[test]
    fn calendar_part_has_invite_headers() {
        let formatted = String::from_utf8(build().formatted()).unwrap();

        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/calendar; method=REQUEST"));
        assert!(formatted.contains("Content-Class: urn:content-classes:calendarmessage"));
        assert!(formatted.contains("invite.ics"));
        assert!(formatted.contains("Subject: Recruiter call for Ramani"));
    }

    #[test]
    fn fallback_body_mentions_title() {
        assert_eq!(
            fallback_body("Technical call", "Bring a laptop"),
            "You have been invited to: Technical call \n Bring a laptop"
        );
    }

    #[test]
    fn malformed_recipient_is_a_delivery_failure() {
        let err = build_invite_message(
            "organizer@example.com",
            &["not an address".to_string()],
            "s",
            "b".to_string(),
            "p".to_string(),
        )
        .unwrap_err();

        assert!(matches!(err, InviteError::DeliveryFailure(ref m) if m.contains("not an address")));
    }
}
