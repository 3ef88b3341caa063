//! Mail delivery behind a narrow session interface.
//!
//! The invite service only ever talks to [`MailTransport`], so delivery can
//! run against the real SMTP relay or against a fake in tests.

mod smtp;

use lettre::Message;

use crate::config::Credentials;
use crate::error::InviteResult;

pub use smtp::{SmtpRelay, SmtpSession};

/// Something that can open a mail session.
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    type Session: MailSession;

    async fn open(&self) -> InviteResult<Self::Session>;
}

/// One session with a mail relay: authenticate, send, close.
#[allow(async_fn_in_trait)]
pub trait MailSession {
    async fn authenticate(&mut self, credentials: &Credentials) -> InviteResult<()>;

    async fn send(&mut self, message: &Message) -> InviteResult<()>;

    async fn close(self) -> InviteResult<()>;
}

/// Deliver `message` in a single attempt.
///
/// The session is closed whether or not sending succeeded. A failure to
/// close after a successful send is logged and does not fail the delivery.
pub async fn deliver<T: MailTransport>(
    transport: &T,
    credentials: &Credentials,
    message: &Message,
) -> InviteResult<()> {
    let mut session = transport.open().await?;

    let outcome = match session.authenticate(credentials).await {
        Ok(()) => session.send(message).await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close mail session");
    }

    outcome
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::InviteError;

    /// Records every session call; optionally rejects authentication.
    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub calls: Arc<Mutex<Vec<&'static str>>>,
        pub sent: Arc<Mutex<Vec<Message>>>,
        pub reject_auth: Option<String>,
    }

    impl FakeTransport {
        pub fn rejecting_auth(reason: &str) -> Self {
            FakeTransport {
                reject_auth: Some(reason.to_string()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        pub fn sent(&self) -> Vec<Message> {
            self.sent.lock().unwrap().clone()
        }
    }

    pub struct FakeSession {
        transport: FakeTransport,
    }

    impl MailTransport for FakeTransport {
        type Session = FakeSession;

        async fn open(&self) -> InviteResult<FakeSession> {
            self.calls.lock().unwrap().push("open");
            Ok(FakeSession {
                transport: self.clone(),
            })
        }
    }

    impl MailSession for FakeSession {
        async fn authenticate(&mut self, _credentials: &Credentials) -> InviteResult<()> {
            self.transport.calls.lock().unwrap().push("authenticate");
            match self.transport.reject_auth {
                Some(ref reason) => Err(InviteError::DeliveryFailure(reason.clone())),
                None => Ok(()),
            }
        }

        async fn send(&mut self, message: &Message) -> InviteResult<()> {
            self.transport.calls.lock().unwrap().push("send");
            self.transport.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn close(self) -> InviteResult<()> {
            self.transport.calls.lock().unwrap().push("close");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use crate::message::build_invite_message;

    fn message() -> Message {
        build_invite_message(
            "organizer@example.com",
            &["alice@example.com".to_string()],
            "Subject",
            "Body".to_string(),
            "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn delivery_runs_the_full_session() {
        let transport = FakeTransport::default();
        let creds = Credentials::new("organizer@example.com", "secret");

        deliver(&transport, &creds, &message()).await.unwrap();

        assert_eq!(transport.calls(), vec!["open", "authenticate", "send", "close"]);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn rejected_login_still_closes_the_session() {
        let transport = FakeTransport::rejecting_auth("535 5.7.8 Username and Password not accepted");
        let creds = Credentials::new("organizer@example.com", "wrong");

        let err = deliver(&transport, &creds, &message()).await.unwrap_err();

        assert!(err.to_string().contains("535 5.7.8"));
        assert_eq!(transport.calls(), vec!["open", "authenticate", "close"]);
        assert!(transport.sent().is_empty());
    }
}
