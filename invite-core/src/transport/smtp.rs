//! SMTP relay transport (STARTTLS submission) backed by lettre.

use std::time::Duration;

use lettre::transport::smtp::AsyncSmtpTransportBuilder;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailSession, MailTransport};
use crate::config::{Credentials, RelayConfig};
use crate::error::{InviteError, InviteResult};

/// A mail relay reached over the submission port with STARTTLS.
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    timeout: Option<Duration>,
}

impl SmtpRelay {
    pub fn new(config: &RelayConfig) -> Self {
        SmtpRelay {
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// lettre connects, upgrades to TLS and logs in when a message is sent, so
/// the wire session lives entirely inside [`MailSession::send`]. Without
/// connection pooling the connection is closed right after the message.
pub struct SmtpSession {
    builder: Option<AsyncSmtpTransportBuilder>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl MailTransport for SmtpRelay {
    type Session = SmtpSession;

    async fn open(&self) -> InviteResult<SmtpSession> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| InviteError::DeliveryFailure(e.to_string()))?
            .port(self.port);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(Some(timeout));
        }

        tracing::debug!(relay = %self.endpoint(), "opening SMTP session");

        Ok(SmtpSession {
            builder: Some(builder),
            transport: None,
        })
    }
}

impl MailSession for SmtpSession {
    async fn authenticate(&mut self, credentials: &Credentials) -> InviteResult<()> {
        let builder = self.builder.take().ok_or_else(|| {
            InviteError::DeliveryFailure("SMTP session already authenticated".into())
        })?;

        let smtp_credentials = SmtpCredentials::new(
            credentials.address.clone(),
            credentials.secret().to_string(),
        );
        self.transport = Some(builder.credentials(smtp_credentials).build());

        Ok(())
    }

    async fn send(&mut self, message: &Message) -> InviteResult<()> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            InviteError::DeliveryFailure("SMTP session is not authenticated".into())
        })?;

        let response = transport
            .send(message.clone())
            .await
            .map_err(|e| InviteError::DeliveryFailure(e.to_string()))?;

        tracing::debug!(code = %response.code(), "relay accepted message");
        Ok(())
    }

    async fn close(mut self) -> InviteResult<()> {
        self.transport.take();
        Ok(())
    }
}
