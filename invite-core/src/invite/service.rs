//! One invite call: route, compose, build the mail, deliver, report.

use chrono::Utc;

use super::{DeliveryReport, InviteComposer, InvitePreview};
use crate::config::{CredentialVars, Credentials, ServerConfig};
use crate::error::InviteResult;
use crate::ics::parse_invite;
use crate::message::build_invite_message;
use crate::protocol::SendInvite;
use crate::router::RecipientRouter;
use crate::transport::{MailTransport, deliver};

type CredentialLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct InviteService<T> {
    router: RecipientRouter,
    composer: InviteComposer,
    credential_vars: CredentialVars,
    lookup: CredentialLookup,
    transport: T,
}

impl<T: MailTransport> InviteService<T> {
    pub fn new(config: &ServerConfig, transport: T) -> InviteResult<Self> {
        Ok(Self::from_parts(
            RecipientRouter::new(config.routes.clone())?,
            InviteComposer::new(&config.calendar)?,
            config.credentials.clone(),
            transport,
        ))
    }

    /// Credentials are read from the process environment.
    pub fn from_parts(
        router: RecipientRouter,
        composer: InviteComposer,
        credential_vars: CredentialVars,
        transport: T,
    ) -> Self {
        InviteService {
            router,
            composer,
            credential_vars,
            lookup: Box::new(|key: &str| std::env::var(key).ok()),
            transport,
        }
    }

    /// Replace where credential variables are looked up.
    pub fn with_credential_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn credentials(&self) -> InviteResult<Credentials> {
        Credentials::from_lookup(&self.credential_vars, &self.lookup)
    }

    /// Send an invite. Every failure is folded into the report.
    pub async fn send_invite(&self, request: &SendInvite) -> DeliveryReport {
        match self.try_send(request).await {
            Ok(recipients) => {
                tracing::info!(recipients = recipients.len(), "invite sent");
                DeliveryReport::delivered(&recipients)
            }
            Err(e) => {
                tracing::warn!(error = %e, category = %request.category, "invite not sent");
                DeliveryReport::failed(&e)
            }
        }
    }

    async fn try_send(&self, request: &SendInvite) -> InviteResult<Vec<String>> {
        let (category, attendees) = self.router.route(&request.category)?;
        let credentials = self.credentials()?;

        let composed =
            self.composer
                .compose(request, &credentials.address, attendees, Utc::now())?;

        let message = build_invite_message(
            &credentials.address,
            attendees,
            &request.subject,
            composed.plain_body,
            composed.payload,
        )?;

        tracing::info!(
            category = %category,
            uid = %composed.event.uid,
            start = %composed.event.window.start_stamp(),
            "delivering invite"
        );

        deliver(&self.transport, &credentials, &message).await?;

        Ok(attendees.to_vec())
    }

    /// Compose the invite a `send_invite` call would send, without sending.
    pub fn preview_invite(&self, request: &SendInvite) -> InviteResult<InvitePreview> {
        let (category, attendees) = self.router.route(&request.category)?;
        let credentials = self.credentials()?;

        let composed =
            self.composer
                .compose(request, &credentials.address, attendees, Utc::now())?;

        Ok(InvitePreview {
            category,
            recipients: attendees.to_vec(),
            summary: parse_invite(&composed.payload),
            payload: composed.payload,
        })
    }
}
