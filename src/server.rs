//! Request dispatch: one JSON line in, one JSON line out.

use invite_core::InviteResult;
use invite_core::invite::InviteService;
use invite_core::protocol::{
    Command, CreateNote, ListNotes, PreviewInvite, ReadNote, Request, Response,
    SendInvite,
};
use invite_core::transport::MailTransport;
use invite_core::vault::NoteVault;
use serde::Serialize;

pub struct Server<T> {
    /// The configuration error, when invites could not be set up. Vault
    /// commands keep working either way.
    invites: InviteResult<InviteService<T>>,
    vault: NoteVault,
}

impl<T: MailTransport> Server<T> {
    pub fn new(invites: InviteResult<InviteService<T>>, vault: NoteVault) -> Self {
        Server { invites, vault }
    }

    fn invites(&self) -> Result<&InviteService<T>, String> {
        self.invites.as_ref().map_err(|e| e.to_string())
    }

    /// Handle one input line. Blank lines produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => return Some(Response::error(&format!("Failed to parse request: {}", e))),
        };

        Some(self.handle_request(request).await)
    }

    pub async fn handle_request(&self, request: Request) -> String {
        tracing::debug!(command = ?request.command, "handling request");

        match request.command {
            Command::SendInvite => self.handle_send_invite(&request).await,
            Command::PreviewInvite => match self.invites() {
                Ok(invites) => respond(
                    request
                        .params::<PreviewInvite>()
                        .and_then(|p| invites.preview_invite(&p.invite)),
                ),
                Err(e) => Response::error(&e),
            },
            Command::ReadNote => respond(
                request
                    .params::<ReadNote>()
                    .and_then(|p| self.vault.read_note(&p.note_name))
                    .map(|note| note.to_string()),
            ),
            Command::CreateNote => respond(
                request
                    .params::<CreateNote>()
                    .and_then(|p| {
                        self.vault
                            .create_note(&p.title, &p.content, &p.folder, &p.tags, p.note_type)
                    })
                    .map(|note| note.to_string()),
            ),
            Command::ListNotes => respond(
                request
                    .params::<ListNotes>()
                    .and_then(|p| self.vault.list_notes(&p.folder, p.limit))
                    .map(|listing| listing.to_string()),
            ),
            // Takes no params; whatever was sent is ignored.
            Command::VaultInfo => respond(self.vault.info()),
        }
    }

    async fn handle_send_invite(&self, request: &Request) -> String {
        let invites = match self.invites() {
            Ok(invites) => invites,
            Err(e) => return Response::error(&e),
        };
        let params: SendInvite = match request.params() {
            Ok(p) => p,
            Err(e) => return Response::error(&e.to_string()),
        };

        // Delivery failures are part of the report, not protocol errors.
        Response::success(invites.send_invite(&params).await)
    }
}

fn respond<R: Serialize>(result: InviteResult<R>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::error(&e.to_string()),
    }
}
