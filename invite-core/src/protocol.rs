//! Defines the JSON protocol spoken between an assistant host and
//! invite-server over stdin/stdout.
//!
//! One request per line in, one response per line out.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{InviteError, InviteResult};
use crate::invite::{Description, DeliveryReport, InvitePreview};
use crate::vault::{NoteType, VaultInfo};

pub trait ToolCommand: Serialize + DeserializeOwned {
    type Response: Serialize + DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    SendInvite,
    PreviewInvite,
    ReadNote,
    CreateNote,
    ListNotes,
    VaultInfo,
}

/// Request sent from the host to the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    /// Build a request for a typed command.
    pub fn new<C: ToolCommand>(cmd: &C) -> InviteResult<Self> {
        let params =
            serde_json::to_value(cmd).map_err(|e| InviteError::Serialization(e.to_string()))?;
        Ok(Request {
            command: C::command(),
            params,
        })
    }

    /// Decode the params of this request as the given command.
    pub fn params<C: ToolCommand>(&self) -> InviteResult<C> {
        serde_json::from_value(self.params.clone())
            .map_err(|e| InviteError::Serialization(format!("Invalid params: {}", e)))
    }
}

/// Response sent from the server to the host.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap_or_else(|e| {
            Response::error(&format!("Failed to serialize response: {}", e))
        })
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

// ============================================================================
// Invite commands
// ============================================================================

/// Send a calendar invite to the attendees routed by `category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendInvite {
    /// Category tag, e.g. "recruiter-call" or "technical-call".
    #[serde(alias = "interview_type")]
    pub category: String,
    pub subject: String,
    pub title: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM AM/PM
    pub time: String,
    #[serde(alias = "discription")]
    pub description: Description,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ToolCommand for SendInvite {
    type Response = DeliveryReport;
    fn command() -> Command {
        Command::SendInvite
    }
}

/// Compose an invite without sending it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewInvite {
    #[serde(flatten)]
    pub invite: SendInvite,
}

impl ToolCommand for PreviewInvite {
    type Response = InvitePreview;
    fn command() -> Command {
        Command::PreviewInvite
    }
}

// ============================================================================
// Vault commands
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadNote {
    /// Path of the note inside the vault, e.g. "Projects/Roadmap.md".
    pub note_name: String,
}

impl ToolCommand for ReadNote {
    type Response = String;
    fn command() -> Command {
        Command::ReadNote
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub folder: String,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub note_type: NoteType,
}

impl ToolCommand for CreateNote {
    type Response = String;
    fn command() -> Command {
        Command::CreateNote
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListNotes {
    #[serde(default)]
    pub folder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ToolCommand for ListNotes {
    type Response = String;
    fn command() -> Command {
        Command::ListNotes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetVaultInfo {}

impl ToolCommand for GetVaultInfo {
    type Response = VaultInfo;
    fn command() -> Command {
        Command::VaultInfo
    }
}
