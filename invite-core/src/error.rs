//! Error types for invite-server.

use thiserror::Error;

/// Errors that can occur while routing, composing or delivering an invite,
/// or while working with the notes vault.
#[derive(Error, Debug)]
pub enum InviteError {
    #[error("Invalid category '{0}': expected one of recruiter-call, technical-call")]
    InvalidCategory(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("Sender credentials not found: {0}")]
    MissingCredentials(String),

    #[error("Error faced when sending the invite: {0}")]
    DeliveryFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Note not found: '{name}'{}", did_you_mean(.suggestions))]
    NoteNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Note already exists: '{0}'")]
    NoteExists(String),

    #[error("Folder not found: '{0}'")]
    FolderNotFound(String),

    #[error("Path must stay inside the vault: '{0}'")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl InviteError {
    /// Whether the caller may reasonably try the same request again.
    ///
    /// Only transport failures qualify; bad input and missing credentials
    /// fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InviteError::DeliveryFailure(_))
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let list: Vec<String> = suggestions.iter().map(|s| format!("  - {}", s)).collect();
    format!("\n\nDid you mean one of these?\n{}", list.join("\n"))
}

/// Result type alias for invite-server operations.
pub type InviteResult<T> = Result<T, InviteError>;
