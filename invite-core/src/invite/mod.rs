//! Calendar invites: routing, composition and delivery.

mod compose;
mod service;

use serde::{Deserialize, Serialize};

use crate::error::InviteError;
use crate::ics::PayloadSummary;
use crate::router::Category;

pub use compose::{ComposedInvite, InviteComposer};
pub use service::InviteService;

/// Free-text description as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Parts(Vec<String>),
}

impl Description {
    /// Text that goes into the invite. For a list only the last element is
    /// used; an empty list gives an empty description.
    pub fn effective(&self) -> &str {
        match self {
            Description::Text(text) => text,
            Description::Parts(parts) => parts.last().map(String::as_str).unwrap_or(""),
        }
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Description::Text(text.to_string())
    }
}

/// Outcome of one `send_invite` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub delivered: bool,
    pub message: String,
    /// Whether retrying the same call could succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl DeliveryReport {
    pub fn delivered(recipients: &[String]) -> Self {
        DeliveryReport {
            delivered: true,
            message: format!(
                "The invite has been sent successfully to {}",
                recipients.join(", ")
            ),
            retryable: false,
        }
    }

    pub fn failed(error: &InviteError) -> Self {
        DeliveryReport {
            delivered: false,
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// A composed but unsent invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitePreview {
    pub category: Category,
    pub recipients: Vec<String>,
    pub payload: String,
    pub summary: Option<PayloadSummary>,
}
