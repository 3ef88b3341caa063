//! Routing of invite categories to attendee lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RoutingTable;
use crate::error::{InviteError, InviteResult};

/// Kind of call an invite is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    RecruiterCall,
    TechnicalCall,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::RecruiterCall, Category::TechnicalCall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::RecruiterCall => "recruiter-call",
            Category::TechnicalCall => "technical-call",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recruiter-call" | "recruiter" => Ok(Category::RecruiterCall),
            "technical-call" | "technical" => Ok(Category::TechnicalCall),
            other => Err(InviteError::InvalidCategory(other.to_string())),
        }
    }
}

/// Picks the attendee list for a category tag.
#[derive(Debug, Clone)]
pub struct RecipientRouter {
    table: RoutingTable,
}

impl RecipientRouter {
    /// Every category must have at least one attendee.
    pub fn new(table: RoutingTable) -> InviteResult<Self> {
        let router = RecipientRouter { table };
        for category in Category::ALL {
            if router.attendees(category).is_empty() {
                return Err(InviteError::Config(format!(
                    "No attendees configured for '{}' (set routes.{} in the config file)",
                    category, category
                )));
            }
        }
        Ok(router)
    }

    pub fn attendees(&self, category: Category) -> &[String] {
        match category {
            Category::RecruiterCall => &self.table.recruiter_call,
            Category::TechnicalCall => &self.table.technical_call,
        }
    }

    /// Resolve a caller-supplied tag to its category and attendee list.
    pub fn route(&self, tag: &str) -> InviteResult<(Category, &[String])> {
        let category: Category = tag.parse()?;
        Ok((category, self.attendees(category)))
    }
}
