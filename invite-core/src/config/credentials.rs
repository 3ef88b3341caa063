//! Sender credentials, read from the environment on every call.

use std::fmt;

use super::CredentialVars;
use crate::error::{InviteError, InviteResult};

#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials {
            address: address.into(),
            secret: secret.into(),
        }
    }

    pub fn from_env(vars: &CredentialVars) -> InviteResult<Self> {
        Self::from_lookup(vars, |key| std::env::var(key).ok())
    }

    /// Resolve credentials through `lookup`. Absent and blank values are
    /// both treated as missing.
    pub fn from_lookup<F>(vars: &CredentialVars, lookup: F) -> InviteResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| InviteError::MissingCredentials(format!("{} is not set", key)))
        };

        let address = fetch(&vars.user_var)?;
        let secret = fetch(&vars.secret_var)?;

        Ok(Credentials { address, secret })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}
