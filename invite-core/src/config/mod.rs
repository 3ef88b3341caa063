//! Configuration types for invite-server.

mod credentials;
mod server_config;

pub use credentials::Credentials;
pub use server_config::{
    CalendarSettings, CredentialVars, RelayConfig, RoutingTable, ServerConfig, VaultConfig,
};
