//! Server configuration at ~/.config/invite-server/config.toml
//!
//! Every key has a default, so a missing file is fine. Environment variables
//! prefixed with `INVITE_SERVER__` override file values, using `__` between
//! nesting levels (e.g. `INVITE_SERVER__RELAY__PORT=2525`). Route keys are
//! spelled with underscores there and take comma-separated addresses
//! (`INVITE_SERVER__ROUTES__TECHNICAL_CALL=a@example.com,b@example.com`).

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{InviteError, InviteResult};

static DEFAULT_RELAY_HOST: &str = "smtp.gmail.com";
const DEFAULT_RELAY_PORT: u16 = 587;
static DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
static DEFAULT_PRODUCT_ID: &str = "-//invite-server//Calendar Invite//EN";
static DEFAULT_VAULT_PATH: &str = "~/notes";

fn default_relay_host() -> String {
    DEFAULT_RELAY_HOST.to_string()
}

fn default_relay_port() -> u16 {
    DEFAULT_RELAY_PORT
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.to_string()
}

fn default_user_var() -> String {
    "EMAIL_USER".to_string()
}

fn default_secret_var() -> String {
    "EMAIL_PASS".to_string()
}

fn default_vault_path() -> PathBuf {
    PathBuf::from(DEFAULT_VAULT_PATH)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub credentials: CredentialVars,
    #[serde(default)]
    pub routes: RoutingTable,
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Outbound mail relay. STARTTLS is always negotiated before login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_host")]
    pub host: String,
    #[serde(default = "default_relay_port")]
    pub port: u16,
    /// Socket timeout handed to the SMTP client; unset keeps lettre's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: default_relay_host(),
            port: default_relay_port(),
            timeout_secs: None,
        }
    }
}

/// How invite payloads are stamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// IANA zone that caller-supplied wall-clock times are interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Display name for the ORGANIZER line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_name: Option<String>,
    #[serde(default = "default_product_id")]
    pub product_id: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        CalendarSettings {
            timezone: default_timezone(),
            organizer_name: None,
            product_id: default_product_id(),
        }
    }
}

impl CalendarSettings {
    pub fn tz(&self) -> InviteResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| InviteError::Config(format!("Unknown time zone '{}'", self.timezone)))
    }
}

/// Names of the environment variables holding the sender credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialVars {
    #[serde(default = "default_user_var")]
    pub user_var: String,
    #[serde(default = "default_secret_var")]
    pub secret_var: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        CredentialVars {
            user_var: default_user_var(),
            secret_var: default_secret_var(),
        }
    }
}

/// Attendee lists per category tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawRoutingTable")]
pub struct RoutingTable {
    #[serde(rename = "recruiter-call")]
    pub recruiter_call: Vec<String>,
    #[serde(rename = "technical-call")]
    pub technical_call: Vec<String>,
}

/// Both spellings of the route keys. Environment variables can only produce
/// the underscore form; when a file and the environment both set a route,
/// the environment wins.
#[derive(Deserialize)]
struct RawRoutingTable {
    #[serde(rename = "recruiter-call", default)]
    recruiter_call: Option<Vec<String>>,
    #[serde(rename = "recruiter_call", default)]
    recruiter_call_env: Option<Vec<String>>,
    #[serde(rename = "technical-call", default)]
    technical_call: Option<Vec<String>>,
    #[serde(rename = "technical_call", default)]
    technical_call_env: Option<Vec<String>>,
}

impl From<RawRoutingTable> for RoutingTable {
    fn from(raw: RawRoutingTable) -> Self {
        RoutingTable {
            recruiter_call: raw
                .recruiter_call_env
                .or(raw.recruiter_call)
                .unwrap_or_default(),
            technical_call: raw
                .technical_call_env
                .or(raw.technical_call)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_path")]
    pub path: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        VaultConfig {
            path: default_vault_path(),
        }
    }
}

impl VaultConfig {
    /// Vault root with `~` expanded.
    pub fn root(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.path.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }
}

impl ServerConfig {
    pub fn config_path() -> InviteResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| InviteError::Config("Could not determine config directory".into()))?
            .join("invite-server");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location when
    /// `path` is `None` (writing a commented default file there on first run).
    pub fn load(path: Option<&Path>) -> InviteResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        tracing::debug!(path = %config_path.display(), "loading configuration");

        Self::from_sources(config_path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("INVITE_SERVER")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("routes.recruiter_call")
            .with_list_parse_key("routes.technical_call")
    }

    fn from_sources(config_path: PathBuf, environment: Environment) -> InviteResult<Self> {
        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| InviteError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| InviteError::Config(e.to_string()))
    }

    /// Parse configuration from TOML text, without file or environment layers.
    pub fn from_toml_str(content: &str) -> InviteResult<Self> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .map_err(|e| InviteError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| InviteError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> InviteResult<()> {
        let contents = format!(
            "\
# invite-server configuration

# [relay]
# host = \"{}\"
# port = {}

# [calendar]
# timezone = \"{}\"
# organizer_name = \"Hiring Team\"

# [credentials]
# user_var = \"EMAIL_USER\"
# secret_var = \"EMAIL_PASS\"

# Attendees per invite category:
# [routes]
# recruiter-call = [\"recruiter@example.com\", \"hiring-manager@example.com\"]
# technical-call = [\"engineer@example.com\"]

# [vault]
# path = \"{}\"
",
            DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT, DEFAULT_TIMEZONE, DEFAULT_VAULT_PATH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                InviteError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| InviteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();

        assert_eq!(config.relay.host, "smtp.gmail.com");
        assert_eq!(config.relay.port, 587);
        assert_eq!(config.calendar.timezone, "America/Los_Angeles");
        assert_eq!(config.credentials.user_var, "EMAIL_USER");
        assert_eq!(config.credentials.secret_var, "EMAIL_PASS");
        assert!(config.routes.recruiter_call.is_empty());
    }

    #[test]
    fn routes_keep_their_order() {
        let config = ServerConfig::from_toml_str(
            r#"
[routes]
recruiter-call = ["b@example.com", "a@example.com"]
technical-call = ["eng@example.com"]
"#,
        )
        .unwrap();

        assert_eq!(
            config.routes.recruiter_call,
            vec!["b@example.com", "a@example.com"]
        );
        assert_eq!(config.routes.technical_call, vec!["eng@example.com"]);
    }

    #[test]
    fn environment_overrides_routes_and_relay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[routes]\nrecruiter-call = [\"file@example.com\"]\n").unwrap();

        let vars = config::Map::from([
            (
                "INVITE_SERVER__ROUTES__TECHNICAL_CALL".to_string(),
                "a@example.com,b@example.com".to_string(),
            ),
            (
                "INVITE_SERVER__ROUTES__RECRUITER_CALL".to_string(),
                "env@example.com".to_string(),
            ),
            ("INVITE_SERVER__RELAY__PORT".to_string(), "2525".to_string()),
            (
                "INVITE_SERVER__CALENDAR__TIMEZONE".to_string(),
                "Europe/Paris".to_string(),
            ),
        ]);
        let config =
            ServerConfig::from_sources(path, ServerConfig::environment().source(Some(vars)))
                .unwrap();

        assert_eq!(config.routes.recruiter_call, vec!["env@example.com"]);
        assert_eq!(
            config.routes.technical_call,
            vec!["a@example.com", "b@example.com"]
        );
        assert_eq!(config.relay.port, 2525);
        assert_eq!(config.calendar.timezone, "Europe/Paris");
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let config = ServerConfig::from_toml_str(
            r#"
[calendar]
timezone = "Mars/Olympus_Mons"
"#,
        )
        .unwrap();

        assert!(matches!(config.calendar.tz(), Err(InviteError::Config(_))));
    }

    #[test]
    fn default_config_file_is_valid_and_commented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        ServerConfig::create_default_config(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.lines().all(|l| l.is_empty() || l.starts_with('#')));

        let loaded = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.relay.port, 587);
    }

    #[test]
    fn absolute_vault_path_is_kept() {
        let vault = VaultConfig {
            path: PathBuf::from("/srv/notes"),
        };
        assert_eq!(vault.root(), PathBuf::from("/srv/notes"));
    }
}
