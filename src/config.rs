//! Application configuration parsed from environment variables.

use std::path::PathBuf;

use crate::design::{DEFAULT_IMAGE_CATALOG, DesignRules};
use crate::wizard::{AuthMode, WizardLayout};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_SESSION_FILE: &str = ".chipsbag-session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was present but held an unsupported value.
    #[error("invalid {var}: {value}")]
    Parse { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub session_file: PathBuf,
    pub timeouts: HttpTimeouts,
    pub auth_mode: AuthMode,
    pub image_step: bool,
    pub uppercase_name: bool,
    pub image_catalog: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            timeouts: HttpTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            auth_mode: AuthMode::Token,
            image_step: false,
            uppercase_name: false,
            image_catalog: DEFAULT_IMAGE_CATALOG.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `BAG_API_BASE`: remote API base URL (trailing `/` trimmed)
    /// - `BAG_SESSION_FILE`: path of the durable session file
    /// - `BAG_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BAG_CONNECT_TIMEOUT_SECS`: default 10
    /// - `BAG_AUTH_MODE`: `token` (default), `inline` or `none`
    /// - `BAG_IMAGE_STEP`: finish step requires an image (`false`)
    /// - `BAG_UPPERCASE_NAME`: upper-case the bag name (`false`)
    /// - `BAG_IMAGE_CATALOG`: comma separated asset ids
    ///
    /// # Errors
    ///
    /// Returns an error when an enum or boolean variable holds an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base = env_var("BAG_API_BASE")
            .unwrap_or(defaults.api_base)
            .trim_end_matches('/')
            .to_owned();
        let session_file = env_var("BAG_SESSION_FILE").map_or(defaults.session_file, PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("BAG_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("BAG_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let auth_mode = parse_auth_mode(env_var("BAG_AUTH_MODE").as_deref())?;
        let image_step = parse_bool("BAG_IMAGE_STEP", env_var("BAG_IMAGE_STEP").as_deref())?;
        let uppercase_name = parse_bool("BAG_UPPERCASE_NAME", env_var("BAG_UPPERCASE_NAME").as_deref())?;
        let image_catalog = env_var("BAG_IMAGE_CATALOG").map_or(defaults.image_catalog, |raw| parse_catalog(&raw));

        Ok(Self { api_base, session_file, timeouts, auth_mode, image_step, uppercase_name, image_catalog })
    }

    #[must_use]
    pub fn wizard_layout(&self) -> WizardLayout {
        WizardLayout { auth: self.auth_mode, image_step: self.image_step }
    }

    #[must_use]
    pub fn design_rules(&self) -> DesignRules {
        DesignRules { uppercase_name: self.uppercase_name, image_catalog: self.image_catalog.clone() }
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    match env_var(key).map(|v| v.trim().parse::<u64>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}

fn parse_auth_mode(raw: Option<&str>) -> Result<AuthMode, ConfigError> {
    match raw.map(str::trim).unwrap_or("token") {
        "token" => Ok(AuthMode::Token),
        "inline" => Ok(AuthMode::Inline),
        "none" => Ok(AuthMode::None),
        other => Err(ConfigError::Parse { var: "BAG_AUTH_MODE", value: other.to_owned() }),
    }
}

fn parse_bool(var: &'static str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::Parse { var, value: other.to_owned() }),
    }
}

fn parse_catalog(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
