use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;

use crate::airports::AirportId;

pub const ENV_API_URL: &str = "FLIGHTBOARD_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "FLIGHTBOARD_TIMEOUT_SECS";
pub const ENV_AIRPORT_ID: &str = "FLIGHTBOARD_AIRPORT_ID";

/// Console configuration.
///
/// Precedence (lowest first): defaults, TOML file, environment, command line flags.
/// The binary applies flags on top of [`ConsoleConfig::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend root, without the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout; `None` leaves the transport default in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Airport preselected by the board view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_airport_id: Option<AirportId>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: None,
            default_airport_id: None,
        }
    }
}

impl ConsoleConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: ConsoleConfig =
            toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Defaults, then the optional file, then environment overrides; validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `FLIGHTBOARD_*` environment variables that are set
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var(ENV_API_URL) {
            debug!("Using API URL from {}", ENV_API_URL);
            self.api_base_url = url;
        }

        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
            self.request_timeout_secs = Some(secs);
        }

        if let Ok(raw) = env::var(ENV_AIRPORT_ID) {
            let id = raw
                .trim()
                .parse::<AirportId>()
                .with_context(|| format!("{} must be an airport id", ENV_AIRPORT_ID))?;
            self.default_airport_id = Some(id);
        }

        Ok(())
    }

    /// Trim the base URL and reject values the client cannot use
    pub fn validate(&mut self) -> Result<()> {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if self.api_base_url.is_empty() {
            bail!("API base URL must not be empty");
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            bail!(
                "API base URL must start with http:// or https:// (got '{}')",
                self.api_base_url
            );
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request timeout must be at least one second");
        }
        Ok(())
    }
}
