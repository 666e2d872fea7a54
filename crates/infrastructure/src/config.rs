//! Client configuration from the environment.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Variable holding the backend base URL (required).
pub const BASE_URL_VAR: &str = "GYMTRACK_BASE_URL";
/// Variable holding the per-request timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "GYMTRACK_TIMEOUT_MS";
/// Variable overriding where session files are kept.
pub const DATA_DIR_VAR: &str = "GYMTRACK_DATA_DIR";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The base URL could not be parsed.
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The timeout is not a positive number of milliseconds.
    #[error("invalid timeout '{0}': expected milliseconds > 0")]
    InvalidTimeout(String),

    /// No data directory is configured and the platform has none.
    #[error("no data directory available; set GYMTRACK_DATA_DIR")]
    NoDataDir,
}

/// Settings the adapters are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL; request paths are relative to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Directory holding `auth_token.json` and `user.json`
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or invalid, the timeout
    /// is invalid, or no data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let base_url = parse_base_url(raw_url.trim())?;

        let timeout_ms = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let data_dir = match lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            base_url,
            timeout_ms,
            data_dir,
        })
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

/// Platform data directory for the client, e.g. `~/.local/share/gymtrack`.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("gymtrack"))
}
