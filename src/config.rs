//! Console configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.pulkitworks.info";
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 7000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STORAGE_DIR: &str = ".playerdesk";
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Deadline applied to login and signup.
    pub auth_timeout_ms: u64,
    /// Connect timeout for every request. Admin calls have no overall deadline.
    pub connect_timeout_secs: u64,
    /// File backing the session storage.
    pub storage_path: PathBuf,
    /// Cookie sent with login when credentials are included.
    pub cookie: Option<String>,
}

impl ConsoleConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PLAYERDESK_BASE_URL`: default `https://api.pulkitworks.info`
    /// - `PLAYERDESK_TIMEOUT_MS`: default 7000
    /// - `PLAYERDESK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PLAYERDESK_STORAGE`: default `$HOME/.playerdesk/storage.json`
    /// - `PLAYERDESK_COOKIE`: unset by default
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable URL or number, or when no storage
    /// location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConsoleConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// See [`ConsoleConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            lookup("PLAYERDESK_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;
        let auth_timeout_ms = parse_u64(&lookup, "PLAYERDESK_TIMEOUT_MS", DEFAULT_AUTH_TIMEOUT_MS)?;
        let connect_timeout_secs =
            parse_u64(&lookup, "PLAYERDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let storage_path = match non_empty(lookup("PLAYERDESK_STORAGE")) {
            Some(path) => PathBuf::from(path),
            None => {
                let home = non_empty(lookup("HOME")).ok_or(ConfigError::NoStorageLocation)?;
                PathBuf::from(home).join(STORAGE_DIR).join(STORAGE_FILE)
            }
        };
        let cookie = non_empty(lookup("PLAYERDESK_COOKIE"));

        Ok(Self { base_url, auth_timeout_ms, connect_timeout_secs, storage_path, cookie })
    }

    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Validate an http(s) URL and strip trailing slashes.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBaseUrl` for anything that is not an absolute http(s) URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match non_empty(lookup(var)) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
