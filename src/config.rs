//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_SERVICE_NAME: &str = "ebuild";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Registry origin without a trailing slash.
    pub base_url: String,
    /// Service prefix of the readable CSRF cookie (`<service>_csrf`).
    pub service_name: String,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `EBUILD_BASE_URL`: default `http://127.0.0.1:8080`; may include a path
    ///   prefix such as `http://host/registry`
    /// - `EBUILD_SERVICE_NAME`: default `ebuild`
    /// - `EBUILD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `EBUILD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when a timeout is not a whole number or
    /// a string value is blank.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&env_or("EBUILD_BASE_URL", DEFAULT_BASE_URL))?;
        let service_name = env_or("EBUILD_SERVICE_NAME", DEFAULT_SERVICE_NAME).trim().to_owned();
        if service_name.is_empty() {
            return Err(ClientError::Config("EBUILD_SERVICE_NAME is blank".to_owned()));
        }
        let timeouts = Timeouts {
            request_secs: env_parse_u64("EBUILD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("EBUILD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        Ok(Self { base_url, service_name, timeouts })
    }

    /// Replace the base URL, applying the same normalization as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the value is blank.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ClientError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    /// Name of the readable cookie that mirrors the CSRF token.
    #[must_use]
    pub fn csrf_cookie_name(&self) -> String {
        csrf_cookie_name(&self.service_name)
    }
}

pub(crate) fn csrf_cookie_name(service: &str) -> String {
    format!("{service}_csrf")
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ClientError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ClientError::Config(format!("{key} must be a whole number of seconds, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::Config("base URL is blank".to_owned()));
    }
    Ok(trimmed.to_owned())
}
