//! Studio configuration parsed from environment variables.

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The store base URL is not an absolute http(s) URL.
    #[error("invalid API URL `{0}` (expected http:// or https://)")]
    InvalidApiUrl(String),

    /// The viewer width is not a positive integer.
    #[error("invalid STUDIO_VIEWPORT_WIDTH `{0}`")]
    InvalidViewportWidth(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Store base URL without a trailing slash.
    pub api_url: String,
    pub timeouts: StoreTimeouts,
    /// Width the read-only renderer assumes, in CSS pixels.
    pub viewport_width: u32,
}

impl StudioConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `STUDIO_API_URL`: default `http://127.0.0.1:8080/api`
    /// - `STUDIO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STUDIO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STUDIO_VIEWPORT_WIDTH`: default 1024
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL or the viewport width is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(
            &std::env::var("STUDIO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;
        let timeouts = StoreTimeouts {
            request_secs: env_parse_u64("STUDIO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("STUDIO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let viewport_width = match std::env::var("STUDIO_VIEWPORT_WIDTH") {
            Ok(raw) => parse_viewport_width(&raw)?,
            Err(_) => DEFAULT_VIEWPORT_WIDTH,
        };
        Ok(Self { api_url, timeouts, viewport_width })
    }
}

/// Validate a store base URL and strip trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] unless the URL starts with
/// `http://` or `https://` and has a host part.
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed.strip_prefix("https://").or_else(|| trimmed.strip_prefix("http://"));
    match host {
        Some(rest) if !rest.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidApiUrl(raw.to_string())),
    }
}

fn parse_viewport_width(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(ConfigError::InvalidViewportWidth(raw.to_string())),
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
