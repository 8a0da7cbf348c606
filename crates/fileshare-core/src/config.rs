//! Configuration module
//!
//! Client configuration is read from the environment (after loading `.env` when present):
//!
//! | Variable | Default |
//! |---|---|
//! | `FILESHARE_URL` | `http://localhost:5000` |
//! | `FILESHARE_API_TOKEN` | unset |
//! | `FILESHARE_AUTH_HEADER` | `bearer` (or `x-api-token`) |
//! | `FILESHARE_TIMEOUT_SECS` | unset (no total request deadline) |
//! | `FILESHARE_LOGIN_PATH` | `/login` |
//! | `FILESHARE_MAX_UPLOAD_MB` | `500` |
//! | `FILESHARE_SUCCESS_REMOVAL_MS` | `4000` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{LOGIN_PATH, MAX_UPLOAD_BYTES, SUCCESS_REMOVAL_DELAY_MS};

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Header used to present the API token to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHeader {
    /// `Authorization: Bearer {token}`
    #[default]
    Bearer,
    /// `X-API-Token: {token}`
    XApiToken,
}

impl FromStr for AuthHeader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearer" | "authorization" => Ok(AuthHeader::Bearer),
            "x-api-token" | "token" => Ok(AuthHeader::XApiToken),
            other => Err(anyhow::anyhow!(
                "Invalid FILESHARE_AUTH_HEADER '{}'. Must be: bearer or x-api-token",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub auth_header: AuthHeader,
    /// Total deadline per request. Unset by default so long uploads are never cut off.
    pub timeout_secs: Option<u64>,
    pub login_path: String,
    pub max_upload_bytes: u64,
    pub success_removal_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            auth_header: AuthHeader::Bearer,
            timeout_secs: None,
            login_path: LOGIN_PATH.to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            success_removal_delay: Duration::from_millis(SUCCESS_REMOVAL_DELAY_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. `from_env` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let auth_header = match lookup("FILESHARE_AUTH_HEADER") {
            Some(raw) => raw.parse()?,
            None => defaults.auth_header,
        };

        let max_upload_bytes = match lookup("FILESHARE_MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("FILESHARE_MAX_UPLOAD_MB must be a valid number"))?
                .saturating_mul(1024 * 1024),
            None => defaults.max_upload_bytes,
        };

        let timeout_secs = match lookup("FILESHARE_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("FILESHARE_TIMEOUT_SECS must be a valid number")
            })?),
            None => defaults.timeout_secs,
        };

        let config = Self {
            base_url: lookup("FILESHARE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_token: lookup("FILESHARE_API_TOKEN")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            auth_header,
            timeout_secs,
            login_path: lookup("FILESHARE_LOGIN_PATH").unwrap_or(defaults.login_path),
            max_upload_bytes,
            success_removal_delay: lookup("FILESHARE_SUCCESS_REMOVAL_MS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.success_removal_delay),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "FILESHARE_URL must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if !self.login_path.starts_with('/') {
            return Err(anyhow::anyhow!("FILESHARE_LOGIN_PATH must start with '/'"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("FILESHARE_MAX_UPLOAD_MB must be greater than 0"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("FILESHARE_TIMEOUT_SECS must be greater than 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Token required for authenticated calls.
    pub fn require_token(&self) -> Result<&str, anyhow::Error> {
        self.api_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing API token. Set FILESHARE_API_TOKEN"))
    }
}
