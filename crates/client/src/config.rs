use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_LOGIN_PATH: &str = "/auth";

/// Client configuration.
///
/// [`ClientConfig::new`] gives local-development defaults; use
/// [`ClientConfig::from_env`] to override them from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL including the API prefix.
    pub api_url: String,
    /// Transport timeout applied to every request, including the refresh
    /// exchange.
    pub request_timeout_secs: u64,
    /// Path of the refresh exchange endpoint, relative to `api_url`.
    pub refresh_path: String,
    /// Login entry point handed to the navigator when the session ends.
    pub login_path: String,
    /// Store a `refreshToken` returned by the refresh exchange, replacing
    /// the current one. Off by default: the backend is not known to rotate.
    pub rotate_refresh_token: bool,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_path: DEFAULT_REFRESH_PATH.into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            rotate_refresh_token: false,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                        |
    /// |--------------------------------|--------------------------------|
    /// | `BAZAAR_API_URL`               | `http://localhost:5000/api/v1` |
    /// | `BAZAAR_REQUEST_TIMEOUT_SECS`  | `30`                           |
    /// | `BAZAAR_REFRESH_PATH`          | `/auth/refresh`                |
    /// | `BAZAAR_LOGIN_PATH`            | `/auth`                        |
    /// | `BAZAAR_ROTATE_REFRESH_TOKEN`  | `false`                        |
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config =
            Self::new(lookup("BAZAAR_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()));

        if let Some(raw) = lookup("BAZAAR_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "BAZAAR_REQUEST_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?;
        }
        if let Some(path) = lookup("BAZAAR_REFRESH_PATH") {
            config.refresh_path = path;
        }
        if let Some(path) = lookup("BAZAAR_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(raw) = lookup("BAZAAR_ROTATE_REFRESH_TOKEN") {
            config.rotate_refresh_token = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ClientError::Config(format!(
                        "BAZAAR_ROTATE_REFRESH_TOKEN must be a boolean, got '{raw}'"
                    )))
                }
            };
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
