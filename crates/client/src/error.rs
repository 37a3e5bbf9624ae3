use bazaar_core::error::CoreError;

/// Errors surfaced by [`ApiClient`](crate::ApiClient) and the domain clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend returned a non-2xx status other than an unrecovered 401.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        /// The backend's `message` field, or the raw body when absent.
        message: String,
    },

    /// A 401 that was not recovered: the request had already been retried,
    /// or there was no refresh token to recover with.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The token refresh this request waited on failed. The session has
    /// been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(#[from] RefreshError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Outcome of a failed refresh cycle, fanned out to every waiting request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response did not contain an access token")]
    MalformedResponse,

    /// The task driving the refresh was dropped before it finished.
    #[error("refresh abandoned before completion")]
    Abandoned,
}
