/// Error taxonomy for studio backend calls
///
/// Every variant renders as the single message shown to the user, so
/// `Display` carries only the backend-provided text where one exists.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    /// Request never produced a response (connect, DNS, timeout, body read)
    #[error("{0}")]
    Transport(String),

    /// Backend answered with a non-success HTTP status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Backend answered 2xx but flagged the body with `ok: false`
    #[error("{0}")]
    Rejected(String),

    /// 2xx body that could not be decoded into the expected shape
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// Configuration could not be read, written, or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl StudioError {
    pub fn invalid_response(endpoint: &str, reason: impl Into<String>) -> Self {
        StudioError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status attached to the failure, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            StudioError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
