use std::time::Duration;

use thiserror::Error;

/// Failure of a single `get_ai_response` call.
///
/// `Display` is the message a caller may show to a user; the fields hold the diagnostic detail that
/// was already logged when the failure was detected.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Input message is required")]
    InvalidInput,

    #[error("Error while generating AI response")]
    Generation { detail: String },

    #[error("Error with AI service request")]
    ServiceRequest { status: Option<u16>, detail: String },

    #[error("AI service request timed out")]
    Timeout { after: Duration },

    #[error("An unknown error occurred")]
    Unknown { detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure reported by a `GenerativeBackend` implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not complete the exchange (connect, send, or body read).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered but produced no usable generation.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Generation(format!("undecodable response body: {err}"))
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// Problems found while reading configuration. Raised at start-up, before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set; refusing to start without an API credential")]
    MissingApiKey,

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("AI gateway has not been initialized")]
    Uninitialized,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
