use thiserror::Error;

/// Failures talking to the attendance server
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid server url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}")]
    Status { status: reqwest::StatusCode },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
