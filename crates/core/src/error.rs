use std::time::Duration;

use thiserror::Error;

/// Failure of a single send attempt.
///
/// Every variant is scoped to one send; nothing here is fatal to the client.
/// Malformed reply payloads are not errors at all: the response decoder
/// degrades to best-effort text instead.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A required endpoint or setting is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The webhook did not answer within the bounded wall-clock timeout.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The request could not be issued or completed.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ChatError {
    pub fn is_config(&self) -> bool {
        matches!(self, ChatError::Config(_))
    }
}
