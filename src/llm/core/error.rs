//! Error types for the upstream model layer

use thiserror::Error;

/// Message reported when the model host cannot be reached at all
pub const CONNECT_FAILURE_MESSAGE: &str = "Failed to connect to Ollama. Please check that Ollama is downloaded, running and accessible.";

/// Errors that can occur while talking to a chat provider
///
/// The display text of every variant is the bare message, because it ends up
/// verbatim in the relayed `Error: ...` fragment.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Upstream host unreachable or connection dropped before a response
    #[error("{0}")]
    Connection(String),

    /// Non-success HTTP status from the upstream host
    #[error("{message} (status code: {status})")]
    Http { status: u16, message: String },

    /// Byte stream failures while reading the response body
    #[error("{0}")]
    Stream(String),

    /// JSON encoding/decoding issues
    #[error("{0}")]
    Serialization(String),

    /// Error object reported inside an otherwise successful stream
    #[error("{0}")]
    Provider(String),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            LlmError::Connection(CONNECT_FAILURE_MESSAGE.to_string())
        } else if let Some(status) = err.status() {
            LlmError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            LlmError::Stream(err.to_string())
        } else {
            LlmError::Connection(err.to_string())
        }
    }
}
