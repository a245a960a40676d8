//! Ollama-specific request and response types
//!
//! These types map directly to the `/api/chat` schema of the Ollama server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::core::config::ModelOptions;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest {
    /// Model name, including tag
    pub model: String,
    /// Conversation
    pub messages: Vec<OllamaMessage>,
    /// Always true for the relay
    pub stream: bool,
    /// Sampling parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

/// A message as Ollama sends and receives it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    /// Absent on some tool-call frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One line of the NDJSON response stream
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<OllamaMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Nanoseconds
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
    /// Set when the server fails mid-stream
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaErrorBody {
    pub error: String,
}
