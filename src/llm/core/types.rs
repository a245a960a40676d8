//! Core types for the upstream model layer

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::ModelOptions;

/// Request to stream a chat completion from a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier understood by the host (e.g. `llama3.2:latest`)
    pub model: String,
    /// Full conversation, system instruction first
    pub messages: Vec<ChatMessage>,
    /// Sampling parameters
    #[serde(default)]
    pub options: ModelOptions,
}

/// A single message in the conversation sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system instruction message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Fixed instruction preamble
    System,
    /// Human input
    User,
    /// Model output
    Assistant,
}

impl MessageRole {
    /// Map a caller-supplied history role onto a forwardable role.
    ///
    /// Only `user` and `assistant` are accepted; callers may not inject
    /// system instructions through the history.
    pub fn from_history(role: &str) -> Option<Self> {
        match role {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One decoded unit of the upstream stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatChunk {
    /// Text produced by this unit, if any
    pub content: Option<String>,
    /// Set on the final unit of a generation
    pub done: bool,
    /// Why generation stopped (final unit only)
    pub done_reason: Option<String>,
    /// Token accounting (final unit only)
    pub usage: Option<UsageMetadata>,
    /// Wall time spent on the whole generation (final unit only)
    pub total_duration: Option<Duration>,
}

impl ChatChunk {
    /// Create a content-bearing chunk
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    /// Prompt tokens consumed
    pub input_tokens: u32,
    /// Response tokens generated
    pub output_tokens: u32,
    /// Sum of input and output
    pub total_tokens: u32,
}

impl UsageMetadata {
    /// Create new usage metadata
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}
