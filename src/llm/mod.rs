//! Upstream model layer
//!
//! This module provides a provider-neutral interface for streaming chat
//! completions, plus the Ollama implementation used by the relay.

pub mod core;
pub mod ollama;

// Re-export commonly used types
pub use self::core::{
    config::ModelOptions,
    error::LlmError,
    provider::{ChatProvider, ChunkStream},
    types::{ChatChunk, ChatCompletionRequest, ChatMessage, MessageRole, UsageMetadata},
};

pub use ollama::OllamaClient;
