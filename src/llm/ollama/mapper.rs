//! Mapping between abstraction types and Ollama types

use std::time::Duration;

use crate::llm::core::{
    error::LlmError,
    types::{ChatChunk, ChatCompletionRequest, ChatMessage, UsageMetadata},
};

use super::types::{OllamaChatRequest, OllamaChatResponse, OllamaMessage};

/// Convert our abstraction request to Ollama's streaming chat request
pub fn to_ollama_request(request: ChatCompletionRequest) -> OllamaChatRequest {
    let options = if request.options.is_empty() {
        None
    } else {
        Some(request.options)
    };

    OllamaChatRequest {
        model: request.model,
        messages: request.messages.into_iter().map(to_ollama_message).collect(),
        stream: true,
        options,
    }
}

fn to_ollama_message(message: ChatMessage) -> OllamaMessage {
    OllamaMessage {
        role: message.role.as_str().to_string(),
        content: Some(message.content),
    }
}

/// Convert one response line into a chunk
///
/// A line carrying an `error` field is a failure reported by the host after
/// the stream started.
pub fn from_ollama_response(response: OllamaChatResponse) -> Result<ChatChunk, LlmError> {
    if let Some(error) = response.error {
        return Err(LlmError::Provider(error));
    }

    let usage = match (response.prompt_eval_count, response.eval_count) {
        (None, None) => None,
        (input, output) => Some(UsageMetadata::new(
            input.unwrap_or(0),
            output.unwrap_or(0),
        )),
    };

    Ok(ChatChunk {
        content: response.message.and_then(|m| m.content),
        done: response.done,
        done_reason: response.done_reason,
        usage,
        total_duration: response.total_duration.map(Duration::from_nanos),
    })
}
