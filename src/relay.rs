//! Chat relay
//!
//! Turns a caller's [`ChatRequest`] into an upstream conversation and relays
//! the provider's text output back as a lazy stream of fragments.

use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::llm::{
    ChatCompletionRequest, ChatMessage, ChatProvider, LlmError, MessageRole, ModelOptions,
};
use crate::models::{ChatRequest, HistoryEntry};

/// Reasons a chat request is rejected before any upstream call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No message provided")]
    NoMessage,
}

/// Stream of text fragments. Ends after the first `Err`.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Forwards chat requests to a provider and relays its output
pub struct ChatRelay {
    provider: Arc<dyn ChatProvider>,
    model: String,
    system_prompt: Option<String>,
    options: ModelOptions,
}

impl ChatRelay {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        model: impl Into<String>,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt,
            options: ModelOptions::default(),
        }
    }

    /// Build a relay using the model, instruction and options in `config`
    pub fn from_config(provider: Arc<dyn ChatProvider>, config: &RelayConfig) -> Self {
        Self::new(provider, config.model.clone(), config.system_prompt.clone())
            .with_options(config.options.clone())
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the upstream conversation for `message`
    ///
    /// Layout: the system instruction (when configured), then the history
    /// restricted to `user`/`assistant` turns in their original order, then
    /// `message` as the final user turn.
    pub fn build_messages(&self, message: &str, history: &[HistoryEntry]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);

        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }

        messages.extend(history.iter().filter_map(|entry| {
            let role = entry.role.as_deref().and_then(MessageRole::from_history)?;
            Some(ChatMessage {
                role,
                content: entry.content.clone(),
            })
        }));

        messages.push(ChatMessage::user(message));
        messages
    }

    /// Validate `request` and return the stream of relayed fragments
    ///
    /// Validation happens eagerly. The upstream call is only opened once
    /// the returned stream is first polled, and is dropped together with
    /// the stream.
    pub fn relay(
        &self,
        request: ChatRequest,
        request_id: Uuid,
    ) -> Result<FragmentStream, ValidationError> {
        let message = match request.message {
            Some(message) if !message.is_empty() => message,
            _ => return Err(ValidationError::NoMessage),
        };

        let messages = self.build_messages(&message, &request.history);
        let forwarded_history = messages.len() - 1 - usize::from(self.system_prompt.is_some());
        tracing::info!(
            %request_id,
            model = %self.model,
            message_len = message.len(),
            history_kept = forwarded_history,
            history_dropped = request.history.len() - forwarded_history,
            "relaying chat"
        );

        let completion = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            options: self.options.clone(),
        };
        let provider = Arc::clone(&self.provider);

        let fragments = async_stream::stream! {
            let mut upstream = match provider.stream_chat(completion).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "upstream call failed");
                    yield Err(e);
                    return;
                }
            };

            let mut emitted = 0usize;
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        if chunk.done {
                            tracing::debug!(
                                %request_id,
                                done_reason = ?chunk.done_reason,
                                usage = ?chunk.usage,
                                total_duration = ?chunk.total_duration,
                                "upstream generation finished"
                            );
                        }
                        if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                            emitted += 1;
                            yield Ok(content);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%request_id, error = %e, fragments = emitted, "upstream stream failed");
                        yield Err(e);
                        return;
                    }
                }
            }

            tracing::info!(%request_id, fragments = emitted, "chat relay complete");
        };

        Ok(Box::pin(fragments))
    }
}
