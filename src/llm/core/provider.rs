//! Provider trait for chat backends

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::{
    error::LlmError,
    types::{ChatChunk, ChatCompletionRequest},
};

/// Stream of decoded upstream units
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, LlmError>> + Send>>;

/// Interface every chat backend must satisfy
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stream a chat completion
    ///
    /// Sends the conversation to the model host and returns a stream of
    /// chunks in the order the host produced them. Errors opening the call
    /// are returned directly; errors after that arrive as stream items.
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<ChunkStream, LlmError>;
}
