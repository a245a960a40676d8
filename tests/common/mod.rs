#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use ollama_relay::llm::{
    ChatChunk, ChatCompletionRequest, ChatProvider, ChunkStream, LlmError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One step of a scripted upstream response
#[derive(Debug, Clone)]
pub enum Step {
    Text(&'static str),
    Empty,
    Fail(&'static str),
}

/// Provider that replays a fixed script and records every request
pub struct ScriptedProvider {
    steps: Vec<Step>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<ChunkStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let items: Vec<Result<ChatChunk, LlmError>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Text(text) => Ok(ChatChunk::text(*text)),
                Step::Empty => Ok(ChatChunk::default()),
                Step::Fail(message) => Err(LlmError::Connection(message.to_string())),
            })
            .collect();

        Ok(Box::pin(stream::iter(items)))
    }
}

/// Provider that streams the final user message back one character at a
/// time, sleeping between characters so concurrent streams overlap
pub struct EchoProvider {
    pub delay: Duration,
}

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<ChunkStream, LlmError> {
        let text = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let delay = self.delay;

        let chars: Vec<String> = text.chars().map(|c| c.to_string()).collect();
        let chunks = stream::iter(chars).then(move |c| async move {
            tokio::time::sleep(delay).await;
            Ok::<ChatChunk, LlmError>(ChatChunk::text(c))
        });

        Ok(Box::pin(chunks))
    }
}
