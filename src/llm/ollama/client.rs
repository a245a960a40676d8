//! Ollama client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

use crate::llm::core::{
    error::{LlmError, CONNECT_FAILURE_MESSAGE},
    provider::{ChatProvider, ChunkStream},
    types::ChatCompletionRequest,
};

use super::mapper::{from_ollama_response, to_ollama_request};
use super::ndjson::parse_ndjson_stream;
use super::types::OllamaErrorBody;

/// Client for a local or remote Ollama server
///
/// Built once at startup and shared by every request; it holds only the
/// HTTP connection pool and the host address.
pub struct OllamaClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL, e.g. `http://localhost:11434`
    host: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    ///
    /// * `host` - Base URL of the Ollama server, without trailing slash
    /// * `connect_timeout` - Bound on establishing the TCP connection. No
    ///   bound is placed on the generation itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(host: impl Into<String>, connect_timeout: Duration) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| LlmError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            host: host.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Build the endpoint URL for streaming chat
    fn build_endpoint_url(&self) -> String {
        format!("{}/api/chat", self.host)
    }

    /// Make a streaming request to Ollama
    ///
    /// The client is usable on its own, so an empty conversation is refused
    /// here with [`LlmError::InvalidRequest`] instead of being sent upstream.
    async fn make_streaming_request(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChunkStream, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }

        let ollama_request = to_ollama_request(request);

        let url = self.build_endpoint_url();
        tracing::debug!(url = %url, model = %ollama_request.model, "opening upstream chat stream");

        let response = self
            .http_client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                message: error_message_from_body(&body, status),
            });
        }

        let byte_stream = response.bytes_stream();
        let frames = parse_ndjson_stream(Box::pin(byte_stream));

        let chunks = frames.map(|result| result.and_then(from_ollama_response));

        Ok(Box::pin(chunks))
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_connect() {
            tracing::warn!(host = %self.host, error = %err, "cannot reach Ollama");
            LlmError::Connection(format!("{} (host: {})", CONNECT_FAILURE_MESSAGE, self.host))
        } else {
            err.into()
        }
    }
}

/// Extract the `error` field Ollama puts in failure bodies, falling back to
/// the raw body or the status text
fn error_message_from_body(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<OllamaErrorBody>(body) {
        return parsed.error;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ChatProvider for OllamaClient {
    async fn stream_chat(&self, request: ChatCompletionRequest) -> Result<ChunkStream, LlmError> {
        self.make_streaming_request(request).await
    }
}
