//! Tests for the Ollama client against a mock `/api/chat` endpoint
//!
//! A `wiremock` server stands in for Ollama. One test at the bottom talks to
//! a real Ollama instance and is ignored by default:
//! `cargo test --test ollama_client_test -- --ignored`

use futures::StreamExt;
use ollama_relay::config::{RelayConfig, DEFAULT_SYSTEM_PROMPT};
use ollama_relay::llm::{
    ChatCompletionRequest, ChatMessage, ChatProvider, LlmError, ModelOptions, OllamaClient,
    UsageMetadata,
};
use ollama_relay::relay::ChatRelay;
use ollama_relay::routes::configure_routes;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NDJSON_HELLO: &str = concat!(
    "{\"model\":\"llama3.2:latest\",\"created_at\":\"2024-07-01T12:00:00Z\",\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
    "{\"model\":\"llama3.2:latest\",\"created_at\":\"2024-07-01T12:00:00Z\",\"message\":{\"role\":\"assistant\",\"content\":\", \"},\"done\":false}\n",
    "{\"model\":\"llama3.2:latest\",\"created_at\":\"2024-07-01T12:00:00Z\",\"message\":{\"role\":\"assistant\",\"content\":\"world\"},\"done\":false}\n",
    "{\"model\":\"llama3.2:latest\",\"created_at\":\"2024-07-01T12:00:01Z\",\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\",\"total_duration\":1500000000,\"prompt_eval_count\":12,\"eval_count\":3}\n",
);

fn test_client(server: &MockServer) -> OllamaClient {
    OllamaClient::new(server.uri(), Duration::from_secs(2)).expect("Failed to create client")
}

fn simple_request() -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: "llama3.2:latest".to_string(),
        messages: vec![ChatMessage::system("Be brief."), ChatMessage::user("Say hello")],
        options: ModelOptions::default(),
    }
}

#[tokio::test]
async fn test_streams_chunks_from_ndjson() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2:latest",
            "stream": true,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Say hello"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(NDJSON_HELLO, "application/x-ndjson"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let stream = client
        .stream_chat(simple_request())
        .await
        .expect("Failed to start stream");

    let chunks: Vec<_> = stream.collect().await;
    assert_eq!(chunks.len(), 4);

    let chunks: Vec<_> = chunks.into_iter().map(|c| c.expect("Stream error")).collect();
    let text: String = chunks
        .iter()
        .filter_map(|c| c.content.as_deref())
        .collect();
    assert_eq!(text, "Hello, world");

    let last = chunks.last().unwrap();
    assert!(last.done);
    assert_eq!(last.done_reason.as_deref(), Some("stop"));
    assert_eq!(last.usage, Some(UsageMetadata::new(12, 3)));
    assert_eq!(last.total_duration, Some(Duration::from_millis(1500)));
}

#[tokio::test]
async fn test_sends_options_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "options": {"temperature": 0.5, "num_ctx": 2048}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"done\":true}\n", "application/x-ndjson"))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = simple_request();
    request.options = ModelOptions::default()
        .with_temperature(0.5)
        .with_num_ctx(2048);

    let client = test_client(&server);
    let chunks: Vec<_> = client.stream_chat(request).await.unwrap().collect().await;
    assert_eq!(chunks.len(), 1);
}

#[tokio::test]
async fn test_model_not_found_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "model \"llama9\" not found, try pulling it first"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.stream_chat(simple_request()).await;

    match result {
        Err(err @ LlmError::Http { .. }) => {
            assert_eq!(
                err.to_string(),
                "model \"llama9\" not found, try pulling it first (status code: 404)"
            );
        }
        Err(other) => panic!("Expected HTTP error, got {:?}", other),
        Ok(_) => panic!("Expected HTTP error, got a stream"),
    }
}

#[tokio::test]
async fn test_midstream_error_line() {
    let body = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n",
        "{\"error\":\"model runner has unexpectedly stopped\"}\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut stream = client.stream_chat(simple_request()).await.unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.content.as_deref(), Some("Hel"));

    match stream.next().await {
        Some(Err(LlmError::Provider(message))) => {
            assert_eq!(message, "model runner has unexpectedly stopped")
        }
        other => panic!("Expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_conversation_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut request = simple_request();
    request.messages.clear();

    assert!(matches!(
        client.stream_chat(request).await,
        Err(LlmError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    // Nothing listens on port 1
    let client = OllamaClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

    match client.stream_chat(simple_request()).await {
        Err(LlmError::Connection(message)) => {
            assert!(message.starts_with("Failed to connect to Ollama"));
            assert!(message.contains("http://127.0.0.1:1"));
        }
        Err(other) => panic!("Expected connection error, got {:?}", other),
        Ok(_) => panic!("Expected connection error, got a stream"),
    }
}

#[tokio::test]
async fn test_relay_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2:latest",
            "stream": true,
            "messages": [
                {"role": "system", "content": DEFAULT_SYSTEM_PROMPT},
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "Say hello"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(NDJSON_HELLO, "application/x-ndjson"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = RelayConfig::default();
    let client = test_client(&server);
    let relay = Arc::new(ChatRelay::from_config(Arc::new(client), &config));
    let routes = configure_routes(relay, config.max_body_bytes);

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({
            "message": "Say hello",
            "history": [
                {"role": "user", "content": "Hi"},
                {"role": "system", "content": "dropped"},
                {"role": "assistant", "content": "Hello!"}
            ]
        }))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body().as_ref(), b"Hello, world");
}

#[tokio::test]
async fn test_relay_end_to_end_model_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "model \"llama3.2:latest\" not found, try pulling it first"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let relay = Arc::new(ChatRelay::new(Arc::new(client), "llama3.2:latest", None));
    let routes = configure_routes(relay, 1024);

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "hi"}))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        String::from_utf8(response.body().to_vec()).unwrap(),
        "Error: model \"llama3.2:latest\" not found, try pulling it first (status code: 404)"
    );
}

#[tokio::test]
#[ignore] // Requires a running Ollama with the default model pulled
async fn test_real_ollama_generation() {
    dotenvy::dotenv().ok();

    let config = RelayConfig::from_env().expect("Invalid configuration");
    let client = OllamaClient::new(config.ollama_host.clone(), config.connect_timeout)
        .expect("Failed to create client");

    let request = ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage::user("What is 2+2? Answer with just the number.")],
        options: ModelOptions::default().with_temperature(0.0),
    };

    let mut stream = client
        .stream_chat(request)
        .await
        .expect("Failed to start stream");

    let mut text = String::new();
    let mut finished = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("Stream error");
        if let Some(content) = chunk.content {
            text.push_str(&content);
        }
        finished |= chunk.done;
    }

    println!("Response: {}", text);
    assert!(finished);
    assert!(text.contains('4'));
}
