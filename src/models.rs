// Request and response bodies of the HTTP surface

use serde::{Deserialize, Serialize};

// Chat Request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// Absent and empty are both rejected by the relay
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }
}

// Prior conversation turn as the caller sends it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: content.into(),
        }
    }
}

// Error Response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "Write a Dockerfile",
            "history": [
                {"role": "assistant", "content": "Hello! How can I help?"},
                {"role": "user", "content": "Hi"}
            ]
        }))
        .unwrap();

        assert_eq!(request.message.as_deref(), Some("Write a Dockerfile"));
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role.as_deref(), Some("assistant"));
        assert_eq!(request.history[1].content, "Hi");
    }

    #[test]
    fn test_chat_request_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "Hi"})).unwrap();
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_chat_request_missing_message() {
        let request: ChatRequest = serde_json::from_value(json!({"history": []})).unwrap();
        assert!(request.message.is_none());

        let request: ChatRequest = serde_json::from_value(json!({"message": null})).unwrap();
        assert!(request.message.is_none());
    }

    #[test]
    fn test_history_entry_missing_fields() {
        let entry: HistoryEntry = serde_json::from_value(json!({"content": "orphan"})).unwrap();
        assert!(entry.role.is_none());
        assert_eq!(entry.content, "orphan");

        let entry: HistoryEntry = serde_json::from_value(json!({"role": "user"})).unwrap();
        assert_eq!(entry.content, "");
    }

    #[test]
    fn test_history_entry_ignores_unknown_fields() {
        let entry: HistoryEntry =
            serde_json::from_value(json!({"role": "user", "content": "x", "ts": "now"})).unwrap();
        assert_eq!(entry, HistoryEntry::new("user", "x"));
    }

    #[test]
    fn test_chat_request_rejects_non_string_message() {
        let result = serde_json::from_value::<ChatRequest>(json!({"message": 42}));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse {
            error: "No message provided".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": "No message provided"})
        );
    }
}
