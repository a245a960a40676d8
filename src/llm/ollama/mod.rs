//! Ollama provider implementation
//!
//! This module provides a client for the `/api/chat` endpoint of an Ollama
//! server, implementing the ChatProvider trait.

pub mod client;
pub mod mapper;
pub mod ndjson;
pub mod types;

// Re-export main types for convenience
pub use client::OllamaClient;
