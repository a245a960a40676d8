//! Newline-delimited JSON parser for Ollama responses

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::OllamaChatResponse;

/// Parse a stream of bytes as Ollama NDJSON frames
///
/// Ollama writes one JSON object per line:
/// ```text
/// {"model":"llama3.2","message":{"role":"assistant","content":"Hel"},"done":false}
/// {"model":"llama3.2","message":{"role":"assistant","content":"lo"},"done":false}
/// {"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,...}
/// ```
///
/// This parser:
/// 1. Buffers incoming bytes (network chunks split lines and UTF-8 sequences)
/// 2. Splits complete lines on `\n`
/// 3. Decodes and parses each non-blank line
/// 4. Flushes a final line that arrived without a trailing newline
///
/// A transport error, or a line longer than [`MAX_LINE_BYTES`], ends the
/// stream after being yielded.
pub fn parse_ndjson_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<OllamaChatResponse, LlmError>> + Send>> {
    parse_ndjson_stream_with_limit(byte_stream, MAX_LINE_BYTES)
}

/// Upper bound on a single NDJSON line
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// [`parse_ndjson_stream`] with a caller-chosen line length limit
pub fn parse_ndjson_stream_with_limit(
    mut byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    max_line_bytes: usize,
) -> Pin<Box<dyn Stream<Item = Result<OllamaChatResponse, LlmError>> + Send>> {
    let frames = async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        // Bytes of `buffer` already known to contain no newline
        let mut scanned = 0usize;

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(offset) = buffer[scanned..].iter().position(|b| *b == b'\n') {
                let newline_pos = scanned + offset;
                let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                scanned = 0;
                if let Some(frame) = parse_line(&line[..newline_pos]) {
                    yield frame;
                }
            }
            scanned = buffer.len();

            if buffer.len() > max_line_bytes {
                yield Err(LlmError::Stream(format!(
                    "Response line exceeds {} bytes",
                    max_line_bytes
                )));
                return;
            }
        }

        if let Some(frame) = parse_line(&buffer) {
            yield frame;
        }
    };

    Box::pin(frames)
}

/// Parse a single line; blank lines yield nothing
fn parse_line(line: &[u8]) -> Option<Result<OllamaChatResponse, LlmError>> {
    let text = match std::str::from_utf8(line) {
        Ok(t) => t.trim(),
        Err(e) => {
            return Some(Err(LlmError::Stream(format!(
                "Invalid UTF-8 in stream: {}",
                e
            ))));
        }
    };

    if text.is_empty() {
        return None;
    }

    Some(
        serde_json::from_str::<OllamaChatResponse>(text).map_err(|e| {
            LlmError::Serialization(format!(
                "Failed to parse Ollama response line: {}. Data: {}",
                e, text
            ))
        }),
    )
}
