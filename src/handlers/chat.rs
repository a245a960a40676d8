// POST /chat handler

use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Reply;

use crate::fragment::text_stream_reply;
use crate::models::{ChatRequest, ErrorResponse};
use crate::relay::ChatRelay;

pub async fn chat_handler(
    request: ChatRequest,
    relay: Arc<ChatRelay>,
) -> Result<warp::reply::Response, Infallible> {
    let request_id = Uuid::new_v4();
    tracing::debug!(%request_id, history = request.history.len(), "POST /chat");

    match relay.relay(request, request_id) {
        Ok(fragments) => Ok(text_stream_reply(fragments)),
        // Upstream failures arrive inside the stream, only validation fails here
        Err(err) => {
            tracing::info!(%request_id, reason = %err, "rejected chat request");
            Ok(error_reply(StatusCode::BAD_REQUEST, err.to_string()))
        }
    }
}

/// JSON `{"error": ...}` reply with the given status
pub fn error_reply(status: StatusCode, message: impl Into<String>) -> warp::reply::Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}
