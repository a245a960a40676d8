use futures_util::StreamExt;
use std::convert::Infallible;
use warp::http::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::reply::Response;

use crate::llm::LlmError;
use crate::relay::FragmentStream;

/// Prefix marking an inline upstream failure in the text body
pub const ERROR_PREFIX: &str = "Error: ";

/// Render one relay item as the text written to the response body
pub fn to_wire(item: Result<String, LlmError>) -> String {
    match item {
        Ok(text) => text,
        Err(err) => create_error_fragment(&err),
    }
}

/// Create the final fragment reporting an upstream failure
pub fn create_error_fragment(err: &LlmError) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

/// Wrap a fragment stream in a chunked `text/plain` response
///
/// Each fragment becomes one body chunk and is flushed as soon as the relay
/// yields it.
pub fn text_stream_reply(fragments: FragmentStream) -> Response {
    let body = fragments.map(|item| Ok::<String, Infallible>(to_wire(item)));

    let mut response = Response::new(Body::wrap_stream(body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
