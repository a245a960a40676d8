// Route definitions and handlers

use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, VARY,
};
use warp::{Filter, Reply};

use crate::handlers;
use crate::relay::ChatRelay;

const CORS_ALLOWED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Seconds a browser may cache a preflight answer
const CORS_PREFLIGHT_MAX_AGE: u32 = 600;

pub fn configure_routes(
    relay: Arc<ChatRelay>,
    max_body_bytes: u64,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // POST /chat
    let chat = warp::path("chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json())
        .and(with_relay(relay))
        .and_then(handlers::chat_handler);

    cors_preflight()
        .or(chat.recover(handlers::handle_rejection).with(cors()))
        .with(warp::trace::request())
}

/// Open CORS policy for actual requests: any origin, credentials allowed
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_credentials(true)
        .allow_methods(CORS_ALLOWED_METHODS)
}

/// Answers every CORS preflight, echoing back the requested method and headers
///
/// `warp::cors()` only accepts a fixed header list, so preflights are handled
/// here and any header the browser announces is allowed.
pub fn cors_preflight(
) -> impl Filter<Extract = (warp::reply::Response,), Error = warp::Rejection> + Clone {
    warp::options()
        .and(warp::header::value("origin"))
        .and(warp::header::value("access-control-request-method"))
        .and(warp::header::headers_cloned())
        .map(preflight_reply)
}

fn preflight_reply(
    origin: HeaderValue,
    method: HeaderValue,
    request_headers: HeaderMap,
) -> warp::reply::Response {
    let mut response = warp::reply().into_response();
    let headers = response.headers_mut();

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, method);
    if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(CORS_PREFLIGHT_MAX_AGE));
    headers.insert(VARY, HeaderValue::from_static("Origin"));

    response
}

fn with_relay(
    relay: Arc<ChatRelay>,
) -> impl Filter<Extract = (Arc<ChatRelay>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&relay))
}
