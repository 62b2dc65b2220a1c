use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, Request};
use axum::http::header::{ACCEPT, CONNECTION, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use offline_cache_sdk::{CachedResponse, FetchRequest, OfflineCacheError, RequestMode};
use tracing::{debug, warn};
use url::Url;

use super::dto::{ErrorDto, MessageAckDto, StatusDto};
use super::routes::GatewayState;
use crate::domain::{Interception, ResponseSource};

/// Response header naming where the body came from.
pub const SOURCE_HEADER: &str = "x-offline-cache";

/// Largest request body forwarded to the origin.
const MAX_FORWARD_BODY: usize = 8 * 1024 * 1024;

const SEC_FETCH_MODE: &str = "sec-fetch-mode";

/// Browser request headers dropped from intercepted `GET`s. The cache must only
/// ever hold complete, unencoded bodies keyed by URL.
const CACHE_UNSAFE_HEADERS: [&str; 7] = [
    "if-none-match",
    "if-modified-since",
    "if-match",
    "if-unmodified-since",
    "if-range",
    "range",
    "accept-encoding",
];

pub async fn get_status(Extension(state): Extension<GatewayState>) -> Response {
    let controller = &state.controller;
    match controller.generations().await {
        Ok(generations) => Json(StatusDto {
            state: controller.state(),
            cache_name: controller.cache_name().to_owned(),
            clients_claimed: controller.clients_claimed(),
            generations,
        })
        .into_response(),
        Err(err) => {
            let err = OfflineCacheError::from(err);
            warn!(error = %err, "Status lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

pub async fn post_message(
    Extension(state): Extension<GatewayState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<MessageAckDto> {
    let message = state.controller.on_message(&payload);
    Json(MessageAckDto {
        message,
        state: state.controller.state(),
    })
}

pub async fn intercept(Extension(state): Extension<GatewayState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Some(url) = resolve_url(&state.origin, &parts.uri) else {
        return (StatusCode::BAD_REQUEST, "unresolvable request target").into_response();
    };
    let body = if parts.method == Method::GET {
        Bytes::new()
    } else {
        match axum::body::to_bytes(body, MAX_FORWARD_BODY).await {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "Request body rejected");
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
        }
    };

    let mode = request_mode(&parts.headers);
    let mut headers = parts.headers;
    if parts.method == Method::GET {
        strip_cache_unsafe(&mut headers);
    }
    let fetch = FetchRequest::new(parts.method, url, mode).with_payload(headers, body);

    match state.controller.handle_fetch(&fetch).await {
        Interception::Respond { response, source } => into_response(response, Some(source)),
        Interception::NetworkError(err) => error_response(StatusCode::GATEWAY_TIMEOUT, &err),
        Interception::Bypass => match state.fetcher.fetch(&fetch).await {
            Ok(response) => into_response(response, None),
            Err(err) => error_response(StatusCode::GATEWAY_TIMEOUT, &err),
        },
    }
}

fn resolve_url(origin: &Url, uri: &Uri) -> Option<String> {
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    origin.join(target).ok().map(String::from)
}

/// Detects page loads.
///
/// `Sec-Fetch-Mode` is authoritative when present; otherwise a request whose
/// preferred `Accept` type is HTML counts as a navigation.
fn request_mode(headers: &HeaderMap) -> RequestMode {
    if let Some(mode) = headers.get(SEC_FETCH_MODE).and_then(|v| v.to_str().ok()) {
        return if mode.trim().eq_ignore_ascii_case("navigate") {
            RequestMode::Navigate
        } else {
            RequestMode::Other
        };
    }

    let prefers_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .and_then(|accept| accept.split(',').next())
        .is_some_and(|first| first.trim().starts_with("text/html"));
    if prefers_html {
        RequestMode::Navigate
    } else {
        RequestMode::Other
    }
}

fn strip_cache_unsafe(headers: &mut HeaderMap) {
    for name in CACHE_UNSAFE_HEADERS {
        headers.remove(name);
    }
}

fn into_response(cached: CachedResponse, source: Option<ResponseSource>) -> Response {
    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = cached.status;

    let headers = response.headers_mut();
    for (name, value) in &cached.headers {
        if name != CONNECTION && name != TRANSFER_ENCODING {
            headers.append(name, value.clone());
        }
    }
    if let Some(source) = source {
        headers.insert(
            HeaderName::from_static(SOURCE_HEADER),
            HeaderValue::from_static(source.as_str()),
        );
    }
    response
}

fn error_response(status: StatusCode, err: &OfflineCacheError) -> Response {
    (
        status,
        Json(ErrorDto {
            error: err.to_string(),
        }),
    )
        .into_response()
}
