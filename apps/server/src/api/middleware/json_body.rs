//! JSON body parsing middleware

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::state::AppState;

/// Parsed JSON request body, available to handlers via `Extension<JsonBody>`.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

/// Why a request body was not accepted.
///
/// This stage runs before a correlation id exists, so it only records the
/// verdict; the fault stage turns it into a response once the id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRejection {
    Malformed(String),
    TooLarge { limit: usize },
    Unreadable(String),
}

/// JSON body parsing middleware
///
/// Buffers bodies declared as JSON (`application/json` or `application/*+json`)
/// up to the request body limit (`max_body_bytes`, installed as a
/// `DefaultBodyLimit` by the pipeline), parses them and re-attaches the bytes
/// so later extractors can still read them. Only objects and arrays are accepted at the
/// top level. Other content types and empty bodies pass through untouched.
pub async fn json_body_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !is_json_content(req.headers()) {
        return next.run(req).await;
    }

    let limit = state.config.max_body_bytes;
    let (mut parts, body) = req.into_parts();

    // `Bytes` enforces the limit installed by the `DefaultBodyLimit` layer.
    let buffered = Bytes::from_request(Request::from_parts(parts.clone(), body), &()).await;
    let bytes = match buffered {
        Ok(bytes) => bytes,
        Err(rejection) => {
            let rejection = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                BodyRejection::TooLarge { limit }
            } else {
                BodyRejection::Unreadable(rejection.body_text())
            };
            parts.extensions.insert(rejection);
            return next.run(Request::from_parts(parts, Body::empty())).await;
        }
    };

    if !bytes.is_empty() {
        match parse_strict(&bytes) {
            Ok(value) => {
                parts.extensions.insert(JsonBody(value));
            }
            Err(reason) => {
                parts.extensions.insert(BodyRejection::Malformed(reason));
            }
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn parse_strict(bytes: &[u8]) -> Result<Value, String> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(_) => Err("top-level JSON value must be an object or array".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
