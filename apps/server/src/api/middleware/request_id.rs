//! Correlation-id middleware

use axum::{
    extract::Request,
    http::{header::USER_AGENT, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{logging, request_context::RequestContext};

/// Response header echoing the correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation-id middleware
///
/// Assigns every request a fresh v4 UUID before any handler, fallback or
/// fault path runs, and:
/// - stores it in the request extensions as a [`RequestContext`]
/// - emits exactly one "Incoming request" record
/// - runs the rest of the pipeline inside a span carrying the id, so every
///   downstream record is tagged with it
/// - echoes it in the `x-request-id` response header
///
/// Client-supplied `x-request-id` values are ignored; the id is always
/// server-generated.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        method: req.method().clone(),
        path: req.uri().path().to_string(),
    };
    let span = logging::request_span(&ctx);

    span.in_scope(|| {
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        tracing::info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            user_agent = %user_agent,
            "Incoming request"
        );
    });

    let request_id = ctx.request_id.clone();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}
