//! Per-request context injected by middleware.

use axum::http::Method;

/// Assigned exactly once by the correlation-id stage and never mutated.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
}
