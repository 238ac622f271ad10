//! Terminal responses: not-found fallback, fault and rejected-body answers
//!
//! None of these bodies ever carries internal fault detail; that only goes to
//! the log.

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{api::middleware::BodyRejection, request_context::RequestContext, runtime};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ErrorBody {
    fn new(error: &'static str, ctx: Option<&RequestContext>) -> Self {
        Self {
            error,
            message: None,
            method: None,
            path: None,
            request_id: ctx.map(|c| c.request_id.clone()),
            timestamp: runtime::timestamp(),
        }
    }
}

/// Fallback for any method/path no route matched.
pub async fn not_found(req: Request) -> Response {
    let ctx = req.extensions().get::<RequestContext>();
    let method = ctx
        .map(|c| c.method.to_string())
        .unwrap_or_else(|| req.method().to_string());
    let path = ctx
        .map(|c| c.path.clone())
        .unwrap_or_else(|| req.uri().path().to_string());

    tracing::warn!(
        method = %method,
        path = %path,
        request_id = ctx.map(|c| c.request_id.as_str()).unwrap_or_default(),
        "Route not found"
    );

    let body = ErrorBody {
        method: Some(method),
        path: Some(path),
        ..ErrorBody::new("Not Found", ctx)
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Opaque 500 answer for a handler fault.
pub fn internal_error(ctx: Option<&RequestContext>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal Server Error", ctx)),
    )
        .into_response()
}

/// Answer for a body the JSON stage refused.
pub fn body_rejected(rejection: &BodyRejection, ctx: Option<&RequestContext>) -> Response {
    let (status, error, message) = match rejection {
        BodyRejection::Malformed(_) => (
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "Request body is not valid JSON".to_string(),
        ),
        BodyRejection::Unreadable(_) => (
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "Request body could not be read".to_string(),
        ),
        BodyRejection::TooLarge { limit } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload Too Large",
            format!("Request body exceeds {limit} bytes"),
        ),
    };

    let body = ErrorBody {
        message: Some(message),
        ..ErrorBody::new(error, ctx)
    };
    (status, Json(body)).into_response()
}
