//! Error types for handler faults

use std::backtrace::{Backtrace, BacktraceStatus};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Process introspection failed: {0}")]
    Introspection(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fault detail carried on a response so the fault stage can log it with the
/// request's correlation id. Never serialized into a body.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    pub message: String,
    pub detail: String,
    pub backtrace: String,
}

impl Error {
    /// Backtrace for the fault log: the one anyhow captured at the origin when
    /// `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enabled it, otherwise the stack
    /// at the point the error is turned into a response.
    fn fault_backtrace(&self) -> String {
        match self {
            Error::Other(err) if err.backtrace().status() == BacktraceStatus::Captured => {
                err.backtrace().to_string()
            }
            _ => Backtrace::force_capture().to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let fault = HandlerFault {
            message: self.to_string(),
            detail: format!("{self:?}"),
            backtrace: self.fault_backtrace(),
        };

        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal Server Error" })),
        )
            .into_response();
        response.extensions_mut().insert(fault);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_detail_goes_to_extensions_not_body() {
        let response = Error::Internal("disk on fire".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let fault = response
            .extensions()
            .get::<HandlerFault>()
            .expect("fault attached");
        assert_eq!(fault.message, "Internal server error: disk on fire");
        assert!(fault.detail.contains("disk on fire"));
        assert!(fault.backtrace.lines().count() > 1, "{}", fault.backtrace);
    }

    #[test]
    fn anyhow_errors_convert() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
