//! Fault-catching middleware

use std::future::Future as _;
use std::panic::AssertUnwindSafe;

use axum::{extract::Request, middleware::Next, response::Response};
use futures::FutureExt as _;

use crate::{
    api::{handlers::errors, middleware::BodyRejection},
    error::HandlerFault,
    logging::{self, PanicCapture},
    request_context::RequestContext,
};

/// Fault-catching middleware
///
/// Innermost stage, wrapping route dispatch and the not-found fallback. It
/// turns every abnormal outcome into exactly one terminal JSON response that
/// carries the correlation id:
/// - a body rejected by the JSON stage becomes 400/413
/// - a handler returning [`crate::Error`] becomes an opaque 500
/// - a panicking handler becomes an opaque 500
///
/// Fault detail (message, location, backtrace) is logged at error level and
/// never copied into the body. This stage does not panic, and a panic is
/// confined to the request that raised it.
pub async fn fault_middleware(req: Request, next: Next) -> Response {
    let ctx = req.extensions().get::<RequestContext>().cloned();
    let request_id = ctx
        .as_ref()
        .map(|c| c.request_id.clone())
        .unwrap_or_default();

    if let Some(rejection) = req.extensions().get::<BodyRejection>().cloned() {
        tracing::warn!(
            request_id = %request_id,
            rejection = ?rejection,
            "Rejected request body"
        );
        return errors::body_rejected(&rejection, ctx.as_ref());
    }

    let mut downstream = Box::pin(next.run(req));
    let guarded = futures::future::poll_fn(move |cx| {
        let _capture = PanicCapture::enter();
        downstream.as_mut().poll(cx)
    });

    match AssertUnwindSafe(guarded).catch_unwind().await {
        Ok(mut response) => match response.extensions_mut().remove::<HandlerFault>() {
            Some(fault) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %fault.message,
                    detail = %fault.detail,
                    stack = %fault.backtrace,
                    "Unhandled error"
                );
                errors::internal_error(ctx.as_ref())
            }
            None => response,
        },
        Err(panic) => {
            match logging::take_panic_report() {
                Some(report) => tracing::error!(
                    request_id = %request_id,
                    error = %report.message,
                    location = %report.location,
                    stack = %report.backtrace,
                    "Unhandled error"
                ),
                None => tracing::error!(
                    request_id = %request_id,
                    error = %logging::panic_message(&*panic),
                    stack = "backtrace unavailable",
                    "Unhandled error"
                ),
            }
            errors::internal_error(ctx.as_ref())
        }
    }
}
