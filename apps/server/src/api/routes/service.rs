//! Service API Routes
//!
//! Only GET (and the implied HEAD) is routed; any other method on a known path
//! falls through to the not-found answer.

use crate::api::handlers::{errors, service};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(service::root).fallback(errors::not_found))
        .route("/health", get(service::health).fallback(errors::not_found))
        .route("/info", get(service::info).fallback(errors::not_found))
}
