//! API layer - routes, handlers, and middleware
//!
//! # Pipeline
//! ```text
//! request
//!   → 1. security headers
//!   → 2. compression
//!   → 3. CORS
//!   → 4. JSON body parsing
//!   → 5. correlation id
//!   → 7. fault catching ─┬→ 6. route dispatch (/, /health, /info)
//!                        └→ 8. not-found fallback
//! ```

pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::{logging, state::AppState};
use axum::{extract::DefaultBodyLimit, Router};

/// Create the main application router
///
/// Returns the fully assembled pipeline without binding a socket, so it can be
/// served by the binary or driven in-process by tests.
pub fn create_router(state: AppState) -> Router {
    pipeline(routes::service_routes(), state)
}

/// Wrap a route table in the ordered pipeline stages.
///
/// Also installs the panic hook the fault stage relies on; repeated calls are
/// harmless.
pub fn pipeline(routes: Router<AppState>, state: AppState) -> Router {
    logging::install_panic_hook();

    let cors_origins = state.config.cors_origin_list();
    let max_body_bytes = state.config.max_body_bytes;

    routes
        .fallback(handlers::errors::not_found)
        .with_state(state.clone())
        // Add middleware (applied in reverse order: last is outermost)
        .layer(axum::middleware::from_fn(middleware::fault_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::json_body_middleware,
        ))
        .layer(middleware::cors(&cors_origins))
        .layer(middleware::compression())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        // Request body limit, enforced when the JSON stage buffers the body
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
