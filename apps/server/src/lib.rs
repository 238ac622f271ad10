//! DevOps Lifecycle Demo - HTTP service
//!
//! A small read-only JSON service used to demonstrate a delivery pipeline:
//! - `/`, `/health` and `/info` endpoints built from process metadata
//! - a fixed, ordered middleware pipeline with per-request correlation ids
//! - structured JSON logging to stdout
//! - generic not-found and fault answers that never leak internals

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod request_context;
pub mod runtime;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
