//! Middleware stages of the request pipeline

pub mod fault;
pub mod json_body;
pub mod layers;
pub mod request_id;
pub mod security;

// Re-export public API
pub use fault::fault_middleware;
pub use json_body::{json_body_middleware, BodyRejection, JsonBody};
pub use layers::{compression, cors};
pub use request_id::{request_id_middleware, X_REQUEST_ID};
pub use security::security_headers_middleware;
