//! Route tables

pub mod service;

pub use service::service_routes;
