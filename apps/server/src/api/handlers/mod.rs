//! HTTP handlers

pub mod errors;
pub mod service;
