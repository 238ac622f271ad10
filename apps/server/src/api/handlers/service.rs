//! Service endpoints: `/`, `/health` and `/info`
//!
//! Each handler is a function of the injected configuration, process metadata
//! and the request's correlation id. None reads headers, query or body.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{
    request_context::RequestContext,
    runtime::{self, MemoryUsage},
    state::AppState,
    Result,
};

pub const SERVICE_MESSAGE: &str = "SAP BTP DevOps Lifecycle Demo";
pub const DISPLAY_NAME: &str = "DevOps Lifecycle Demo";
pub const DESCRIPTION: &str = "Demonstration of DevOps practices on SAP BTP";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub timestamp: String,
    pub instance_id: String,
    pub request_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Seconds since process start.
    pub uptime: f64,
    pub message: &'static str,
    pub timestamp: String,
    pub request_id: String,
    pub environment: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InstanceInfo {
    pub guid: String,
    pub index: String,
    pub addr: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub rust_version: &'static str,
    pub target: &'static str,
    pub environment: String,
    pub platform: &'static str,
    pub memory_usage: MemoryUsage,
    pub cf_instance: InstanceInfo,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// GET /
pub async fn root(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<RootResponse> {
    tracing::info!(request_id = %ctx.request_id, "Root endpoint accessed");

    let config = &state.config;
    Json(RootResponse {
        message: SERVICE_MESSAGE,
        version: runtime::VERSION,
        environment: config.environment.clone(),
        timestamp: runtime::timestamp(),
        instance_id: config.instance_guid.clone(),
        request_id: ctx.request_id,
        status: "healthy",
    })
}

/// GET /health
pub async fn health(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<HealthResponse> {
    let uptime = state.uptime().as_secs_f64();

    tracing::info!(
        request_id = %ctx.request_id,
        uptime,
        "Health check accessed"
    );

    Json(HealthResponse {
        uptime,
        message: "OK",
        timestamp: runtime::timestamp(),
        request_id: ctx.request_id,
        environment: state.config.environment.clone(),
        version: runtime::VERSION,
    })
}

/// GET /info
///
/// A failure to sample process memory is a handler fault and surfaces as 500.
pub async fn info(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<InfoResponse>> {
    info_with(&state, ctx, MemoryUsage::sample).map(Json)
}

fn info_with(
    state: &AppState,
    ctx: RequestContext,
    sample_memory: impl FnOnce() -> Result<MemoryUsage>,
) -> Result<InfoResponse> {
    let memory_usage = sample_memory()?;

    tracing::info!(request_id = %ctx.request_id, "Info endpoint accessed");

    let config = &state.config;
    Ok(InfoResponse {
        name: DISPLAY_NAME,
        description: DESCRIPTION,
        version: runtime::VERSION,
        rust_version: runtime::RUST_VERSION,
        target: runtime::BUILD_TARGET,
        environment: config.environment.clone(),
        platform: runtime::platform(),
        memory_usage,
        cf_instance: InstanceInfo {
            guid: config.instance_guid.clone(),
            index: config.instance_index.clone(),
            addr: config.instance_addr.clone(),
        },
        request_id: ctx.request_id,
    })
}
