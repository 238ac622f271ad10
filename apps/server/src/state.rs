//! Shared application state injected into every pipeline stage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;

/// Read-only after construction; cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Monotonic time since the state was created at process start.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
