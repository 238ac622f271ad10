//! Process and platform introspection used by the service endpoints.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sysinfo::System;

use crate::{Error, Result};

/// Service version, embedded at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compiler the binary was built with, e.g. `rustc 1.83.0 (90b35a623 2024-11-26)`.
pub const RUST_VERSION: &str = env!("DEMO_RUSTC_VERSION");

/// Target triple the binary was built for.
pub const BUILD_TARGET: &str = env!("DEMO_BUILD_TARGET");

/// Operating system name (`linux`, `macos`, `windows`, ...).
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// Current wall-clock time as ISO-8601 UTC with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Memory snapshot of the current process, in bytes.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_bytes: u64,
    pub system_total: u64,
    pub system_used: u64,
}

impl MemoryUsage {
    /// Sample the current process. Uses a fresh `System` per call so no
    /// sampler state is shared between requests.
    pub fn sample() -> Result<Self> {
        let pid = sysinfo::get_current_pid().map_err(|e| Error::Introspection(e.to_string()))?;

        let mut system = System::new();
        system.refresh_memory();
        if !system.refresh_process(pid) {
            return Err(Error::Introspection(format!("process {pid} not found")));
        }

        let process = system
            .process(pid)
            .ok_or_else(|| Error::Introspection(format!("process {pid} not found")))?;

        Ok(Self {
            rss: process.memory(),
            virtual_bytes: process.virtual_memory(),
            system_total: system.total_memory(),
            system_used: system.used_memory(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_iso8601_utc() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn build_metadata_is_embedded() {
        assert!(!VERSION.is_empty());
        assert!(RUST_VERSION.starts_with("rustc"));
        assert!(!BUILD_TARGET.is_empty());
        assert!(!platform().is_empty());
    }

    #[test]
    fn memory_snapshot_of_current_process() {
        let usage = MemoryUsage::sample().unwrap();
        assert!(usage.rss > 0);
        assert!(usage.system_total >= usage.system_used);
    }
}
