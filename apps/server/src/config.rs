//! Service configuration
//!
//! Resolved once at startup from the process environment (optionally seeded by
//! a `.env` file). Every field has a documented default, so an unset variable
//! never fails startup; only malformed values do.

use config::{ConfigError, Environment, Map};
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};

/// Name reported as `service` in every log record.
pub const SERVICE_NAME: &str = "devops-lifecycle-demo";

/// Output format of the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bind host (HOST).
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port (PORT).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log verbosity (LOG_LEVEL). Accepts winston-style names as well.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log sink format (LOG_FORMAT).
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Deployment environment name (APP_ENV).
    #[serde(rename = "app_env", default = "default_environment")]
    pub environment: String,

    /// Platform instance identifier (CF_INSTANCE_GUID).
    #[serde(rename = "cf_instance_guid", default = "default_instance_guid")]
    pub instance_guid: String,

    /// Platform instance index (CF_INSTANCE_INDEX).
    #[serde(rename = "cf_instance_index", default = "default_instance_index")]
    pub instance_index: String,

    /// Platform instance address (CF_INSTANCE_ADDR).
    #[serde(rename = "cf_instance_addr", default = "default_instance_addr")]
    pub instance_addr: String,

    /// Comma separated list of allowed CORS origins (CORS_ORIGINS).
    /// Empty allows any origin.
    #[serde(default)]
    pub cors_origins: String,

    /// Upper bound for buffered JSON request bodies (MAX_BODY_BYTES).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_instance_guid() -> String {
    "local".to_string()
}

fn default_instance_index() -> String {
    "0".to_string()
}

fn default_instance_addr() -> String {
    "localhost".to_string()
}

fn default_max_body_bytes() -> usize {
    100 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            environment: default_environment(),
            instance_guid: default_instance_guid(),
            instance_index: default_instance_index(),
            instance_addr: default_instance_addr(),
            cors_origins: String::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::default())
    }

    /// Resolve configuration from an explicit variable map instead of the
    /// process environment.
    pub fn from_env_map(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        // Empty variables count as unset.
        config::Config::builder()
            .add_source(environment.ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    /// Semantic checks; reports every problem found, not just the first.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.port == 0 {
            problems.push("PORT must be between 1 and 65535".to_string());
        }
        if self.environment.trim().is_empty() {
            problems.push("APP_ENV must not be blank".to_string());
        }
        if self.max_body_bytes == 0 {
            problems.push("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Resolve the listening socket address.
    pub fn socket_addr(&self) -> std::io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("no address resolved for {}:{}", self.host, self.port),
                )
            })
    }

    /// Allowed CORS origins; empty means any origin.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}
