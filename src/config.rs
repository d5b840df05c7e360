//! Runtime configuration read from the environment.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file via `dotenv`. Every setting has a default so the binary runs
//! against a stock local Ollama install without any configuration.

use crate::error::{AppError, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Large enough for a full saved page, well above axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Application settings shared by the server and CLI commands.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ollama runtime.
    pub ollama_host: String,
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Address the HTTP API listens on.
    pub bind_addr: SocketAddr,
    /// Per-request timeout for calls to the runtime; `None` waits indefinitely.
    /// Pulls only use it as the longest allowed silence between progress lines.
    pub request_timeout: Option<Duration>,
    /// Largest request body the HTTP API accepts, in bytes.
    pub max_body_bytes: usize,
    /// Directory for rolling log files. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` (if present) and reads the configuration from the environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Reads the configuration from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let ollama_host = non_empty_var("OLLAMA_HOST")
            .map(|host| normalize_host(&host))
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());

        let default_model =
            non_empty_var("LOCATOR_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let bind_raw =
            non_empty_var("LOCATOR_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_bind_addr(&bind_raw)?;

        // `0` disables the timeout, matching the unbounded Python client.
        let request_timeout = match non_empty_var("OLLAMA_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(AppError::Config(format!(
                        "OLLAMA_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    )))
                },
            },
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        let max_body_bytes = match non_empty_var("LOCATOR_MAX_BODY_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(AppError::Config(format!(
                        "LOCATOR_MAX_BODY_BYTES must be a positive integer, got '{}'",
                        raw
                    )))
                },
            },
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let log_dir = non_empty_var("LOCATOR_LOG_DIR").map(PathBuf::from);

        let config = Self {
            ollama_host,
            default_model,
            bind_addr,
            request_timeout,
            max_body_bytes,
            log_dir,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

/// Parses a `host:port` listen address.
pub fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid bind address '{}'", raw)))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// Ollama's own OLLAMA_HOST convention allows a bare `host:port`.
fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
