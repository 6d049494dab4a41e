//! Service configuration.
//!
//! Configuration is loaded from an optional JSON file, with a small set of
//! environment overrides applied on top.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (SCREENER_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SCREENER_CONFIG` → path of the JSON config file to load
//! - `SCREENER_PORT` → server.port
//! - `SCREENER_SKIP_STARTUP_SCAN` → scan.startup_scan = false when set

use std::env;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::RetryPolicy;

// ============================================================================
// Server Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only); set to "0.0.0.0"
    /// for remote access.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5000
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Quote provider (Yahoo Finance) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum spacing between outgoing requests, to stay under the
    /// provider's informal rate limits.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            min_request_interval_ms: default_min_request_interval_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://query2.finance.yahoo.com".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_request_interval_ms() -> u64 {
    250
}

// ============================================================================
// Retry Configuration
// ============================================================================

/// Retry behavior for throttled provider requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait in seconds between throttled attempts.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_secs(self.backoff_secs),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    60
}

// ============================================================================
// Scan Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Run a full scan at service startup. Disable in environments where
    /// the deploy platform health-checks the port before a long scan
    /// would finish.
    #[serde(default = "default_startup_scan")]
    pub startup_scan: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            startup_scan: default_startup_scan(),
        }
    }
}

fn default_startup_scan() -> bool {
    true
}

// ============================================================================
// Observability Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration: file (if `SCREENER_CONFIG` points at one),
    /// then environment overrides, then defaults for the rest.
    pub fn load() -> Result<Self> {
        let mut config = match env::var("SCREENER_CONFIG") {
            Ok(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {path}"))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid config file: {path}"))?
            }
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = env::var("SCREENER_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid SCREENER_PORT: {port}"))?;
        }
        if env::var("SCREENER_SKIP_STARTUP_SCAN").is_ok() {
            self.scan.startup_scan = false;
        }
        Ok(())
    }
}
