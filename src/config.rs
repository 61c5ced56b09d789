//! Configuration module
//!
//! TOML file configuration, read from `~/.config/yard-weighbridge/config.toml`
//! (override with the `YARD_CONFIG` env var). Every section falls back to a
//! safe default so the service starts without a config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub weighing: WeighingConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Site identity
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Tenant scope applied to development seed data
    pub tenant_id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            tenant_id: "default".to_string(),
        }
    }
}

/// Weighing behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeighingConfig {
    /// Tolerance applied to tickets that don't specify their own, percent
    pub default_tolerance_percent: f64,
}

impl Default for WeighingConfig {
    fn default() -> Self {
        Self {
            default_tolerance_percent: 2.0,
        }
    }
}

/// Wait-queue behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Waits beyond this many minutes are flagged as overtime
    pub overtime_threshold_minutes: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            overtime_threshold_minutes: 120,
        }
    }
}

/// No-show sweep behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Interval between sweep passes, seconds
    pub check_interval_secs: u64,
    /// Disable to leave overdue slots to manual handling
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            enabled: true,
        }
    }
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Grace period for in-flight work on shutdown, seconds
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 2,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

/// `~/.config/yard-weighbridge/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yard-weighbridge")
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────
