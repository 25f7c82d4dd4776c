//! TOML configuration.
//!
//! Layered lookup: an explicit path, then the `NODERISK_CONFIG` environment
//! variable, then `/etc/noderisk/noderisk.toml`, then compiled-in defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::rules::Rule;
use crate::analysis::trend::DEFAULT_SAMPLES_PER_HOUR;
use crate::analysis::RuleSet;
use crate::metrics::history::DEFAULT_CAPACITY;

pub const CONFIG_ENV: &str = "NODERISK_CONFIG";
pub const SYSTEM_CONFIG_PATH: &str = "/etc/noderisk/noderisk.toml";
pub const DEFAULT_MAX_NODES: usize = 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window_size must be at least 2, got {0}")]
    WindowTooSmall(usize),
    #[error("samples_per_hour must be positive, got {0}")]
    InvalidCadence(f64),
    #[error("horizon_hours must be positive, got {0}")]
    InvalidHorizon(f64),
    #[error("history_capacity ({capacity}) is smaller than window_size ({window})")]
    HistoryTooSmall { capacity: usize, window: usize },
    #[error("max_nodes must be at least 1")]
    NoNodes,
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the noderisk process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Replaces the stock rule ladder when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

impl AppConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit `path` must load; otherwise fall back through the
    /// environment variable, the system path and the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::load_or_default()),
        }
    }

    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "NODERISK_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new(SYSTEM_CONFIG_PATH);
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.server.history_capacity < self.engine.window_size {
            return Err(ConfigError::HistoryTooSmall {
                capacity: self.server.history_capacity,
                window: self.engine.window_size,
            });
        }
        if self.server.max_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        Ok(())
    }

    /// Rule ladder in effect: the configured override or the stock set.
    pub fn rule_set(&self) -> RuleSet {
        match &self.rules {
            Some(rules) => RuleSet::new(rules.clone()),
            None => RuleSet::standard(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Tunables of the prediction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing samples analysed per evaluation. Shorter histories are not scored.
    pub window_size: usize,
    /// Sampling cadence used to turn per-sample slopes into hourly rates.
    pub samples_per_hour: f64,
    /// Projected crossings beyond this many hours are not reported.
    pub horizon_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: 12,
            samples_per_hour: DEFAULT_SAMPLES_PER_HOUR,
            horizon_hours: 4.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < 2 {
            return Err(ConfigError::WindowTooSmall(self.window_size));
        }
        if !self.samples_per_hour.is_finite() || self.samples_per_hour <= 0.0 {
            return Err(ConfigError::InvalidCadence(self.samples_per_hour));
        }
        if self.horizon_hours.is_nan() || self.horizon_hours <= 0.0 {
            return Err(ConfigError::InvalidHorizon(self.horizon_hours));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address and port for the HTTP API.
    pub listen_address: String,
    /// Samples retained per node.
    pub history_capacity: usize,
    /// Distinct nodes tracked before new ones are refused.
    pub max_nodes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
            history_capacity: DEFAULT_CAPACITY,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
