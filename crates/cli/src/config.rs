// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `<data_dir>/config.toml` and includes:
//! - `server_url`: base URL of the sync API (e.g., "http://10.0.2.2:8000/api")
//! - `[retry]`: how soon a failed sync may be retried
//! - `[connectivity]`: reachability probe timing
//! - `[nearby]`: defaults for the nearby-hospital search
//!
//! Every field has a default, so a missing file or section is fine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{ExponentialBackoff, NextTrigger, RetryPolicy};

const DATA_DIR_NAME: &str = "bloodline";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "bloodline.db";

/// Client configuration stored in `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the sync API, without a trailing `/sync`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub nearby: NearbyConfig,
}

/// Which retry policy gates sync rounds after a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// Retry on every trigger.
    #[default]
    NextTrigger,
    /// Wait with exponential backoff between failed rounds.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub strategy: RetryStrategy,
    /// Initial backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum backoff delay in seconds (default: 300).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// TCP connect timeout in milliseconds (default: 1500).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Seconds between probes in `bloodline watch` (default: 30).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

/// Defaults for `bloodline nearby`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyConfig {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_server_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    300
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_limit() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryConfig::default(),
            connectivity: ConnectivityConfig::default(),
            nearby: NearbyConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            strategy: RetryStrategy::default(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_timeout_ms: default_probe_timeout_ms(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

impl Default for NearbyConfig {
    fn default() -> Self {
        NearbyConfig {
            radius_km: default_radius_km(),
            limit: default_limit(),
        }
    }
}

impl Config {
    /// Loads configuration from the given data directory.
    ///
    /// A missing file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given data directory.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Rejects values no command could work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server_url '{}' must start with http:// or https://",
                self.server_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        if !(self.nearby.radius_km.is_finite() && self.nearby.radius_km > 0.0) {
            return Err(Error::Config("nearby.radius_km must be positive".into()));
        }
        Ok(())
    }

    /// Applies `BLOODLINE_SERVER_URL` on top of the file value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::server_url() {
            self.server_url = url;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity.probe_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity.probe_interval_secs.max(1))
    }

    /// Builds the configured retry policy.
    pub fn retry_policy(&self) -> Box<dyn RetryPolicy> {
        match self.retry.strategy {
            RetryStrategy::NextTrigger => Box::new(NextTrigger),
            RetryStrategy::Exponential => {
                let initial = i64::try_from(self.retry.initial_delay_ms).unwrap_or(i64::MAX);
                let max = i64::try_from(self.retry.max_delay_secs).unwrap_or(i64::MAX);
                Box::new(ExponentialBackoff::new(
                    chrono::Duration::try_milliseconds(initial).unwrap_or(chrono::Duration::MAX),
                    chrono::Duration::try_seconds(max).unwrap_or(chrono::Duration::MAX),
                ))
            }
        }
    }
}

/// Resolves the data directory: explicit flag, then `BLOODLINE_DIR`, then
/// the platform's local data directory.
pub fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::data_dir() {
        return Ok(dir);
    }
    dirs::data_local_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or(Error::NoDataDir)
}

/// Path of the SQLite store inside `data_dir`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
