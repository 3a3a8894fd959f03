// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration management.
//!
//! Configuration is stored in `<state_dir>/config.toml` (or the file named by
//! `COURIER_CONFIG`) and has three tables:
//! - `[delivery]`: backoff constants, batch size and request timeout
//! - `[trigger]`: background sync tag, foreground delay and connectivity probe
//! - `[worker]`: daemon behavior
//!
//! A missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use courier_core::BackoffPolicy;

use crate::env;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.db";
const STATE_DIR_NAME: &str = "courier";

/// Smallest accepted drain batch.
pub const MIN_BATCH_SIZE: usize = 10;
/// Largest accepted drain batch.
pub const MAX_BATCH_SIZE: usize = 100;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Delivery and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Attempts before a request is abandoned (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on the exponential delay in seconds (default: 3600).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Upper bound of the random jitter in milliseconds (default: 1000).
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
    /// Records fetched per drain pass (default: 50, allowed 10..=100).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Delivery trigger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Tag used when registering background sync (default: "courier-sync").
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,
    /// Delay before a foreground drain in milliseconds (default: 250).
    #[serde(default = "default_foreground_delay_ms")]
    pub foreground_delay_ms: u64,
    /// `host:port` probed to decide whether the host is online.
    /// Unset means always online.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity_probe: Option<String>,
    /// Probe connect timeout in milliseconds (default: 1000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

/// Worker daemon settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Accept background sync registrations (default: true).
    #[serde(default = "default_background_sync")]
    pub background_sync: bool,
    /// Seconds between drain passes while registrations are pending (default: 5).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    60 * 60
}

fn default_max_jitter_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    courier_core::DEFAULT_BATCH_SIZE
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sync_tag() -> String {
    "courier-sync".to_string()
}

fn default_foreground_delay_ms() -> u64 {
    250
}

fn default_probe_timeout_ms() -> u64 {
    1000
}

fn default_background_sync() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            max_jitter_ms: default_max_jitter_ms(),
            batch_size: default_batch_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            sync_tag: default_sync_tag(),
            foreground_delay_ms: default_foreground_delay_ms(),
            connectivity_probe: None,
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            background_sync: default_background_sync(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl DeliveryConfig {
    /// Backoff policy built from these settings.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: self.max_attempts,
            base: Duration::from_millis(self.base_delay_ms),
            cap: Duration::from_secs(self.max_delay_secs),
            max_jitter: Duration::from_millis(self.max_jitter_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TriggerConfig {
    pub fn foreground_delay(&self) -> Duration {
        Duration::from_millis(self.foreground_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Config {
    /// Load the configuration for a state directory.
    ///
    /// Reads `COURIER_CONFIG` if set, else `<state_dir>/config.toml`.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = env::config_path().unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME));
        Self::load_from(&path)
    }

    /// Load and validate the configuration at `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Config>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(Error::InvalidConfig(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the drainer and trigger cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.delivery.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "delivery.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&self.delivery.batch_size) {
            return Err(Error::InvalidConfig(format!(
                "delivery.batch_size must be between {} and {}, got {}",
                MIN_BATCH_SIZE, MAX_BATCH_SIZE, self.delivery.batch_size
            )));
        }
        if self.trigger.sync_tag.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "trigger.sync_tag cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Saves configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Resolve the state directory holding the queue, config and daemon files.
///
/// `COURIER_STATE_DIR`, else `$XDG_STATE_HOME/courier`, else
/// `~/.local/state/courier`.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(STATE_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(STATE_DIR_NAME))
}

/// Path of the queue database inside a state directory.
pub fn queue_path(state_dir: &Path) -> PathBuf {
    state_dir.join(QUEUE_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
