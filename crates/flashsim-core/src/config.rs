//! TOML configuration for simulation runs.
//!
//! Every section and field has a default, so a partial (or empty) file is
//! valid; the CLI overrides individual fields afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub trace: TraceSection,
}

/// General simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Human-readable name for this run.
    #[serde(default = "default_sim_name")]
    pub name: String,
    /// Tenant count; 0 means infer `max(user_id) + 1` from the trace.
    #[serde(default)]
    pub users: u32,
}

fn default_sim_name() -> String {
    "simulation".to_string()
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: default_sim_name(),
            users: 0,
        }
    }
}

/// Device model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSection {
    /// Number of parallel service channels.
    #[serde(default = "default_channels")]
    pub channels: u32,
    /// Aggregate read bandwidth in MB/s.
    #[serde(default = "default_read_bw")]
    pub read_bw_mbps: f64,
    /// Aggregate write bandwidth in MB/s.
    #[serde(default = "default_write_bw")]
    pub write_bw_mbps: f64,
}

fn default_channels() -> u32 {
    8
}
fn default_read_bw() -> f64 {
    2000.0
}
fn default_write_bw() -> f64 {
    1200.0
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            read_bw_mbps: default_read_bw(),
            write_bw_mbps: default_write_bw(),
        }
    }
}

/// Scheduling policy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    /// Policy name: `rr`, `drr`, `qfq`, or `sgfs`.
    #[serde(default = "default_policy")]
    pub policy: String,
    /// DRR quantum in bytes.
    #[serde(default = "default_quantum")]
    pub quantum: f64,
    /// Per-tenant weights; tenants beyond the list default to 1.0.
    #[serde(default)]
    pub weights: Vec<f64>,
    /// SGFS rotation interval in picks.
    #[serde(default = "default_rotate_every")]
    pub rotate_every: u32,
    /// SGFS rotation stride.
    #[serde(default = "default_gap")]
    pub gap: u32,
}

fn default_policy() -> String {
    "qfq".to_string()
}
fn default_quantum() -> f64 {
    4096.0
}
fn default_rotate_every() -> u32 {
    200
}
fn default_gap() -> u32 {
    1
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            quantum: default_quantum(),
            weights: Vec::new(),
            rotate_every: default_rotate_every(),
            gap: default_gap(),
        }
    }
}

/// Trace source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceSection {
    /// Path to the trace file (CSV or blkparse output).
    pub path: Option<String>,
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate consistency. Called by the parsers; call again after
    /// applying CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.channels == 0 {
            return Err(ConfigError::Validation(
                "device.channels must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
