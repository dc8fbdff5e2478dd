//! Warehouse scenario configuration: the human-facing description of a
//! grid, its facilities, the item catalogue, and the initial fleet, from
//! which a `Warehouse` is constructed (§6 `Initialise`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config file extension: {0}")]
    UnsupportedFormat(String),

    #[error("{0} validation error(s), see details")]
    Invalid(usize),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WarehouseConfig {
    pub dimensions: GridDimensions,
    #[serde(default)]
    pub obstacles: Vec<CellRef>,
    pub items: Vec<ItemConfig>,
    pub racks: Vec<RackConfig>,
    pub gates: Vec<GateConfig>,
    #[serde(default)]
    pub stations: Vec<StationConfig>,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub policies: PolicyConfig,
    /// Orders to submit once at startup, in the exact shape of the wire
    /// `SubmitOrder` message (§6). Not part of the `Initialise` contract
    /// proper - a live deployment gets its orders from the
    /// transport - but a batch `simulate` run has no transport to submit
    /// them over, so the CLI seeds them from here instead. Deliberately a
    /// plain static list rather than a stochastic arrival process.
    #[serde(default)]
    pub orders: Vec<OrderSeedConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GridDimensions {
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemConfig {
    pub id: String,
    pub unit_weight: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RackConfig {
    pub id: String,
    pub row: u32,
    pub col: u32,
    pub container_weight: f64,
    pub capacity: f64,
    #[serde(default)]
    pub initial_stock: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateConfig {
    pub id: String,
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    pub id: String,
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub id: String,
    pub row: u32,
    pub col: u32,
    #[serde(default = "default_direction")]
    pub direction: String,
    pub load_capacity: f64,
}

fn default_direction() -> String {
    "up".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderSeedConfig {
    pub id: String,
    /// "collect" or "refill"
    pub kind: String,
    pub gate: String,
    /// Refill orders name exactly one rack (§9); collect orders leave this unset.
    #[serde(default)]
    pub rack: Option<String>,
    #[serde(default)]
    pub items: HashMap<String, u32>,
}

/// §4.8 open-question policies, all optional with documented defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Minimum ticks a gate stays bound before `UnbindGate`. Default: 1.
    pub gate_dwell_ticks: Option<u32>,
    /// Consecutive no-progress ticks before an order is dismissed.
    /// Default: 500.
    pub dismissal_threshold_ticks: Option<u32>,
    /// Bound on freshly allocated racks per dispatch call before the
    /// redundant-rack removal pass unwinds the weakest ones (§9).
    /// Default: 3.
    pub redundant_rack_threshold: Option<usize>,
}

impl WarehouseConfig {
    /// Load from a YAML or JSON file, dispatching on extension (§2.1).
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let extension = path.rsplit('.').next().unwrap_or_default();
        if !matches!(extension, "yaml" | "yml" | "json") {
            return Err(ConfigError::UnsupportedFormat(extension.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        match extension {
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            _ => Ok(serde_json::from_str(&content)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_is_rejected_without_touching_the_filesystem() {
        let err = WarehouseConfig::from_file("scenario.txt").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "txt"));
    }
}
