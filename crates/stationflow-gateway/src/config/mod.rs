//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use stationflow_core::error::{Result, StationFlowError};

pub use schema::{GatewayConfig, GatewaySection, LimitsSection, SeedStation};

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| StationFlowError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| StationFlowError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
