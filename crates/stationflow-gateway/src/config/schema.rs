use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use stationflow_core::error::{Result, StationFlowError};
use stationflow_core::model::{Location, TransportType};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub limits: LimitsSection,

    #[serde(default)]
    pub stations: Vec<SeedStation>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StationFlowError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.limits.validate()?;

        let mut seen = HashSet::new();
        for s in &self.stations {
            s.validate()?;
            if !seen.insert(s.id.as_str()) {
                return Err(StationFlowError::BadRequest(format!(
                    "stations: duplicate id {}",
                    s.id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    #[serde(default = "default_subscriber_timeout_ms")]
    pub subscriber_timeout_ms: u64,

    #[serde(default = "default_subscriber_queue")]
    pub subscriber_queue: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            subscriber_timeout_ms: default_subscriber_timeout_ms(),
            subscriber_queue: default_subscriber_queue(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=300_000).contains(&self.heartbeat_interval_ms) {
            return Err(StationFlowError::BadRequest(
                "gateway.heartbeat_interval_ms must be between 1000 and 300000".into(),
            ));
        }
        if self.subscriber_timeout_ms <= self.heartbeat_interval_ms {
            return Err(StationFlowError::BadRequest(
                "gateway.subscriber_timeout_ms must be greater than heartbeat_interval_ms".into(),
            ));
        }
        if !(1..=4096).contains(&self.subscriber_queue) {
            return Err(StationFlowError::BadRequest(
                "gateway.subscriber_queue must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn subscriber_timeout(&self) -> Duration {
        Duration::from_millis(self.subscriber_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_heartbeat_interval_ms() -> u64 {
    30_000
}
fn default_subscriber_timeout_ms() -> u64 {
    30 * 60 * 1000
}
fn default_subscriber_queue() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsSection {
    /// Submissions allowed per key per window.
    #[serde(default = "default_submit_max")]
    pub submit_max: u32,

    #[serde(default = "default_submit_window_secs")]
    pub submit_window_secs: u64,

    /// Requests a non-admin may create per local calendar day.
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            submit_max: default_submit_max(),
            submit_window_secs: default_submit_window_secs(),
            daily_quota: default_daily_quota(),
        }
    }
}

impl LimitsSection {
    pub fn validate(&self) -> Result<()> {
        if self.submit_max == 0 {
            return Err(StationFlowError::BadRequest("limits.submit_max must be >= 1".into()));
        }
        if self.submit_window_secs == 0 {
            return Err(StationFlowError::BadRequest(
                "limits.submit_window_secs must be >= 1".into(),
            ));
        }
        if self.daily_quota == 0 {
            return Err(StationFlowError::BadRequest("limits.daily_quota must be >= 1".into()));
        }
        Ok(())
    }

    pub fn submit_window(&self) -> Duration {
        Duration::from_secs(self.submit_window_secs)
    }
}

fn default_submit_max() -> u32 {
    5
}
fn default_submit_window_secs() -> u64 {
    3600
}
fn default_daily_quota() -> u32 {
    5
}

/// Station loaded at startup. Status is always derived, never configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub station_type: TransportType,
    pub lat: f64,
    pub lng: f64,
    pub capacity: u32,
    pub available: u32,
}

impl SeedStation {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(StationFlowError::BadRequest("stations: id must not be empty".into()));
        }
        if self.available > self.capacity {
            return Err(StationFlowError::BadRequest(format!(
                "stations.{}: available must not exceed capacity",
                self.id
            )));
        }
        Location { lat: self.lat, lng: self.lng }.validate()
    }
}
