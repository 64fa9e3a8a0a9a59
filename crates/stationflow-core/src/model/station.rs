//! Station snapshot and the transit-mode status rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StationFlowError};

/// Transit mode of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Bus,
    Metro,
    Bike,
    Scooter,
    Minibus,
    Taxi,
    Dolmus,
}

impl TransportType {
    /// Fixed-route modes treat zero availability as "full"; every other mode
    /// is a shared fleet where zero availability means "empty".
    pub fn is_fixed_route(self) -> bool {
        matches!(self, TransportType::Bus | TransportType::Metro)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Metro => "metro",
            TransportType::Bike => "bike",
            TransportType::Scooter => "scooter",
            TransportType::Minibus => "minibus",
            TransportType::Taxi => "taxi",
            TransportType::Dolmus => "dolmus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Active,
    /// Operator-set only; never produced by [`derive_status`].
    Maintenance,
    Empty,
    Full,
}

/// Status for a station of type `ty` holding `available` units.
///
/// A full bike dock is good news for a renter, so shared-vehicle modes stay
/// `Active` up to capacity and only become `Empty` at zero.
pub fn derive_status(ty: TransportType, available: u32) -> StationStatus {
    match (ty.is_fixed_route(), available) {
        (true, 0) => StationStatus::Full,
        (false, 0) => StationStatus::Empty,
        _ => StationStatus::Active,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(StationFlowError::BadRequest(
                "location.lat must be between -90 and 90".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(StationFlowError::BadRequest(
                "location.lng must be between -180 and 180".into(),
            ));
        }
        Ok(())
    }
}

/// Station snapshot as stored and as broadcast to viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub station_type: TransportType,
    pub location: Location,
    pub capacity: u32,
    pub available: u32,
    pub status: StationStatus,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Station {
    /// Set availability and re-derive status in one step.
    ///
    /// Every mutation of `available` must go through here so the status rule
    /// cannot drift between call sites.
    pub fn apply_availability(&mut self, available: u32, at: DateTime<Utc>) {
        self.available = available;
        self.status = derive_status(self.station_type, available);
        self.last_update = at;
    }

    /// Re-derive status from the current availability. Returns true if it
    /// changed. Operator-set maintenance is left alone.
    pub fn reconcile_status(&mut self) -> bool {
        if self.status == StationStatus::Maintenance {
            return false;
        }
        let derived = derive_status(self.station_type, self.available);
        if derived == self.status {
            return false;
        }
        self.status = derived;
        true
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StationFlowError::BadRequest("station name must not be empty".into()));
        }
        if self.available > self.capacity {
            return Err(StationFlowError::BadRequest(format!(
                "available ({}) must not exceed capacity ({})",
                self.available, self.capacity
            )));
        }
        self.location.validate()
    }
}
