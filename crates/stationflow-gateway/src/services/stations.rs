use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use stationflow_core::clock::Clock;
use stationflow_core::error::{Result, StationFlowError};
use stationflow_core::model::{derive_status, Location, Station, TransportType};

use crate::config::SeedStation;
use crate::store::StationStore;

/// Body of a station creation call. Status is never accepted from input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewStation {
    pub name: String,
    #[serde(rename = "type")]
    pub station_type: TransportType,
    pub location: Location,
    pub capacity: u32,
    pub available: u32,
}

/// Create/seed/delete paths for stations. Every path derives status the same
/// way the approval engine does.
pub struct StationCatalog {
    store: Arc<dyn StationStore>,
    clock: Arc<dyn Clock>,
}

impl StationCatalog {
    pub fn new(store: Arc<dyn StationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self) -> Result<Vec<Station>> {
        self.store.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Station> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| StationFlowError::NotFound(format!("station {id}")))
    }

    pub async fn name_of(&self, id: &str) -> Result<Option<String>> {
        Ok(self.store.get(id).await?.map(|s| s.name))
    }

    /// User-created station, owned by `owner_id`.
    pub async fn create(&self, input: NewStation, owner_id: &str) -> Result<Station> {
        let station = Station {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            station_type: input.station_type,
            location: input.location,
            capacity: input.capacity,
            available: input.available,
            status: derive_status(input.station_type, input.available),
            last_update: self.clock.now().with_timezone(&Utc),
            is_custom: true,
            owner_id: Some(owner_id.to_string()),
        };
        station.validate()?;

        let station = self.store.save(station).await?;
        tracing::info!(station_id = %station.id, owner = %owner_id, "custom station created");
        Ok(station)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(StationFlowError::NotFound(format!("station {id}")));
        }
        tracing::info!(station_id = %id, "station deleted");
        Ok(())
    }

    /// Load configured stations, replacing any stored under the same id.
    pub async fn seed(&self, seeds: &[SeedStation]) -> Result<usize> {
        let now = self.clock.now().with_timezone(&Utc);
        for s in seeds {
            let station = Station {
                id: s.id.clone(),
                name: s.name.clone(),
                station_type: s.station_type,
                location: Location { lat: s.lat, lng: s.lng },
                capacity: s.capacity,
                available: s.available,
                status: derive_status(s.station_type, s.available),
                last_update: now,
                is_custom: false,
                owner_id: None,
            };
            self.store.save(station).await?;
        }
        Ok(seeds.len())
    }

    /// Re-derive status for every stored station; returns how many changed.
    pub async fn reconcile_statuses(&self) -> Result<usize> {
        let mut fixed = 0;
        for mut station in self.store.list().await? {
            if station.reconcile_status() {
                tracing::debug!(station_id = %station.id, status = ?station.status, "station status reconciled");
                self.store.save(station).await?;
                fixed += 1;
            }
        }
        Ok(fixed)
    }
}
