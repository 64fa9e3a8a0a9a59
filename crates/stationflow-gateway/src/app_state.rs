//! Shared application state for the StationFlow gateway.
//!
//! Wires the clock, stores, rate limiter, broadcast hub and approval engine
//! into one cheaply clonable handle for axum.

use std::sync::Arc;

use stationflow_core::clock::{Clock, SystemClock};
use stationflow_core::error::Result;

use crate::approval::ApprovalEngine;
use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::policy::RateLimiter;
use crate::realtime::BroadcastHub;
use crate::services::StationCatalog;
use crate::store::{InMemoryRequestStore, InMemoryStationStore, RequestStore, StationStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    metrics: GatewayMetrics,
    limiter: RateLimiter,
    hub: Arc<BroadcastHub>,
    engine: ApprovalEngine,
    catalog: StationCatalog,
}

impl AppState {
    /// Production wiring: system clock and in-memory stores.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_parts(
            cfg,
            Arc::new(SystemClock),
            Arc::new(InMemoryStationStore::new()),
            Arc::new(InMemoryRequestStore::new()),
        )
    }

    pub fn with_parts(
        cfg: GatewayConfig,
        clock: Arc<dyn Clock>,
        stations: Arc<dyn StationStore>,
        requests: Arc<dyn RequestStore>,
    ) -> Result<Self> {
        cfg.validate()?;

        let hub = Arc::new(BroadcastHub::new(cfg.gateway.subscriber_queue));
        let limiter = RateLimiter::new(
            cfg.limits.submit_max,
            cfg.limits.submit_window(),
            Arc::clone(&clock),
        );
        let engine = ApprovalEngine::new(
            Arc::clone(&stations),
            requests,
            Arc::clone(&hub),
            Arc::clone(&clock),
            cfg.limits.daily_quota,
        );
        let catalog = StationCatalog::new(stations, clock);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics: GatewayMetrics::default(),
                limiter,
                hub,
                engine,
                catalog,
            }),
        })
    }

    /// Seed configured stations, then bring every stored status in line with
    /// the derivation rule.
    pub async fn bootstrap(&self) -> Result<()> {
        let seeded = self.inner.catalog.seed(&self.inner.cfg.stations).await?;
        let fixed = self.inner.catalog.reconcile_statuses().await?;
        tracing::info!(seeded, reconciled = fixed, "station catalog ready");
        Ok(())
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.inner.hub)
    }

    pub fn engine(&self) -> &ApprovalEngine {
        &self.inner.engine
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.inner.catalog
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Point-in-time values rendered next to the registry.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("stationflow_hub_subscribers", self.inner.hub.subscriber_count() as u64),
            ("stationflow_rate_limit_keys", self.inner.limiter.len() as u64),
        ]
    }
}
