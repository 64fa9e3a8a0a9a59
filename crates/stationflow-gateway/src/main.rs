//! StationFlow gateway
//!
//! - REST: station catalog + update-request workflow under /api/stations
//! - SSE: live station updates at /api/notifications/subscribe
//! - Heartbeat every `heartbeat_interval_ms` to every subscriber
//! - Graceful shutdown on Ctrl-C (readyz flips to draining)

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use stationflow_core::error::{Result, StationFlowError};
use stationflow_gateway::{app_state, config, router, transport};

const CONFIG_ENV: &str = "STATIONFLOW_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "stationflow.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        StationFlowError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = app_state::AppState::new(cfg)?;
    state.bootstrap().await?;

    let heartbeat = transport::heartbeat::spawn_heartbeat(state.clone());
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "stationflow-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| StationFlowError::Internal(format!("failed to bind {listen}: {e}")))?;

    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested; draining");
            drain.set_draining();
        })
        .await
        .map_err(|e| StationFlowError::Internal(format!("server failed: {e}")))?;

    heartbeat.abort();
    Ok(())
}
