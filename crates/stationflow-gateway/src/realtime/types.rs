use std::sync::Arc;

use axum::response::sse::Event;

use stationflow_core::error::{Result, StationFlowError};
use stationflow_core::model::Station;

/// Named event kinds on the notification stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StationUpdate,
    Heartbeat,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::StationUpdate => "station-update",
            EventKind::Heartbeat => "heartbeat",
        }
    }
}

pub const HEARTBEAT_DATA: &str = "ping";

/// Event prepared for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub struct HubEvent {
    pub kind: EventKind,
    pub data: Arc<str>,
}

impl HubEvent {
    pub fn station_update(station: &Station) -> Result<Self> {
        let s = serde_json::to_string(station)
            .map_err(|e| StationFlowError::Internal(format!("station encode failed: {e}")))?;
        Ok(Self {
            kind: EventKind::StationUpdate,
            data: Arc::from(s),
        })
    }

    pub fn heartbeat() -> Self {
        Self {
            kind: EventKind::Heartbeat,
            data: Arc::from(HEARTBEAT_DATA),
        }
    }

    /// Convert to an SSE frame for transport.
    pub fn to_sse(&self) -> Event {
        Event::default().event(self.kind.as_str()).data(&*self.data)
    }
}
