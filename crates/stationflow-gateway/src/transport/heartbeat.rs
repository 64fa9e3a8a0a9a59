use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app_state::AppState;
use crate::realtime::EventKind;

/// Send a keepalive to every subscriber once per `heartbeat_interval_ms`.
pub fn spawn_heartbeat(app: AppState) -> JoinHandle<()> {
    let every = app.cfg().gateway.heartbeat_interval();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        tick.tick().await;

        loop {
            tick.tick().await;
            run_once(&app);
        }
    })
}

pub fn run_once(app: &AppState) {
    let report = app.hub().heartbeat();
    let kind = EventKind::Heartbeat.as_str();
    let m = app.metrics();
    m.hub_deliveries.add(&[("kind", kind)], report.delivered as u64);
    m.hub_pruned.add(&[("kind", kind)], report.pruned as u64);
    if report.pruned > 0 {
        tracing::debug!(pruned = report.pruned, live = report.delivered, "heartbeat pruned subscribers");
    }
}
