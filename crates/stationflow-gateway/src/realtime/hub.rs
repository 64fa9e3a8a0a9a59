//! In-process publish/subscribe fan-out.
//!
//! Each subscriber is a bounded queue drained by its transport task. Delivery
//! is a non-blocking `try_send`: a closed queue (transport gone) or a full one
//! (transport stalled) closes the subscriber and removes it. Nothing is
//! replayed to late subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use stationflow_core::error::Result;
use stationflow_core::model::Station;

use super::types::HubEvent;

pub type SubscriberId = u64;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub pruned: usize,
}

pub struct BroadcastHub {
    subscribers: DashMap<SubscriberId, mpsc::Sender<HubEvent>>,
    seq: AtomicU64,
    queue: usize,
}

impl BroadcastHub {
    pub fn new(queue: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            seq: AtomicU64::new(1),
            queue: queue.max(1),
        }
    }

    /// Register a new subscriber and hand back its receiving end.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue);
        let id = self.register(tx);
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(self),
        }
    }

    /// Low-level registration of an existing sender. Ids are never reused.
    pub fn register(&self, tx: mpsc::Sender<HubEvent>) -> SubscriberId {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, tx);
        tracing::debug!(subscriber = id, total = self.subscribers.len(), "subscriber registered");
        id
    }

    /// Returns false if `id` was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = id, total = self.subscribers.len(), "subscriber closed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&self, station: &Station) -> Result<FanoutReport> {
        let ev = HubEvent::station_update(station)?;
        Ok(self.fanout(ev))
    }

    pub fn heartbeat(&self) -> FanoutReport {
        self.fanout(HubEvent::heartbeat())
    }

    /// Deliver `ev` to every subscriber registered right now, pruning the ones
    /// that fail. Works on a snapshot so registration never waits on a send.
    pub fn fanout(&self, ev: HubEvent) -> FanoutReport {
        let targets: Vec<(SubscriberId, mpsc::Sender<HubEvent>)> = self
            .subscribers
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();

        let mut report = FanoutReport::default();
        for (id, tx) in targets {
            match tx.try_send(ev.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => {
                    if self.unregister(id) {
                        report.pruned += 1;
                    }
                }
            }
        }
        report
    }
}

/// Receiving side of one subscriber. Dropping it unregisters the channel.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<HubEvent>,
    hub: Weak<BroadcastHub>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the hub has closed this subscriber.
    pub async fn recv(&mut self) -> Option<HubEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant for tests and draining.
    pub fn try_recv(&mut self) -> Option<HubEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unregister(self.id);
        }
    }
}
