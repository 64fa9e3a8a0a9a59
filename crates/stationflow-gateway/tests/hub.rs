#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use stationflow_core::model::{Location, Station, StationStatus, TransportType};
use stationflow_gateway::realtime::{BroadcastHub, EventKind, FanoutReport};

fn station(available: u32) -> Station {
    Station {
        id: "s1".into(),
        name: "Moda Dock".into(),
        station_type: TransportType::Bike,
        location: Location { lat: 40.98, lng: 29.03 },
        capacity: 10,
        available,
        status: StationStatus::Active,
        last_update: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        is_custom: false,
        owner_id: None,
    }
}

#[tokio::test]
async fn publish_reaches_every_current_subscriber_once() {
    let hub = Arc::new(BroadcastHub::new(8));
    let mut a = hub.subscribe();
    let mut b = hub.subscribe();

    let report = hub.publish(&station(7)).unwrap();
    assert_eq!(report, FanoutReport { delivered: 2, pruned: 0 });

    for sub in [&mut a, &mut b] {
        let ev = sub.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::StationUpdate);
        let v: serde_json::Value = serde_json::from_str(&ev.data).unwrap();
        assert_eq!(v["available"], 7);
        assert!(sub.try_recv().is_none());
    }
}

#[tokio::test]
async fn late_subscriber_gets_no_replay() {
    let hub = Arc::new(BroadcastHub::new(8));
    let _early = hub.subscribe();
    hub.publish(&station(1)).unwrap();

    let mut late = hub.subscribe();
    assert!(late.try_recv().is_none());

    hub.publish(&station(2)).unwrap();
    let ev = late.recv().await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&ev.data).unwrap();
    assert_eq!(v["available"], 2);
}

#[tokio::test]
async fn closed_channel_is_pruned_without_hurting_others() {
    let hub = Arc::new(BroadcastHub::new(8));
    let mut alive = hub.subscribe();

    let (tx, rx) = mpsc::channel(8);
    let dead = hub.register(tx);
    drop(rx);
    assert_eq!(hub.subscriber_count(), 2);

    let report = hub.publish(&station(4)).unwrap();
    assert_eq!(report, FanoutReport { delivered: 1, pruned: 1 });
    assert_eq!(hub.subscriber_count(), 1);
    assert!(!hub.unregister(dead), "dead subscriber must already be gone");

    let report = hub.heartbeat();
    assert_eq!(report, FanoutReport { delivered: 1, pruned: 0 });

    assert_eq!(alive.recv().await.unwrap().kind, EventKind::StationUpdate);
    let hb = alive.recv().await.unwrap();
    assert_eq!(hb.kind, EventKind::Heartbeat);
    assert_eq!(&*hb.data, "ping");
}

#[tokio::test]
async fn stalled_subscriber_is_closed_and_drains_to_end() {
    let hub = Arc::new(BroadcastHub::new(1));
    let mut slow = hub.subscribe();

    assert_eq!(hub.heartbeat().delivered, 1);
    // Queue of one is full now.
    assert_eq!(hub.heartbeat(), FanoutReport { delivered: 0, pruned: 1 });
    assert_eq!(hub.subscriber_count(), 0);

    assert_eq!(slow.recv().await.unwrap().kind, EventKind::Heartbeat);
    assert!(slow.recv().await.is_none(), "closed subscriber ends its stream");
}

#[tokio::test]
async fn dropping_subscription_unregisters() {
    let hub = Arc::new(BroadcastHub::new(4));
    let a = hub.subscribe();
    let b = hub.subscribe();
    assert_ne!(a.id(), b.id());
    assert_eq!(hub.subscriber_count(), 2);

    drop(a);
    assert_eq!(hub.subscriber_count(), 1);
    drop(b);
    assert_eq!(hub.heartbeat(), FanoutReport::default());
}

#[test]
fn heartbeat_event_renders_as_sse() {
    let ev = stationflow_gateway::realtime::HubEvent::heartbeat();
    assert_eq!(ev.kind.as_str(), "heartbeat");
    let _frame = ev.to_sse();
}
