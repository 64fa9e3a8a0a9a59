//! Notification stream (`GET /api/notifications/subscribe`).
//!
//! Lifecycle:
//! - subscribe to the hub on connect (no replay of earlier events)
//! - forward `station-update` / `heartbeat` events as SSE frames
//! - end the stream on hub close or after `subscriber_timeout_ms`
//! - client disconnect drops the stream, which unregisters the subscriber

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures_util::stream::{self, Stream};
use tokio::time::Instant;

use crate::app_state::AppState;
use crate::realtime::Subscription;

/// Keeps the active-stream gauge in step with stream lifetime.
struct StreamGuard {
    app: AppState,
    subscriber: u64,
}

impl StreamGuard {
    fn new(app: AppState, subscriber: u64) -> Self {
        app.metrics().sse_streams.inc(&[]);
        Self { app, subscriber }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.app.metrics().sse_streams.dec(&[]);
        tracing::debug!(subscriber = self.subscriber, "notification stream ended");
    }
}

pub async fn subscribe(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let sub = app.hub().subscribe();
    let deadline = Instant::now() + app.cfg().gateway.subscriber_timeout();
    let guard = StreamGuard::new(app, sub.id());

    tracing::debug!(subscriber = sub.id(), "notification stream opened");
    Sse::new(event_stream(sub, guard, deadline))
}

fn event_stream(
    sub: Subscription,
    guard: StreamGuard,
    deadline: Instant,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((sub, guard), move |(mut sub, guard)| async move {
        match tokio::time::timeout_at(deadline, sub.recv()).await {
            Ok(Some(ev)) => Some((Ok(ev.to_sse()), (sub, guard))),
            Ok(None) => None,
            Err(_) => {
                tracing::debug!(subscriber = sub.id(), "notification stream timed out");
                None
            }
        }
    })
}
