//! Time source shared by the rate limiter and the approval engine.
//!
//! Everything that reads "now" goes through [`Clock`] so tests can move time
//! explicitly. Timestamps carry a fixed offset: the offset defines what
//! "local midnight" means for the daily quota.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    /// Current wall-clock time in the deployment's local offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Start of the current local calendar day, as UTC.
    fn start_of_day(&self) -> DateTime<Utc> {
        start_of_local_day(self.now())
    }
}

/// Midnight of `t`'s local calendar day.
pub fn start_of_local_day(t: DateTime<FixedOffset>) -> DateTime<Utc> {
    let midnight = t.date_naive().and_time(NaiveTime::MIN);
    // A fixed offset has no gaps or folds, so this is always a single instant.
    match midnight.and_local_timezone(*t.offset()).single() {
        Some(m) => m.with_timezone(&Utc),
        None => t.with_timezone(&Utc),
    }
}

/// Process clock backed by the host's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, t: DateTime<FixedOffset>) {
        if let Ok(mut g) = self.now.lock() {
            *g = t;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut g) = self.now.lock() {
            *g += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
