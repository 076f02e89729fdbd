//! Time sources for the status subsystem

use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync + Debug {
    /// Monotonic time, used for cache age and debounce.
    fn now(&self) -> Instant;

    /// Wall-clock unix seconds, used for data age and `generated_at`.
    fn unix_now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<(Instant, i64)>>,
}

impl ManualClock {
    pub fn new(unix_now: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new((Instant::now(), unix_now))),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock();
        guard.0 += by;
        guard.1 += by.as_secs() as i64;
    }

    pub fn set_unix(&self, unix_now: i64) {
        self.inner.lock().1 = unix_now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().0
    }

    fn unix_now(&self) -> i64 {
        self.inner.lock().1
    }
}
