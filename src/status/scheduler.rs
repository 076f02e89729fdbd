//! Debounced, non-overlapping background refresh

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::debug;
use super::Clock;

pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshState {
    pub in_progress: bool,
    pub last_trigger: Option<Instant>,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    state: Mutex<RefreshState>,
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    completed: watch::Sender<u64>,
}

impl RefreshScheduler {
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            state: Mutex::new(RefreshState::default()),
            min_interval,
            clock,
            completed,
        }
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    /// Count of finished refreshes; changes once per completed run.
    pub fn completions(&self) -> watch::Receiver<u64> {
        self.completed.subscribe()
    }

    /// Claim the refresh slot. `None` while a refresh is in flight or within
    /// `min_interval` of the last trigger.
    pub fn try_begin(self: &Arc<Self>) -> Option<RefreshGuard> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if state.in_progress {
            debug!("Status refresh already in progress");
            return None;
        }
        if let Some(last) = state.last_trigger {
            if now.saturating_duration_since(last) < self.min_interval {
                debug!("Status refresh debounced");
                return None;
            }
        }

        state.in_progress = true;
        state.last_trigger = Some(now);
        Some(RefreshGuard {
            scheduler: Arc::clone(self),
        })
    }

    fn finish(&self) {
        self.state.lock().in_progress = false;
        self.completed.send_modify(|n| *n += 1);
    }
}

/// Held for the duration of one refresh; releases the slot on drop, panics included.
#[derive(Debug)]
pub struct RefreshGuard {
    scheduler: Arc<RefreshScheduler>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.scheduler.finish();
    }
}
