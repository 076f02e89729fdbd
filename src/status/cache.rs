//! Process-wide holder of the latest snapshot

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::{
    errors::{StatusError, StatusResult},
    types::StatusSnapshot,
};
use tracing::debug;
use super::Clock;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<StatusSnapshot>,
    pub captured_at: Instant,
    /// Generation of the aggregation run that produced `snapshot`.
    pub generation: u64,
}

/// Result of a cache read, classified by freshness.
#[derive(Debug, Clone)]
pub enum CacheState {
    Cold,
    Warm(Arc<StatusSnapshot>),
    Stale(Arc<StatusSnapshot>),
}

/// Single-entry cache. Writers replace the whole entry under the lock, so
/// readers never see a partially written snapshot. Each aggregation run takes
/// a generation up front; a run that finishes after a newer one has been
/// stored is discarded.
#[derive(Debug)]
pub struct StatusCache {
    entry: RwLock<Option<CacheEntry>>,
    generations: AtomicU64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl StatusCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: RwLock::new(None),
            generations: AtomicU64::new(0),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn read(&self) -> CacheState {
        let guard = self.entry.read();
        match guard.as_ref() {
            None => CacheState::Cold,
            Some(entry) => {
                let age = self.clock.now().saturating_duration_since(entry.captured_at);
                if age > self.ttl {
                    CacheState::Stale(entry.snapshot.clone())
                } else {
                    CacheState::Warm(entry.snapshot.clone())
                }
            }
        }
    }

    pub fn current(&self) -> StatusResult<CacheEntry> {
        self.entry.read().clone().ok_or(StatusError::CacheMiss)
    }

    /// Claim the generation for an aggregation run about to start.
    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the entry unless a newer generation is already cached.
    /// Returns whether the snapshot was kept.
    pub fn store(&self, generation: u64, snapshot: StatusSnapshot) -> bool {
        let mut entry = self.entry.write();
        if let Some(current) = entry.as_ref() {
            if current.generation > generation {
                debug!(
                    generation,
                    cached = current.generation,
                    "Discarding snapshot older than cached entry"
                );
                return false;
            }
        }
        *entry = Some(CacheEntry {
            snapshot: Arc::new(snapshot),
            captured_at: self.clock.now(),
            generation,
        });
        true
    }
}
