//! Threshold-to-status derivation

use crate::types::Status;

/// Block lag above which the indexer is considered behind.
pub const BLOCK_LAG_DEGRADED: u64 = 10;

/// Age used for a price source with no usable timestamp.
pub const MISSING_PRICE_AGE_SEC: u64 = 1_000_000_000;

pub fn status_from_age(age_sec: u64, ok_sec: u64, warn_sec: u64) -> Status {
    if age_sec <= ok_sec {
        Status::Ok
    } else if age_sec <= warn_sec {
        Status::Degraded
    } else {
        Status::Down
    }
}

pub fn status_from_backlog(count: u64, warn: u64, crit: u64) -> Status {
    if count >= crit {
        Status::Down
    } else if count >= warn {
        Status::Degraded
    } else {
        Status::Ok
    }
}

pub fn status_from_block_lag(lag: u64) -> Status {
    if lag > BLOCK_LAG_DEGRADED {
        Status::Degraded
    } else {
        Status::Ok
    }
}

/// Seconds between `then` and `now`, clamped at zero.
pub fn age_since(now: i64, then: i64) -> u64 {
    now.saturating_sub(then).max(0) as u64
}
