//! Custom error types for the status subsystem

use std::time::Duration;
use thiserror::Error;

/// Failure of a single probe. Never escapes the probe wrapper; see [`super::run_probe`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("timeout after {}ms", after.as_millis())]
    Timeout {
        after: Duration,
    },

    #[error("{message}")]
    Connection {
        message: String,
    },

    #[error("{what}")]
    DataMissing {
        what: String,
    },

    #[error("{message}")]
    Inconclusive {
        message: String,
    },

    #[error("{reason}")]
    Unsupported {
        reason: String,
    },
}

impl ProbeError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        ProbeError::Connection { message: err.to_string() }
    }

    pub fn inconclusive(err: impl std::fmt::Display) -> Self {
        ProbeError::Inconclusive { message: err.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Invalid configuration: {key}={value:?} - {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {key}")]
    MissingConfig {
        key: String,
    },

    #[error("Invalid thresholds: {reason}")]
    InvalidThresholds {
        reason: String,
    },

    #[error("No status snapshot available yet")]
    CacheMiss,

    #[error("Aggregation completed with failed probes: {}", failed.join(", "))]
    AggregationPartialFailure {
        failed: Vec<String>,
    },
}

pub type StatusResult<T> = Result<T, StatusError>;
