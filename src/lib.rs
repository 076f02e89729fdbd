//! Auction Status API - composite service health for the auction pipeline
//!
//! Probes the database, broker, chain RPC, indexer, price pipeline and event
//! relay concurrently, folds the results into one ordered snapshot, and serves
//! it from a cache so status requests never wait on a slow dependency.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod storage;
pub mod probes;
pub mod status;
pub mod web;
pub mod utils;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

// Re-export commonly used items
pub use config::Config;
pub use errors::{ProbeError, StatusError, StatusResult};
pub use status::{StatusAggregator, StatusService};
pub use types::{ServiceResult, Status, StatusSnapshot, ThresholdConfig};

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
