//! Composite service-health aggregation and caching

pub mod clock;
pub mod thresholds;
pub mod aggregator;
pub mod cache;
pub mod scheduler;
pub mod service;

pub use clock::*;
pub use thresholds::*;
pub use aggregator::*;
pub use cache::*;
pub use scheduler::*;
pub use service::*;
