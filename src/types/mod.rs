//! Core data types and structures

pub mod status;
pub mod service;
pub mod snapshot;

pub use status::*;
pub use service::*;
pub use snapshot::*;
