//! Error types and probe recovery

pub mod status_error;
pub mod recovery;

pub use status_error::*;
pub use recovery::*;
