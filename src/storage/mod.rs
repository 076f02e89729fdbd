//! Read access to the pipeline tables the status probes inspect

pub mod store;
pub mod postgres;

pub use store::*;
pub use postgres::*;
