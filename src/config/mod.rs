//! Configuration management for the status API

pub mod settings;

pub use settings::*;
