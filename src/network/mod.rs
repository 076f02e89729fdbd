//! Network collaborators: chain RPC and broker

pub mod providers;
pub mod broker;

pub use providers::*;
pub use broker::*;
