//! Dependency probes
//!
//! Each probe checks one dependency and reports a [`ServiceResult`]. Probes
//! return `Err(ProbeError)` for anything that prevented a conclusive check;
//! [`crate::errors::run_probe`] turns those into results uniformly.

pub mod self_check;
pub mod database;
pub mod broker;
pub mod rpc;
pub mod indexer;
pub mod prices;
pub mod relay;

pub use self_check::*;
pub use database::*;
pub use broker::*;
pub use rpc::*;
pub use indexer::*;
pub use prices::*;
pub use relay::*;

use async_trait::async_trait;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    types::{ServiceResult, Status},
};

pub const SELF_PROBE_TIMEOUT: Duration = Duration::from_millis(100);
pub const DATABASE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
pub const BROKER_PROBE_TIMEOUT: Duration = Duration::from_millis(800);
pub const BROKER_COMMAND_TIMEOUT: Duration = Duration::from_millis(500);
pub const RPC_HEAD_TIMEOUT: Duration = Duration::from_secs(1);
pub const INDEXER_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
pub const PRICE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
pub const RELAY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Service name as reported in the snapshot.
    fn name(&self) -> &'static str;

    fn timeout(&self) -> Duration;

    /// Status reported when `check` overruns `timeout`.
    fn timeout_status(&self) -> Status {
        Status::Unknown
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError>;
}
