//! Broker (Redis) access for the status probe

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Outcome of a broker reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCheck {
    /// The newest entry of the stream could be read.
    Readable,
    /// Stream read refused, but the broker answered PING.
    Pong,
    /// Stream read refused and PING came back with something else.
    NoPong,
}

#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Cheap read of the newest entry on `stream`, falling back to PING on the
    /// same connection when the read is refused. `Err` when the broker cannot
    /// be reached at all.
    async fn check_stream(&self, stream: &str) -> Result<StreamCheck>;
}

pub struct RedisBroker {
    client: redis::Client,
    command_timeout: Duration,
}

impl RedisBroker {
    pub fn new(url: &str, command_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).context("Failed to create Redis client")?;
        debug!(url = %redact_url(url), "Redis broker client created");
        Ok(Self { client, command_timeout })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        tokio::time::timeout(self.command_timeout, self.client.get_multiplexed_async_connection())
            .await
            .map_err(|_| anyhow::anyhow!("Redis connect timed out"))?
            .context("Failed to connect to Redis")
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| anyhow::anyhow!("Redis command timed out"))?
            .map_err(Into::into)
    }
}

#[async_trait]
impl BrokerClient for RedisBroker {
    async fn check_stream(&self, stream: &str) -> Result<StreamCheck> {
        let mut conn = self.connection().await?;

        let read = self
            .bounded(
                redis::cmd("XREVRANGE")
                    .arg(stream)
                    .arg("+")
                    .arg("-")
                    .arg("COUNT")
                    .arg(1)
                    .query_async::<redis::Value>(&mut conn),
            )
            .await;
        if let Err(e) = read {
            debug!(stream, error = %e, "XREVRANGE refused, falling back to PING");
            let pong: String = self
                .bounded(redis::cmd("PING").query_async(&mut conn))
                .await
                .context("Redis PING failed")?;
            return Ok(if pong == "PONG" { StreamCheck::Pong } else { StreamCheck::NoPong });
        }
        Ok(StreamCheck::Readable)
    }
}

/// Hide credentials in a broker URL before it reaches the logs.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
