//! Postgres-backed status store

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use super::{IndexerCheckpoint, PriceSourceObservation, StatusStore};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct PgStatusStore {
    pool: PgPool,
}

impl PgStatusStore {
    /// Builds a lazily-connecting pool so startup never waits on the database.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(database_url)
            .context("Invalid DATABASE_URL")?;

        info!(max_connections = MAX_CONNECTIONS, "Postgres pool configured");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn ping(&self) -> Result<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Liveness query failed")?;
        Ok(one == 1)
    }

    async fn latest_indexer_checkpoint(&self) -> Result<Option<IndexerCheckpoint>> {
        let (updated_at, last_block): (Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT EXTRACT(EPOCH FROM MAX(updated_at))::BIGINT AS updated_at, \
                    MAX(last_indexed_block)::BIGINT AS last_block \
             FROM indexer_state",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to read indexer_state")?;

        Ok(updated_at.map(|updated_at| IndexerCheckpoint {
            updated_at,
            last_block: last_block.unwrap_or(0).max(0) as u64,
        }))
    }

    async fn latest_price_per_source(&self) -> Result<Vec<PriceSourceObservation>> {
        let rows: Vec<(String, Option<i64>)> = sqlx::query_as(
            "SELECT source, MAX(timestamp)::BIGINT AS ts FROM token_prices GROUP BY source",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read token_prices")?;

        Ok(rows
            .into_iter()
            .map(|(source, latest_timestamp)| PriceSourceObservation {
                source,
                latest_timestamp,
            })
            .collect())
    }

    async fn pending_price_requests(&self) -> Result<u64> {
        let pending: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM price_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count pending price requests")?;
        Ok(pending.max(0) as u64)
    }

    async fn unpublished_relay_events(&self) -> Result<u64> {
        let backlog: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM outbox_events WHERE published_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count unpublished outbox events")?;
        Ok(backlog.max(0) as u64)
    }
}
