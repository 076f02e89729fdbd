//! Auction Status API - Main Entry Point
//!
//! Serves `/status` and `/health` for the auction monitoring pipeline

use auction_status::{
    network::{BrokerClient, ChainHeadSource, RedisBroker, RpcChainHead},
    probes::{BROKER_COMMAND_TIMEOUT, RPC_HEAD_TIMEOUT},
    status::{Collaborators, SystemClock},
    storage::PgStatusStore,
    utils, web, Config, StatusAggregator, StatusService,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load and validate configuration before anything else
    let config = Config::from_env()?;

    // Initialize logging
    let _logging_guard = utils::setup_logging(&config.log_dir, config.log_format)?;

    info!("🩺 Auction Status API v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Listen: {}:{}", config.api_host, config.api_port);
    info!("   Indexer thresholds: ok={}s warn={}s", config.thresholds.indexer_ok_sec, config.thresholds.indexer_warn_sec);
    info!("   Price thresholds: ok={}s warn={}s", config.thresholds.price_ok_sec, config.thresholds.price_warn_sec);
    info!("   Relay thresholds: warn={} crit={}", config.thresholds.relay_warn_count, config.thresholds.relay_crit_count);
    info!("   Cache TTL: {:?}, min refresh interval: {:?}", config.cache_ttl, config.min_refresh_interval);

    let addr = config.listen_addr()?;

    // Setup collaborators
    let store = Arc::new(PgStatusStore::connect_lazy(&config.database_url)?);

    let broker: Option<Arc<dyn BrokerClient>> =
        match RedisBroker::new(&config.redis_url, BROKER_COMMAND_TIMEOUT) {
            Ok(broker) => Some(Arc::new(broker)),
            Err(e) => {
                warn!("⚠️ Broker client unavailable, redis will report unknown: {:#}", e);
                None
            }
        };

    let chain_head: Option<Arc<dyn ChainHeadSource>> = match config.rpc_url.as_deref() {
        Some(url) => match RpcChainHead::new(url, RPC_HEAD_TIMEOUT) {
            Ok(source) => Some(Arc::new(source)),
            Err(e) => {
                warn!("⚠️ RPC endpoint unusable, block lag disabled: {:#}", e);
                None
            }
        },
        None => {
            info!("   RPC: disabled");
            None
        }
    };

    let clock = Arc::new(SystemClock);
    let aggregator = StatusAggregator::standard(
        Collaborators {
            store,
            broker,
            chain_head,
            stream_key: config.redis_stream_key.clone(),
        },
        config.thresholds,
        clock.clone(),
    );
    let status = Arc::new(StatusService::new(
        aggregator,
        config.cache_ttl,
        config.min_refresh_interval,
        clock,
    ));

    // Warm the cache so the first request is less likely to see a placeholder
    status.trigger_refresh();

    let app = web::create_app(web::AppState::new(status));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("📛 Received shutdown signal (Ctrl+C)...");
}
