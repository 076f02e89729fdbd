//! Logging setup and configuration

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LogFormat;

pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

pub fn setup_logging(log_dir: &str, format: LogFormat) -> Result<Arc<LoggingGuard>> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::hourly(log_dir, "status-api.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_ansi(true)
            .with_level(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(false)
                .compact()
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?)
        )
        .init();

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}
