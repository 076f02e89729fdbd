//! Service configuration and environment variable handling

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use crate::{
    errors::{StatusError, StatusResult},
    status::{DEFAULT_CACHE_TTL, DEFAULT_MIN_REFRESH_INTERVAL},
    types::ThresholdConfig,
};

// Configuration defaults
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_STREAM_KEY: &str = "events";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub redis_stream_key: String,
    /// `None` disables chain head lookups.
    pub rpc_url: Option<String>,
    pub thresholds: ThresholdConfig,
    pub cache_ttl: Duration,
    pub min_refresh_interval: Duration,
    pub log_dir: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> StatusResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take defaults; set but
    /// malformed keys are errors.
    pub fn from_lookup<F>(lookup: F) -> StatusResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let thresholds = ThresholdConfig {
            indexer_ok_sec: parse_or(&get, "DEV_INDEXER_OK_SEC", 30)?,
            indexer_warn_sec: parse_or(&get, "DEV_INDEXER_WARN_SEC", 120)?,
            price_ok_sec: parse_or(&get, "DEV_PRICE_OK_SEC", 600)?,
            price_warn_sec: parse_or(&get, "DEV_PRICE_WARN_SEC", 1800)?,
            relay_warn_count: parse_or(&get, "DEV_RELAY_WARN", 100)?,
            relay_crit_count: parse_or(&get, "DEV_RELAY_CRIT", 1000)?,
        };
        thresholds.validate()?;

        let database_url = get("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StatusError::MissingConfig {
                key: "DATABASE_URL".to_string(),
            })?;

        let rpc_url = match get("RPC_URL").or_else(|| get("DEV_ANVIL_RPC_URL")) {
            Some(url) if url.is_empty() => None,
            Some(url) => Some(url),
            None => Some(DEFAULT_RPC_URL.to_string()),
        };

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            api_host: get("API_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            api_port: parse_or(&get, "API_PORT", DEFAULT_API_PORT)?,
            database_url,
            redis_url: build_redis_url(&get),
            redis_stream_key: get("REDIS_STREAM_KEY")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_STREAM_KEY.to_string()),
            rpc_url,
            thresholds,
            cache_ttl: Duration::from_secs(parse_or(
                &get,
                "STATUS_CACHE_TTL_SEC",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
            min_refresh_interval: Duration::from_secs(parse_or(
                &get,
                "STATUS_REFRESH_MIN_INTERVAL_SEC",
                DEFAULT_MIN_REFRESH_INTERVAL.as_secs(),
            )?),
            log_dir: get("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            log_format,
        })
    }

    pub fn listen_addr(&self) -> StatusResult<SocketAddr> {
        let raw = format!("{}:{}", self.api_host, self.api_port);
        raw.parse().map_err(|e: std::net::AddrParseError| StatusError::InvalidConfig {
            key: "API_HOST".to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> StatusResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) if raw.is_empty() => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| StatusError::InvalidConfig {
            key: key.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// `REDIS_URL` wins; otherwise assemble one from host/port/db/TLS parts and
/// the first credential pair present (consumer, generic, then publisher).
fn build_redis_url<G>(get: &G) -> String
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("REDIS_URL").filter(|u| !u.is_empty()) {
        return url;
    }

    let part = |key: &str, default: &str| get(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string());
    let host = part("REDIS_HOST", "localhost");
    let port = part("REDIS_PORT", "6379");
    let db = part("REDIS_DB", "0");
    let tls = matches!(
        part("REDIS_TLS", "false").to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    );
    let scheme = if tls { "rediss" } else { "redis" };

    let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k).filter(|v| !v.is_empty())).unwrap_or_default();
    let mut user = first(&["REDIS_CONSUMER_USER", "REDIS_USERNAME"]);
    let mut pass = first(&["REDIS_CONSUMER_PASS", "REDIS_PASSWORD"]);
    if user.is_empty() && pass.is_empty() {
        user = first(&["REDIS_PUBLISHER_USER"]);
        pass = first(&["REDIS_PUBLISHER_PASS"]);
    }

    let auth = match (user.is_empty(), pass.is_empty()) {
        (false, false) => format!("{}:{}@", user, pass),
        (true, false) => format!(":{}@", pass),
        _ => String::new(),
    };

    format!("{}://{}{}:{}/{}", scheme, auth, host, port, db)
}
