//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env`).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_PREVIEW_BASE_URL: &str = "/api/preview";
const DEFAULT_EXPIRE_SWEEP_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub frontend_origins: Vec<HeaderValue>,
    pub preview_base_url: String,
    /// `None` when `EXPIRE_SWEEP_SECS=0`; the startup sweep still runs
    pub expire_sweep_interval: Option<Duration>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8787")?;

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        // Unparseable origins are skipped rather than fatal
        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        let preview_base_url =
            lookup("PREVIEW_BASE_URL").unwrap_or_else(|| DEFAULT_PREVIEW_BASE_URL.to_string());

        let expire_sweep_secs = match lookup("EXPIRE_SWEEP_SECS") {
            Some(raw) => raw
                .parse()
                .context("EXPIRE_SWEEP_SECS must be a whole number of seconds")?,
            None => DEFAULT_EXPIRE_SWEEP_SECS,
        };
        let expire_sweep_interval =
            (expire_sweep_secs > 0).then(|| Duration::from_secs(expire_sweep_secs));

        Ok(Self {
            database_url,
            bind_addr,
            database_max_connections,
            frontend_origins,
            preview_base_url,
            expire_sweep_interval,
        })
    }
}
