use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres-backed store when set, in-memory store otherwise.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Largest accepted request body; bigger posts get an in-band error envelope.
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            database_url: None,
            db_max_connections: 10,
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("APP_PORT={v}"))?,
            None => defaults.port,
        };
        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS={v}"))?,
            None => defaults.db_max_connections,
        };
        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_BODY_BYTES={v}"))?,
            None => defaults.max_body_bytes,
        };
        Ok(Self {
            host: get("APP_HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_max_connections,
            max_body_bytes,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
