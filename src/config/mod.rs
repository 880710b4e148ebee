use std::env;
use std::time::Duration;

use crate::price::coinbase::COINBASE_BTC_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Primary store. `None` means memory-only.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,

    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_migrate: bool,

    pub price_api_url: String,
    pub price_cache_secs: u64,

    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            db_acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            db_migrate: env::var("DB_MIGRATE")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),

            price_api_url: env::var("PRICE_API_URL").unwrap_or_else(|_| COINBASE_BTC_URL.into()),
            price_cache_secs: env::var("PRICE_CACHE_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),

            log_format: match env::var("LOG_FORMAT").unwrap_or_default().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_secs)
    }
}
