//! Process configuration, read from environment variables at startup.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "culinary_book.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;
pub const DEFAULT_DB_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path, or `:memory:`
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_pool_size: u32,
    pub db_busy_timeout_ms: u64,
    /// Echo the per-request query count as an `X-DB-Query-Count` header
    pub track_db_query_count: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = parse_var(
            "BIND_ADDR",
            lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let db_pool_size: u32 = match lookup("DB_POOL_SIZE") {
            Some(value) => parse_var("DB_POOL_SIZE", value)?,
            None => DEFAULT_DB_POOL_SIZE,
        };
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_POOL_SIZE",
                value: "0".to_string(),
                reason: "pool size must be at least 1".to_string(),
            });
        }

        let db_busy_timeout_ms = match lookup("DB_BUSY_TIMEOUT_MS") {
            Some(value) => parse_var("DB_BUSY_TIMEOUT_MS", value)?,
            None => DEFAULT_DB_BUSY_TIMEOUT_MS,
        };

        let track_db_query_count = lookup("TRACK_DB_QUERY_COUNT")
            .map(|v| v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            db_pool_size,
            db_busy_timeout_ms,
            track_db_query_count,
        })
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
