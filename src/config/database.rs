use crate::error::{AppError, AppResult};
use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5000;

static QUERY_TIMEOUT: OnceLock<Duration> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub query_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable must be set"))?;

        let max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections: u32 = env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        Ok(Self {
            url,
            max_connections,
            min_connections: min_connections.min(max_connections),
            query_timeout: query_timeout_from_env(),
        })
    }

    /// Single-connection in-memory SQLite; every connection to `sqlite::memory:`
    /// is its own database, so the pool must never open a second one.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

fn query_timeout_from_env() -> Duration {
    let ms = env::var("DB_QUERY_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms: &u64| *ms > 0)
        .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);
    Duration::from_millis(ms)
}

pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(config.query_timeout)
        .sqlx_logging(true);

    // Idle in-memory connections must not be reaped, the data lives in them.
    if !config.url.starts_with("sqlite::memory:") {
        opt.idle_timeout(Duration::from_secs(300));
    }

    Database::connect(opt).await
}

/// Install the per-request persistence timeout. First caller wins.
pub fn init_query_timeout(timeout: Duration) {
    let _ = QUERY_TIMEOUT.set(timeout);
}

pub fn query_timeout() -> Duration {
    *QUERY_TIMEOUT.get_or_init(query_timeout_from_env)
}

/// Run a persistence operation under the configured timeout.
/// An expired deadline drops the future, rolling back any open transaction.
pub async fn with_timeout<T, F>(operation: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::time::timeout(query_timeout(), operation)
        .await
        .map_err(|_| AppError::Timeout)?
}
