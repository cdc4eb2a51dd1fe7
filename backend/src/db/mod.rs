//! Database connection and pool management
//!
//! The connection is modelled as an explicit `ConnectionState` value. `connect`
//! produces one with bounded retries; `ensure_connection` checks an existing
//! state and reconnects when it is stale. Whoever owns the state decides
//! where it lives.

use crate::config::DatabaseConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Database configuration for pool creation
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub connect_attempts: u32,
    pub retry_delay_ms: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            connect_attempts: 3,
            retry_delay_ms: 1000,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl From<&DatabaseConfig> for DbConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            connect_attempts: config.connect_attempts.max(1),
            retry_delay_ms: config.retry_delay_ms,
            idle_timeout_secs: config.idle_timeout_secs,
            max_lifetime_secs: config.max_lifetime_secs,
        }
    }
}

/// Current state of the database connection
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Disconnected { last_error: Option<String> },
    Connected { pool: PgPool, since: DateTime<Utc> },
}

impl ConnectionState {
    /// A state that has never tried to connect
    pub fn disconnected() -> Self {
        ConnectionState::Disconnected { last_error: None }
    }

    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            ConnectionState::Connected { pool, .. } => Some(pool),
            ConnectionState::Disconnected { .. } => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            ConnectionState::Disconnected { last_error } => last_error.as_deref(),
            ConnectionState::Connected { .. } => None,
        }
    }
}

/// Create a PostgreSQL connection pool with custom configuration
pub async fn create_pool_with_config(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(&config.url)?.application_name("vitatone");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    info!(
        "Database pool created: max={}, min={}",
        config.max_connections, config.min_connections
    );

    Ok(pool)
}

/// Connect with up to `connect_attempts` tries
///
/// Never fails: the last error is kept in the returned `Disconnected` state.
pub async fn connect(config: &DbConfig) -> ConnectionState {
    let attempts = config.connect_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match create_pool_with_config(config).await {
            Ok(pool) => {
                info!(attempt, "Database connection established");
                return ConnectionState::Connected {
                    pool,
                    since: Utc::now(),
                };
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "Database connection attempt failed");
                last_error = Some(e.to_string());
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
                }
            }
        }
    }

    ConnectionState::Disconnected { last_error }
}

/// Return a usable state, reconnecting when the current one is not
pub async fn ensure_connection(config: &DbConfig, state: ConnectionState) -> ConnectionState {
    if let ConnectionState::Connected { pool, since } = &state {
        match health_check(pool).await {
            Ok(()) => return state,
            Err(e) => warn!(connected_since = %since, error = %e, "Database connection went stale, reconnecting"),
        }
    }
    connect(config).await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}
