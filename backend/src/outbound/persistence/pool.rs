//! bb8-backed pool of asynchronous Diesel connections.
//!
//! Repositories check a connection out per operation; dropping the guard
//! returns it to the pool on every exit path, including early `?` returns.
//! The two failure modes a caller can see are "the pool could not be built"
//! and "no connection became available in time", and both carry only a
//! message so the repositories can fold them into their port errors.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures surfaced by [`DbPool`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available within the checkout timeout.
    #[error("failed to get connection from pool: {0}")]
    Checkout(String),

    /// The pool itself could not be constructed.
    #[error("failed to build connection pool: {0}")]
    Build(String),
}

/// Sizing and timeout settings for [`DbPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Configuration for the given database URL with default sizing
    /// (10 connections, 2 kept idle, 30 second checkout timeout).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_CONNECTIONS,
            min_idle: Some(DEFAULT_MIN_IDLE),
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// The PostgreSQL connection string this pool dials.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Shared handle over the bb8 pool of `AsyncPgConnection`s.
#[derive(Clone)]
pub struct DbPool {
    pool: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Build(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes available
    /// within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.pool
            .get()
            .await
            .map_err(|err| PoolError::Checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = PoolConfig::new("postgres://localhost/catalog");
        assert_eq!(config.database_url(), "postgres://localhost/catalog");
        assert_eq!(config.max_size, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_idle, Some(DEFAULT_MIN_IDLE));
        assert_eq!(config.connection_timeout, DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(PoolError::Checkout("connection refused".into()), "connection refused")]
    #[case(PoolError::Build("invalid URL".into()), "invalid URL")]
    fn errors_carry_their_message(#[case] error: PoolError, #[case] fragment: &str) {
        assert!(error.to_string().contains(fragment));
    }
}
