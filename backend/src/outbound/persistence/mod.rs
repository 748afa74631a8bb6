//! PostgreSQL persistence adapters built on Diesel.

mod diesel_arrangement_repository;
mod diesel_flower_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use diesel_arrangement_repository::DieselArrangementRepository;
pub use diesel_flower_repository::DieselFlowerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations embedded from `migrations/` at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Failures raised while bringing the schema up to date at startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not connect to the database.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    /// A migration failed to apply.
    #[error("failed to run migrations: {0}")]
    Run(String),
}

/// Apply any pending migrations over a short-lived synchronous connection.
///
/// Runs once during startup, before the server accepts traffic.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a migration
/// fails to apply.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| MigrationError::Connection(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Run(err.to_string()))?;
    Ok(())
}
