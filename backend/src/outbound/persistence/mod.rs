//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the domain repository port backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository only translates between Diesel models
//!   and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: database failures are mapped to the
//!   repository error type the port defines.

mod diesel_feedback_repository;
mod models;
mod pool;
mod schema;

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations compiled into the binary from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Failures while preparing the database schema.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database was unreachable for the migration connection.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Human-readable cause.
        message: String,
    },

    /// A migration failed to apply.
    #[error("failed to run migrations: {message}")]
    Run {
        /// Human-readable cause.
        message: String,
    },
}

/// Apply any pending migrations over a dedicated synchronous connection.
///
/// Runs once at startup, before the server accepts traffic, so blocking
/// here is acceptable.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails to apply.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn =
        diesel::PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
            message: err.to_string(),
        })?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Run {
            message: err.to_string(),
        })?;
    Ok(())
}
