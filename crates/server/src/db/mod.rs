//! Database operations for the primary `PostgreSQL` customer store.
//!
//! ## Tables
//!
//! - `customers` - customer rows with embedded favorites/basket JSON
//! - `firstnames`, `lastnames`, `platforms` - interning tables
//! - `basket` - standalone basket entries
//! - `feedback` - site feedback
//!
//! All queries are single statements; uniqueness is enforced by constraints
//! at the storage layer, never by application-level check-then-insert.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p vapteke-cli -- migrate
//! ```

pub mod baskets;
pub mod customers;
pub mod feedback;
pub mod names;

pub use baskets::{BasketFilter, BasketRepository};
pub use customers::{CustomerFilter, CustomerRepository};
pub use feedback::{FeedbackFilter, FeedbackRepository};
pub use names::NameRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors returned by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed to decode into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The targeted row does not exist (or is soft-deleted).
    #[error("not found")]
    NotFound,

    /// A unique constraint (or the favorites version check) was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Pushes `WHERE` once, then `AND` for every following condition, when
/// building filtered list queries.
pub(crate) struct Separator<'a, 'b> {
    qb: &'a mut sqlx::QueryBuilder<'b, sqlx::Postgres>,
    first: bool,
}

impl<'a, 'b> Separator<'a, 'b> {
    pub(crate) fn new(qb: &'a mut sqlx::QueryBuilder<'b, sqlx::Postgres>) -> Self {
        Self { qb, first: true }
    }

    pub(crate) fn next(&mut self) -> &mut sqlx::QueryBuilder<'b, sqlx::Postgres> {
        if self.first {
            self.qb.push(" WHERE ");
            self.first = false;
        } else {
            self.qb.push(" AND ");
        }
        self.qb
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a small pool for the read-only legacy source.
///
/// The import is the only consumer, so two connections are plenty.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_legacy_pool(
    database_url: &secrecy::SecretString,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
