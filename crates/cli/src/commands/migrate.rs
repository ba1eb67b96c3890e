//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! vapteke-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `VAPTEKE_DATABASE_URL` - `PostgreSQL` connection string for the
//!   primary customer store (falls back to `DATABASE_URL`)
//!
//! Migrations are NOT run automatically by the server on startup; this
//! command is the only migration path. Migration files live in
//! `crates/server/migrations/`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the primary-store migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the
/// connection fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("VAPTEKE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("VAPTEKE_DATABASE_URL"))?;

    tracing::info!("Connecting to the customer store...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
