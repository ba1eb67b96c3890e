//! Get-or-create helpers for the interning tables.
//!
//! `firstnames`, `lastnames` and `platforms` deduplicate a string behind a
//! stable id. The upsert is a single statement guarded by the unique
//! constraint on `name`, so concurrent callers for the same value race
//! safely and both receive the same id. Lookup is case-sensitive exact
//! match; normalization happens upstream in the validators. Values are
//! never updated in place and never deleted.

use sqlx::PgPool;

use vapteke_core::{NameId, PersonName, Platform, PlatformId};

use super::RepositoryError;

/// Repository for the string interning tables.
pub struct NameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NameRepository<'a> {
    /// Create a new name repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Intern a first name, returning its stable id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn intern_firstname(&self, name: &PersonName) -> Result<NameId, RepositoryError> {
        self.intern("firstnames", name.as_str()).await.map(NameId::new)
    }

    /// Intern a last name, returning its stable id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn intern_lastname(&self, name: &PersonName) -> Result<NameId, RepositoryError> {
        self.intern("lastnames", name.as_str()).await.map(NameId::new)
    }

    /// Intern a raw first-name string (legacy import path, no validation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn intern_raw_firstname(&self, name: &str) -> Result<NameId, RepositoryError> {
        self.intern("firstnames", name).await.map(NameId::new)
    }

    /// Intern a platform name, returning its stable id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn intern_platform(&self, platform: Platform) -> Result<PlatformId, RepositoryError> {
        self.intern("platforms", platform.as_str())
            .await
            .map(PlatformId::new)
    }

    /// One-statement upsert: insert the value or touch the existing row,
    /// returning its id either way. The `DO UPDATE` arm makes `RETURNING`
    /// yield a row even when the value already exists.
    async fn intern(&self, table: &str, name: &str) -> Result<i64, RepositoryError> {
        // `table` is one of three compile-time constants, never user input.
        let sql = format!(
            "INSERT INTO {table} (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id"
        );

        let id: i64 = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        Ok(id)
    }
}
