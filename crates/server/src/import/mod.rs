//! One-way customer import from the legacy vAptekeSync database.
//!
//! A fire-and-forget batch job triggered by request: scan the legacy
//! source, pick one canonical row per phone suffix, and bulk-insert the
//! transformed customers into the primary store, skipping conflicts. The
//! job runs synchronously inside the triggering request; there is no
//! cancellation, no progress reporting and no partial retry. Re-running
//! after a failure is the recovery mechanism - inserts are idempotent at
//! the row level.

pub mod dedup;
pub mod legacy;

use sqlx::PgPool;
use thiserror::Error;

use vapteke_core::CustomerId;

use crate::db::{CustomerRepository, NameRepository, RepositoryError};
use crate::models::customer::ImportCustomer;

/// Import failures, split by stage so the caller can report the two
/// distinct fixed messages.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The legacy source was unreachable or the scan query failed.
    #[error("legacy source error: {0}")]
    Upstream(#[from] sqlx::Error),

    /// Interning or the bulk insert into the primary store failed.
    #[error("primary store error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    /// Canonical rows selected from the legacy scan.
    pub selected: usize,
    /// Rows actually inserted (conflicting rows are skipped silently).
    pub inserted: u64,
}

/// Run the whole import: scan, deduplicate, transform, intern names,
/// bulk-load.
///
/// # Errors
///
/// Returns [`ImportError::Upstream`] if the legacy scan fails and
/// [`ImportError::Persistence`] if any write to the primary store fails.
/// No rollback is attempted; already-inserted rows stay.
pub async fn run(pool: &PgPool, legacy_pool: &PgPool) -> Result<ImportOutcome, ImportError> {
    let raw = legacy::fetch_mobile_customers(legacy_pool).await?;
    tracing::debug!(rows = raw.len(), "legacy scan complete");

    let selected = dedup::select_canonical(raw);

    let names = NameRepository::new(pool);
    let customers = CustomerRepository::new(pool);

    let mut batch = Vec::with_capacity(selected.len());
    for row in &selected {
        let Some(t) = dedup::transform(row) else {
            continue;
        };

        let firstname_id = names.intern_raw_firstname(&t.firstname).await?;

        batch.push(ImportCustomer {
            id: CustomerId::new(t.id),
            phone: t.phone,
            firstname_id,
            email: t.email,
            created_at: t.created_at,
            updated_at: t.updated_at,
        });
    }

    let inserted = customers.bulk_insert_ignoring_conflicts(&batch).await?;

    Ok(ImportOutcome {
        selected: batch.len(),
        inserted,
    })
}
