//! Service endpoints: the legacy customer import trigger.

use axum::extract::State;

use crate::import::{self, ImportError};
use crate::state::AppState;

/// Fixed plain-text responses of the import trigger; consumed by an
/// operator-facing cron, so the wording is stable.
const IMPORT_OK: &str = "Импорт выполнен.";
const IMPORT_FETCH_FAILED: &str =
    "Импорт не выполнен. Ошибка импорта пользователей из vAptekeSync.";
const IMPORT_PERSIST_FAILED: &str =
    "Импорт не выполнен. Ошибка добавления пользователей в Postgres.";

/// `GET /service/import_customers` - run the legacy import synchronously.
///
/// Always answers 200 with one of three fixed messages; failures are
/// reported in the body and to Sentry, not via the status code.
pub async fn import_customers(State(state): State<AppState>) -> &'static str {
    let Some(legacy_pool) = state.legacy_pool() else {
        tracing::warn!("import requested but no legacy database is configured");
        return IMPORT_FETCH_FAILED;
    };

    match import::run(state.pool(), legacy_pool).await {
        Ok(outcome) => {
            tracing::info!(
                selected = outcome.selected,
                inserted = outcome.inserted,
                "customer import finished"
            );
            IMPORT_OK
        }
        Err(e) => {
            sentry::capture_error(&e);
            tracing::error!(error = %e, "customer import failed");
            match e {
                ImportError::Upstream(_) => IMPORT_FETCH_FAILED,
                ImportError::Persistence(_) => IMPORT_PERSIST_FAILED,
            }
        }
    }
}
