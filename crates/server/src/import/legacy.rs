//! Read-only access to the legacy vAptekeSync database.

use sqlx::PgPool;

/// A raw customer row from the legacy `zkz_clients` table.
///
/// Timestamps are epoch seconds, as stored upstream.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyCustomerRow {
    pub id: i64,
    pub phone_main: String,
    pub first_fio: Option<String>,
    pub email_main: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fetch every legacy customer whose phone looks like a Russian mobile
/// number (`+7`, `7` or `8` followed by 10 digits). Deduplication happens
/// in [`super::dedup`], not upstream.
///
/// # Errors
///
/// Returns `sqlx::Error` if the upstream query fails.
pub async fn fetch_mobile_customers(pool: &PgPool) -> Result<Vec<LegacyCustomerRow>, sqlx::Error> {
    sqlx::query_as(
        r"
        SELECT id, phone_main, first_fio, email_main, created_at, updated_at
        FROM zkz_clients
        WHERE phone_main LIKE '+7__________'
           OR phone_main LIKE '7__________'
           OR phone_main LIKE '8__________'
        ORDER BY id
        ",
    )
    .fetch_all(pool)
    .await
}
