//! Basket repository (standalone entity variant).

use chrono::{DateTime, Utc};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder, Row};

use vapteke_core::{BasketEntryId, CustomerId, ItemId};

use super::RepositoryError;
use crate::models::BasketEntry;

#[derive(sqlx::FromRow)]
struct BasketRow {
    id: i64,
    customer_id: i64,
    item_id: i64,
    created_at: Option<DateTime<Utc>>,
}

impl From<BasketRow> for BasketEntry {
    fn from(r: BasketRow) -> Self {
        Self {
            id: BasketEntryId::new(r.id),
            customer_id: CustomerId::new(r.customer_id),
            item_id: ItemId::new(r.item_id),
            created_at: r.created_at,
        }
    }
}

/// List filters for basket entries.
#[derive(Debug, Clone, Default)]
pub struct BasketFilter {
    pub id: Option<i64>,
    pub customer_ids: Vec<i64>,
    pub item_ids: Vec<i64>,
}

impl BasketFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut sep = super::Separator::new(qb);

        if let Some(id) = self.id {
            sep.next().push("id = ").push_bind(id);
        }
        if !self.customer_ids.is_empty() {
            sep.next()
                .push("customer_id = ANY(")
                .push_bind(self.customer_ids.clone())
                .push(")");
        }
        if !self.item_ids.is_empty() {
            sep.next()
                .push("item_id = ANY(")
                .push_bind(self.item_ids.clone())
                .push(")");
        }
    }
}

/// Repository for basket database operations.
pub struct BasketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BasketRepository<'a> {
    /// Create a new basket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List basket entries matching `filter`, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &BasketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BasketEntry>, i64), RepositoryError> {
        let mut qb =
            QueryBuilder::new("SELECT id, customer_id, item_id, created_at FROM basket");
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at DESC NULLS LAST, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<BasketRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM basket");
        filter.push_conditions(&mut count_qb);
        let count: i64 = count_qb.build().fetch_one(self.pool).await?.get(0);

        Ok((rows.into_iter().map(BasketEntry::from).collect(), count))
    }

    /// Add an item to a customer's basket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist
    /// (foreign-key violation).
    pub async fn create(
        &self,
        customer_id: CustomerId,
        item_id: ItemId,
    ) -> Result<BasketEntry, RepositoryError> {
        let row: BasketRow = sqlx::query_as(
            r"
            INSERT INTO basket (customer_id, item_id, created_at)
            VALUES ($1, $2, now())
            RETURNING id, customer_id, item_id, created_at
            ",
        )
        .bind(customer_id)
        .bind(item_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Delete basket entries by id; unknown ids are skipped. Returns the
    /// number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM basket WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
