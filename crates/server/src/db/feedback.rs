//! Feedback repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder, Row};

use vapteke_core::{CustomerId, FeedbackId};

use super::RepositoryError;
use crate::models::feedback::{Feedback, NewFeedback};

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: i64,
    url: String,
    rating: i16,
    comment: String,
    customer_id: Option<i64>,
    platform: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(r: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::new(r.id),
            url: r.url,
            rating: r.rating,
            comment: r.comment,
            customer_id: r.customer_id.map(CustomerId::new),
            platform: r.platform,
            created_at: r.created_at,
        }
    }
}

const SELECT_FEEDBACK: &str = r"
    SELECT fb.id, fb.url, fb.rating, fb.comment, fb.customer_id,
           p.name AS platform, fb.created_at
    FROM feedback fb
    LEFT JOIN platforms p ON p.id = fb.platform_id
";

/// List filters for feedback.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub id: Option<i64>,
    pub customer_ids: Vec<i64>,
    pub platform: Option<String>,
    pub created_at_min: Option<NaiveDate>,
    pub created_at_max: Option<NaiveDate>,
}

impl FeedbackFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut sep = super::Separator::new(qb);

        if let Some(id) = self.id {
            sep.next().push("fb.id = ").push_bind(id);
        }
        if !self.customer_ids.is_empty() {
            sep.next()
                .push("fb.customer_id = ANY(")
                .push_bind(self.customer_ids.clone())
                .push(")");
        }
        if let Some(platform) = &self.platform {
            sep.next().push("p.name = ").push_bind(platform.clone());
        }
        if let Some(min) = self.created_at_min {
            sep.next().push("fb.created_at >= ").push_bind(min);
        }
        if let Some(max) = self.created_at_max {
            sep.next().push("fb.created_at <= ").push_bind(max);
        }
    }
}

/// Repository for feedback database operations.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List feedback matching `filter`, newest first, with the total match
    /// count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &FeedbackFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Feedback>, i64), RepositoryError> {
        let mut qb = QueryBuilder::new(SELECT_FEEDBACK);
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY fb.created_at DESC, fb.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<FeedbackRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM feedback fb LEFT JOIN platforms p ON p.id = fb.platform_id",
        );
        filter.push_conditions(&mut count_qb);
        let count: i64 = count_qb.build().fetch_one(self.pool).await?.get(0);

        Ok((rows.into_iter().map(Feedback::from).collect(), count))
    }

    /// Store a new feedback record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewFeedback) -> Result<FeedbackId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO feedback (url, rating, comment, customer_id, platform_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&new.url)
        .bind(new.rating)
        .bind(&new.comment)
        .bind(new.customer_id)
        .bind(new.platform_id)
        .fetch_one(self.pool)
        .await?;

        Ok(FeedbackId::new(id))
    }

    /// Get a feedback record by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        let row: Option<FeedbackRow> = sqlx::query_as(&format!("{SELECT_FEEDBACK} WHERE fb.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Feedback::from))
    }

    /// Delete a feedback record. Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: FeedbackId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete feedback records by id; unknown ids are skipped. Returns the
    /// number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
