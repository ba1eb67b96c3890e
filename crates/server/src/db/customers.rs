//! Customer repository for database operations.
//!
//! Queries are built at runtime (`sqlx::query` / `QueryBuilder`); uniqueness
//! of phone/email among non-deleted customers is guarded by partial unique
//! indexes, and the embedded favorites list is written with a version
//! compare-and-swap.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::postgres::Postgres;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder, Row};

use vapteke_core::{CustomerId, Email, FavoritesList, Gender, Phone};

use super::RepositoryError;
use crate::models::customer::{Customer, CustomerPatch, ImportCustomer, NewCustomer};

/// Rows per bulk-insert statement (well under the bind-parameter limit).
const BULK_INSERT_CHUNK: usize = 1000;

const SELECT_CUSTOMER: &str = r"
    SELECT c.id, c.phone, c.email,
           f.name AS firstname, l.name AS lastname,
           c.birthday, c.gender, c.city_id,
           c.favorites, c.basket,
           c.last_auth_at, p.name AS last_auth_platform,
           c.created_at, c.updated_at, c.deleted_at
    FROM customers c
    LEFT JOIN firstnames f ON f.id = c.firstname_id
    LEFT JOIN lastnames l ON l.id = c.lastname_id
    LEFT JOIN platforms p ON p.id = c.last_auth_platform_id
";

/// Database row for a customer with joined name/platform strings.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    phone: Option<String>,
    email: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    birthday: Option<NaiveDate>,
    gender: Option<String>,
    city_id: Option<i64>,
    favorites: Option<Json<FavoritesList>>,
    basket: Option<Value>,
    last_auth_at: Option<DateTime<Utc>>,
    last_auth_platform: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(r: CustomerRow) -> Result<Self, Self::Error> {
        let phone = r
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;
        let email = r
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: CustomerId::new(r.id),
            phone,
            email,
            firstname: r.firstname,
            lastname: r.lastname,
            birthday: r.birthday,
            gender: r.gender.as_deref().and_then(Gender::from_code),
            city_id: r.city_id,
            favorites: r.favorites.map(|j| j.0),
            basket: r.basket,
            last_auth_at: r.last_auth_at,
            last_auth_platform: r.last_auth_platform,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        })
    }
}

/// List filters for customers. Empty vectors / `None` mean "no constraint".
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub ids: Vec<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub gender: Option<Gender>,
    pub city_ids: Vec<i64>,
    pub birthday_min: Option<NaiveDate>,
    pub birthday_max: Option<NaiveDate>,
    pub created_at_min: Option<NaiveDate>,
    pub created_at_max: Option<NaiveDate>,
    pub last_auth_at_min: Option<NaiveDate>,
    pub last_auth_at_max: Option<NaiveDate>,
}

impl CustomerFilter {
    /// Append `WHERE`/`AND` conditions for this filter to a query.
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut sep = super::Separator::new(qb);

        if !self.ids.is_empty() {
            sep.next().push("c.id = ANY(").push_bind(self.ids.clone()).push(")");
        }
        if let Some(phone) = &self.phone {
            sep.next()
                .push("c.phone ILIKE '%' || ")
                .push_bind(phone.clone())
                .push(" || '%'");
        }
        if let Some(email) = &self.email {
            sep.next()
                .push("c.email ILIKE '%' || ")
                .push_bind(email.clone())
                .push(" || '%'");
        }
        if let Some(firstname) = &self.firstname {
            sep.next()
                .push("f.name ILIKE '%' || ")
                .push_bind(firstname.clone())
                .push(" || '%'");
        }
        if let Some(lastname) = &self.lastname {
            sep.next()
                .push("l.name ILIKE '%' || ")
                .push_bind(lastname.clone())
                .push(" || '%'");
        }
        if let Some(gender) = self.gender {
            sep.next().push("c.gender = ").push_bind(gender.as_str());
        }
        if !self.city_ids.is_empty() {
            sep.next()
                .push("c.city_id = ANY(")
                .push_bind(self.city_ids.clone())
                .push(")");
        }
        if let Some(min) = self.birthday_min {
            sep.next().push("c.birthday >= ").push_bind(min);
        }
        if let Some(max) = self.birthday_max {
            sep.next().push("c.birthday <= ").push_bind(max);
        }
        if let Some(min) = self.created_at_min {
            sep.next().push("c.created_at >= ").push_bind(min);
        }
        if let Some(max) = self.created_at_max {
            sep.next().push("c.created_at <= ").push_bind(max);
        }
        if let Some(min) = self.last_auth_at_min {
            sep.next().push("c.last_auth_at >= ").push_bind(min);
        }
        if let Some(max) = self.last_auth_at_max {
            sep.next().push("c.last_auth_at <= ").push_bind(max);
        }
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers matching `filter`, with the total match count.
    ///
    /// Soft-deleted customers are included (their PII is already cleared),
    /// matching the original list behavior.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Customer>, i64), RepositoryError> {
        let mut qb = QueryBuilder::new(SELECT_CUSTOMER);
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY c.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<CustomerRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::new(
            r"
            SELECT COUNT(*)
            FROM customers c
            LEFT JOIN firstnames f ON f.id = c.firstname_id
            LEFT JOIN lastnames l ON l.id = c.lastname_id
            ",
        );
        filter.push_conditions(&mut count_qb);
        let count: i64 = count_qb.build().fetch_one(self.pool).await?.get(0);

        let customers = rows
            .into_iter()
            .map(Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((customers, count))
    }

    /// Get a non-deleted customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored value fails to decode.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> =
            sqlx::query_as(&format!("{SELECT_CUSTOMER} WHERE c.id = $1 AND c.deleted_at IS NULL"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Create a new customer.
    ///
    /// The id is assigned inside the statement as `max(id) + 1`, because the
    /// legacy import supplies its own ids and a sequence would collide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone or email is already
    /// taken by a non-deleted customer.
    pub async fn create(&self, new: &NewCustomer) -> Result<CustomerId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO customers
                (id, phone, email, firstname_id, lastname_id, birthday, gender, city_id,
                 created_at, updated_at)
            SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3, $4, $5, $6, $7, now(), now()
            FROM customers
            RETURNING id
            ",
        )
        .bind(&new.phone)
        .bind(&new.email)
        .bind(new.firstname_id)
        .bind(new.lastname_id)
        .bind(new.birthday)
        .bind(new.gender.map(Gender::as_str))
        .bind(new.city_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(CustomerId::new(id))
    }

    /// Apply a partial update to a non-deleted customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist or
    /// is deleted, `RepositoryError::Conflict` on a duplicate email.
    pub async fn update(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE customers SET updated_at = now()");

        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone.as_str().to_owned());
        }
        if let Some(email) = &patch.email {
            qb.push(", email = ").push_bind(email.as_str().to_owned());
        }
        if let Some(firstname_id) = patch.firstname_id {
            qb.push(", firstname_id = ").push_bind(firstname_id);
        }
        if let Some(lastname_id) = patch.lastname_id {
            qb.push(", lastname_id = ").push_bind(lastname_id);
        }
        if let Some(birthday) = patch.birthday {
            qb.push(", birthday = ").push_bind(birthday);
        }
        if let Some(gender) = patch.gender {
            qb.push(", gender = ").push_bind(gender.as_str());
        }
        if let Some(city_id) = patch.city_id {
            qb.push(", city_id = ").push_bind(city_id);
        }
        if let Some(last_auth_at) = patch.last_auth_at {
            qb.push(", last_auth_at = ").push_bind(last_auth_at);
        }
        if let Some(platform_id) = patch.last_auth_platform_id {
            qb.push(", last_auth_platform_id = ").push_bind(platform_id);
        }
        if let Some(basket) = &patch.basket {
            qb.push(", basket = ").push_bind(basket.clone());
        }

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL");

        let result = qb
            .build()
            .execute(self.pool)
            .await
            .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Soft-delete a customer: mark the Deleted state and clear PII.
    ///
    /// The row is retained; phone, email and name references are nulled so
    /// the unique slots free up for future registrations. There is no
    /// resurrection path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist or
    /// was already deleted.
    pub async fn soft_delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET deleted_at = now(), updated_at = now(),
                phone = NULL, email = NULL, firstname_id = NULL, lastname_id = NULL
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Change a customer's phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the number is taken by another
    /// non-deleted customer, `RepositoryError::NotFound` for an unknown or
    /// deleted customer.
    pub async fn update_phone(&self, id: CustomerId, phone: &Phone) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET phone = $2, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .bind(phone)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("Номер уже занят".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Load the favorites structure of a non-deleted customer.
    ///
    /// Returns `Ok(None)` when the customer exists but has never favorited
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown or deleted
    /// customer.
    pub async fn favorites(&self, id: CustomerId) -> Result<Option<FavoritesList>, RepositoryError> {
        let row: Option<Option<Json<FavoritesList>>> =
            sqlx::query_scalar("SELECT favorites FROM customers WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some(favorites) => Ok(favorites.map(|j| j.0)),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Persist a mutated favorites list with a version compare-and-swap.
    ///
    /// `expected_version` is the version the list had when loaded, or `None`
    /// when the customer had no favorites structure yet. A lost race shows
    /// up as zero affected rows and is reported as a conflict; the caller
    /// decides whether to retry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the stored version no longer
    /// matches `expected_version`.
    pub async fn save_favorites(
        &self,
        id: CustomerId,
        favorites: &FavoritesList,
        expected_version: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let result = match expected_version {
            Some(version) => {
                sqlx::query(
                    r"
                    UPDATE customers
                    SET favorites = $2, updated_at = now()
                    WHERE id = $1 AND deleted_at IS NULL
                      AND (favorites->>'version')::bigint = $3
                    ",
                )
                .bind(id)
                .bind(Json(favorites))
                .bind(version)
                .execute(self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r"
                    UPDATE customers
                    SET favorites = $2, updated_at = now()
                    WHERE id = $1 AND deleted_at IS NULL AND favorites IS NULL
                    ",
                )
                .bind(id)
                .bind(Json(favorites))
                .execute(self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "favorites were modified concurrently".to_owned(),
            ));
        }

        Ok(())
    }

    /// Drop the favorites structure entirely (clear-all).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown or deleted
    /// customer.
    pub async fn clear_favorites(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET favorites = NULL, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Bulk-insert imported customers, silently skipping any row that
    /// violates a uniqueness constraint (id, phone or email). This makes the
    /// import idempotent at the row level; existing customers are never
    /// updated.
    ///
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert statement fails.
    pub async fn bulk_insert_ignoring_conflicts(
        &self,
        customers: &[ImportCustomer],
    ) -> Result<u64, RepositoryError> {
        let mut inserted = 0;

        for chunk in customers.chunks(BULK_INSERT_CHUNK) {
            let mut qb = QueryBuilder::new(
                "INSERT INTO customers (id, phone, firstname_id, email, created_at, updated_at) ",
            );
            qb.push_values(chunk, |mut b, c| {
                b.push_bind(c.id)
                    .push_bind(&c.phone)
                    .push_bind(c.firstname_id)
                    .push_bind(&c.email)
                    .push_bind(c.created_at)
                    .push_bind(c.updated_at);
            });
            qb.push(" ON CONFLICT DO NOTHING");

            let result = qb.build().execute(self.pool).await?;
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }
}

/// Map phone/email unique violations on insert/update to a conflict with the
/// user-facing message for the offending column.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = match db_err.constraint() {
            Some("customers_email_active_idx") => "Email в базе уже существует",
            _ => "Телефон в базе уже существует",
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
