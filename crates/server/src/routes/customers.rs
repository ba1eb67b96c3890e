//! Customer CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vapteke_core::{CustomerId, Email, FavoritesList, Gender, Phone, Platform};

use crate::db::{CustomerFilter, CustomerRepository, NameRepository};
use crate::error::{AppError, Result};
use crate::models::customer::{Customer, CustomerPatch, NewCustomer};
use crate::routes::pagination::{comma_separated, LimitOffset, Paginated};
use crate::routes::OperationOut;
use crate::state::AppState;

/// Customer response body (core fields).
#[derive(Debug, Serialize)]
pub struct CustomerOut {
    pub id: i64,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Customer> for CustomerOut {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id.as_i64(),
            phone: c.phone,
            email: c.email,
            firstname: c.firstname,
            lastname: c.lastname,
            birthday: c.birthday,
            gender: c.gender,
            city_id: c.city_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
            deleted_at: c.deleted_at,
        }
    }
}

/// Customer response body with auth, favorites and basket state.
#[derive(Debug, Serialize)]
pub struct CustomerExtendedOut {
    #[serde(flatten)]
    pub customer: CustomerOut,
    pub favorites: Option<FavoritesList>,
    pub basket: Option<Value>,
    pub last_auth_at: Option<DateTime<Utc>>,
    pub last_auth_platform: Option<String>,
}

impl From<Customer> for CustomerExtendedOut {
    fn from(mut c: Customer) -> Self {
        let favorites = c.favorites.take();
        let basket = c.basket.take();
        let last_auth_at = c.last_auth_at.take();
        let last_auth_platform = c.last_auth_platform.take();
        Self {
            customer: c.into(),
            favorites,
            basket,
            last_auth_at,
            last_auth_platform,
        }
    }
}

/// Listing filters for `GET /rest/v1/customers`.
#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    #[serde(default, deserialize_with = "comma_separated")]
    pub id: Vec<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub city_id: Vec<i64>,
    pub birthday_min: Option<NaiveDate>,
    pub birthday_max: Option<NaiveDate>,
    pub created_at_min: Option<NaiveDate>,
    pub created_at_max: Option<NaiveDate>,
    pub last_auth_at_min: Option<NaiveDate>,
    pub last_auth_at_max: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CustomerListQuery {
    fn into_filter(self) -> (CustomerFilter, LimitOffset) {
        let page = LimitOffset::from_params(self.limit, self.offset);
        let filter = CustomerFilter {
            ids: self.id,
            phone: self.phone,
            email: self.email,
            firstname: self.firstname,
            lastname: self.lastname,
            gender: self.gender,
            city_ids: self.city_id,
            birthday_min: self.birthday_min,
            birthday_max: self.birthday_max,
            created_at_min: self.created_at_min,
            created_at_max: self.created_at_max,
            last_auth_at_min: self.last_auth_at_min,
            last_auth_at_max: self.last_auth_at_max,
        };
        (filter, page)
    }
}

/// Request body for `POST /rest/v1/customers`.
#[derive(Debug, Deserialize)]
pub struct CustomerIn {
    pub phone: String,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
}

/// Request body for `PATCH /rest/v1/customers/{id}`; absent fields are
/// left untouched.
#[derive(Debug, Deserialize, Default)]
pub struct CustomerUpdateIn {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
    pub last_auth_at: Option<DateTime<Utc>>,
    pub last_auth_platform: Option<Platform>,
    pub basket: Option<Value>,
}

/// Request body for `PATCH /rest/v1/customers/{id}/phone`.
#[derive(Debug, Deserialize)]
pub struct PhoneIn {
    pub phone: String,
}

/// `GET /rest/v1/customers` - list customers with filters and pagination.
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<Paginated<CustomerExtendedOut>>> {
    let (filter, page) = query.into_filter();

    let repo = CustomerRepository::new(state.pool());
    let (customers, count) = repo.list(&filter, page.limit, page.offset).await?;

    Ok(Json(Paginated {
        items: customers.into_iter().map(CustomerExtendedOut::from).collect(),
        count,
    }))
}

/// `POST /rest/v1/customers` - register a customer.
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerIn>,
) -> Result<(StatusCode, Json<CustomerOut>)> {
    let phone = Phone::parse(&input.phone)?;
    let email = input.email.as_deref().map(Email::parse).transpose()?;

    let names = NameRepository::new(state.pool());
    let firstname_id = match input.firstname.as_deref() {
        Some(raw) => Some(names.intern_firstname(&raw.parse()?).await?),
        None => None,
    };
    let lastname_id = match input.lastname.as_deref() {
        Some(raw) => Some(names.intern_lastname(&raw.parse()?).await?),
        None => None,
    };

    let new = NewCustomer {
        phone,
        email,
        firstname_id,
        lastname_id,
        birthday: input.birthday,
        gender: input.gender,
        city_id: input.city_id,
    };

    let repo = CustomerRepository::new(state.pool());
    let id = repo.create(&new).await?;

    let customer = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("customer {id} vanished after insert")))?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// `GET /rest/v1/customers/{id}` - customer detail.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<CustomerExtendedOut>> {
    let repo = CustomerRepository::new(state.pool());
    let customer = repo
        .get(CustomerId::new(customer_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// `PATCH /rest/v1/customers/{id}` - partial update.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(input): Json<CustomerUpdateIn>,
) -> Result<Json<CustomerExtendedOut>> {
    let id = CustomerId::new(customer_id);

    let phone = input.phone.as_deref().map(Phone::parse).transpose()?;
    let email = input.email.as_deref().map(Email::parse).transpose()?;

    let names = NameRepository::new(state.pool());
    let firstname_id = match input.firstname.as_deref() {
        Some(raw) => Some(names.intern_firstname(&raw.parse()?).await?),
        None => None,
    };
    let lastname_id = match input.lastname.as_deref() {
        Some(raw) => Some(names.intern_lastname(&raw.parse()?).await?),
        None => None,
    };
    let last_auth_platform_id = match input.last_auth_platform {
        Some(platform) => Some(names.intern_platform(platform).await?),
        None => None,
    };

    let patch = CustomerPatch {
        phone,
        email,
        firstname_id,
        lastname_id,
        birthday: input.birthday,
        gender: input.gender,
        city_id: input.city_id,
        last_auth_at: input.last_auth_at,
        last_auth_platform_id,
        basket: input.basket,
    };

    let repo = CustomerRepository::new(state.pool());
    if !patch.is_empty() {
        repo.update(id, &patch).await?;
    }

    let customer = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// `DELETE /rest/v1/customers/{id}` - soft delete, clearing PII.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<OperationOut>> {
    let repo = CustomerRepository::new(state.pool());
    repo.soft_delete(CustomerId::new(customer_id)).await?;

    Ok(Json(OperationOut::ok()))
}

/// `PATCH /rest/v1/customers/{id}/phone` - change the phone number.
pub async fn update_phone(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(input): Json<PhoneIn>,
) -> Result<Json<OperationOut>> {
    let phone = Phone::parse(&input.phone)?;

    let repo = CustomerRepository::new(state.pool());
    repo.update_phone(CustomerId::new(customer_id), &phone).await?;

    Ok(Json(OperationOut {
        success: true,
        message: Some("Номер успешно изменен".to_owned()),
        data: None,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vapteke_core::ItemId;

    fn sample_customer() -> Customer {
        let mut favorites = FavoritesList::new();
        favorites.add(ItemId::new(10));

        Customer {
            id: CustomerId::new(1),
            phone: Some(Phone::parse("79041482222").unwrap()),
            email: Some(Email::parse("ivanov@mail.ru").unwrap()),
            firstname: Some("Иван".to_owned()),
            lastname: Some("Иванов".to_owned()),
            birthday: None,
            gender: Some(Gender::Male),
            city_id: Some(3),
            favorites: Some(favorites),
            basket: None,
            last_auth_at: None,
            last_auth_platform: Some("mobile".to_owned()),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_extended_out_flattens_base_fields() {
        let out = CustomerExtendedOut::from(sample_customer());
        let v = serde_json::to_value(&out).unwrap();

        // Base fields sit at the top level, not under a nested key.
        assert_eq!(v["id"], 1);
        assert_eq!(v["phone"], "79041482222");
        assert_eq!(v["gender"], "m");
        assert_eq!(v["last_auth_platform"], "mobile");
        assert_eq!(v["favorites"]["data"]["count_all"], 1);
        assert_eq!(v["favorites"]["data"]["items"][0], 10);
    }

    #[test]
    fn test_list_query_defaults() {
        let q: CustomerListQuery = serde_json::from_str("{}").unwrap();
        assert!(q.id.is_empty());
        assert!(q.city_id.is_empty());
        assert_eq!(q.limit, None);

        let (filter, page) = q.into_filter();
        assert!(filter.ids.is_empty());
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_list_query_comma_separated_ids() {
        let q: CustomerListQuery = serde_json::from_str(r#"{"id": "1,2,3"}"#).unwrap();
        assert_eq!(q.id, vec![1, 2, 3]);
    }
}
