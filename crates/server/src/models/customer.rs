//! Customer domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use vapteke_core::{CustomerId, Email, FavoritesList, Gender, NameId, Phone, PlatformId};

/// A customer (domain type).
///
/// PII fields (`phone`, `email`, names) are `None` once the customer is
/// soft-deleted; `deleted_at` marks the Deleted state.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    /// Interned first name, joined from `firstnames`.
    pub firstname: Option<String>,
    /// Interned last name, joined from `lastnames`.
    pub lastname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
    /// Embedded favorites list; absent when nothing was ever favorited.
    pub favorites: Option<FavoritesList>,
    /// Opaque basket blob owned by the storefront.
    pub basket: Option<Value>,
    pub last_auth_at: Option<DateTime<Utc>>,
    /// Interned platform name, joined from `platforms`.
    pub last_auth_platform: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields for creating a customer through the API.
///
/// Names arrive already validated and interned (the handler runs the
/// validators and the name upserts before calling the repository).
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub phone: Phone,
    pub email: Option<Email>,
    pub firstname_id: Option<NameId>,
    pub lastname_id: Option<NameId>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
}

/// Partial update for a customer. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub firstname_id: Option<NameId>,
    pub lastname_id: Option<NameId>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city_id: Option<i64>,
    pub last_auth_at: Option<DateTime<Utc>>,
    pub last_auth_platform_id: Option<PlatformId>,
    pub basket: Option<Value>,
}

impl CustomerPatch {
    /// True when no field is set; such a PATCH is a no-op.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.email.is_none()
            && self.firstname_id.is_none()
            && self.lastname_id.is_none()
            && self.birthday.is_none()
            && self.gender.is_none()
            && self.city_id.is_none()
            && self.last_auth_at.is_none()
            && self.last_auth_platform_id.is_none()
            && self.basket.is_none()
    }
}

/// A customer row produced by the legacy import, carrying its legacy id.
#[derive(Debug, Clone)]
pub struct ImportCustomer {
    pub id: CustomerId,
    pub phone: Phone,
    pub firstname_id: NameId,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
