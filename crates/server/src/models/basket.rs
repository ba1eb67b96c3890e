//! Basket entry domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vapteke_core::{BasketEntryId, CustomerId, ItemId};

/// One item in a customer's basket (standalone entity variant).
#[derive(Debug, Clone, Serialize)]
pub struct BasketEntry {
    pub id: BasketEntryId,
    pub customer_id: CustomerId,
    pub item_id: ItemId,
    pub created_at: Option<DateTime<Utc>>,
}
