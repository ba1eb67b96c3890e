//! Basket handlers (standalone entity variant).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use vapteke_core::{CustomerId, ItemId};

use crate::db::{BasketFilter, BasketRepository};
use crate::error::Result;
use crate::models::BasketEntry;
use crate::routes::pagination::{comma_separated, LimitOffset, Paginated};
use crate::routes::OperationOut;
use crate::state::AppState;

/// Listing filters for `GET /rest/v1/basket`.
#[derive(Debug, Deserialize)]
pub struct BasketListQuery {
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub customer_id: Vec<i64>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub item_id: Vec<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /rest/v1/basket`.
#[derive(Debug, Deserialize)]
pub struct BasketIn {
    pub customer_id: i64,
    pub item_id: i64,
}

/// Request body for `DELETE /rest/v1/basket`.
#[derive(Debug, Deserialize)]
pub struct BasketDeleteIn {
    pub id: Vec<i64>,
}

/// `GET /rest/v1/basket` - list basket entries.
pub async fn list_basket(
    State(state): State<AppState>,
    Query(query): Query<BasketListQuery>,
) -> Result<Json<Paginated<BasketEntry>>> {
    let filter = BasketFilter {
        id: query.id,
        customer_ids: query.customer_id,
        item_ids: query.item_id,
    };
    let page = LimitOffset::from_params(query.limit, query.offset);

    let repo = BasketRepository::new(state.pool());
    let (items, count) = repo.list(&filter, page.limit, page.offset).await?;

    Ok(Json(Paginated { items, count }))
}

/// `POST /rest/v1/basket` - add an item to a customer's basket.
pub async fn add_basket_entry(
    State(state): State<AppState>,
    Json(input): Json<BasketIn>,
) -> Result<(StatusCode, Json<BasketEntry>)> {
    let repo = BasketRepository::new(state.pool());
    let entry = repo
        .create(
            CustomerId::new(input.customer_id),
            ItemId::new(input.item_id),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /rest/v1/basket` - delete entries by id; unknown ids are
/// skipped.
pub async fn delete_basket_entries(
    State(state): State<AppState>,
    Json(input): Json<BasketDeleteIn>,
) -> Result<Json<OperationOut>> {
    let repo = BasketRepository::new(state.pool());
    let count_deleted = repo.delete_many(&input.id).await?;

    Ok(Json(OperationOut {
        success: true,
        message: None,
        data: Some(json!({ "count_deleted": count_deleted })),
    }))
}
