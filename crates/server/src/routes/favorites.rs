//! Favorites handlers.
//!
//! The list lives embedded on the customer row; handlers load it, mutate
//! it in memory through [`FavoritesList`], and write it back with a
//! version compare-and-swap. A lost race surfaces as a 409 and the client
//! simply retries.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vapteke_core::{CustomerId, FavoritesList, ItemId};

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::routes::OperationOut;
use crate::state::AppState;

/// Request body for `POST .../favorites`.
#[derive(Debug, Deserialize)]
pub struct FavoriteIn {
    pub item_id: i64,
}

/// Request body for `DELETE .../favorites`.
#[derive(Debug, Deserialize)]
pub struct FavoriteDeleteIn {
    pub item_id: Vec<i64>,
}

/// Response body for a successful add.
#[derive(Debug, Serialize)]
pub struct FavoriteOut {
    pub item_id: i64,
}

/// `POST /rest/v1/customers/{id}/favorites` - add an item, or move an
/// already-favorited item to the front.
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(input): Json<FavoriteIn>,
) -> Result<Json<FavoriteOut>> {
    let id = CustomerId::new(customer_id);
    let repo = CustomerRepository::new(state.pool());

    let stored = repo.favorites(id).await?;
    let expected_version = stored.as_ref().map(|l| l.version);

    let mut list = stored.unwrap_or_else(FavoritesList::new);
    list.add(ItemId::new(input.item_id));

    repo.save_favorites(id, &list, expected_version).await?;

    Ok(Json(FavoriteOut {
        item_id: input.item_id,
    }))
}

/// `DELETE /rest/v1/customers/{id}/favorites` - remove items by id.
/// Unknown items are skipped; the count of actually removed items is
/// reported.
pub async fn remove_favorites(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(input): Json<FavoriteDeleteIn>,
) -> Result<Json<OperationOut>> {
    let id = CustomerId::new(customer_id);
    let repo = CustomerRepository::new(state.pool());

    let Some(mut list) = repo.favorites(id).await? else {
        // Nothing was ever favorited; there is nothing to remove from.
        return Err(AppError::NotFound(format!(
            "favorites of customer {customer_id}"
        )));
    };

    let expected_version = Some(list.version);
    let items: Vec<ItemId> = input.item_id.iter().copied().map(ItemId::new).collect();
    let count_deleted = list.remove_many(&items);
    if count_deleted > 0 {
        repo.save_favorites(id, &list, expected_version).await?;
    }

    Ok(Json(OperationOut {
        success: true,
        message: None,
        data: Some(json!({ "count_deleted": count_deleted })),
    }))
}

/// `DELETE /rest/v1/customers/{id}/favorites/all` - drop the whole list.
pub async fn clear_favorites(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<OperationOut>> {
    let repo = CustomerRepository::new(state.pool());
    repo.clear_favorites(CustomerId::new(customer_id)).await?;

    Ok(Json(OperationOut::ok()))
}
