//! Feedback handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use vapteke_core::{CustomerId, FeedbackId, Platform};

use crate::db::{CustomerRepository, FeedbackFilter, FeedbackRepository, NameRepository};
use crate::error::{AppError, Result};
use crate::models::feedback::{Feedback, NewFeedback};
use crate::routes::pagination::{comma_separated, page_limit_offset, Page, PageMeta};
use crate::routes::OperationOut;
use crate::state::AppState;

/// Ratings are a 1..=5 star scale.
const RATING_MIN: i16 = 1;
const RATING_MAX: i16 = 5;

/// Listing filters for `GET /rest/v1/feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackListQuery {
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub customer_id: Vec<i64>,
    pub platform: Option<Platform>,
    pub created_at_min: Option<NaiveDate>,
    pub created_at_max: Option<NaiveDate>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Request body for `POST /rest/v1/feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackIn {
    pub url: String,
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
    pub customer_id: Option<i64>,
    pub platform: Option<Platform>,
}

/// Request body for `DELETE /rest/v1/feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackDeleteIn {
    pub id: Vec<i64>,
}

/// `GET /rest/v1/feedback` - list feedback, newest first.
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<Json<Page<Feedback>>> {
    let filter = FeedbackFilter {
        id: query.id,
        customer_ids: query.customer_id,
        platform: query.platform.map(|p| p.as_str().to_owned()),
        created_at_min: query.created_at_min,
        created_at_max: query.created_at_max,
    };
    let (limit, offset) = page_limit_offset(query.page, query.page_size);

    let repo = FeedbackRepository::new(state.pool());
    let (data, total) = repo.list(&filter, limit, offset).await?;

    Ok(Json(Page {
        data,
        meta: PageMeta {
            total,
            per_page: limit,
        },
    }))
}

/// `POST /rest/v1/feedback` - store a feedback record.
///
/// `customer_id` is a weak reference: an unknown or deleted customer is
/// stored as anonymous feedback rather than rejected.
pub async fn add_feedback(
    State(state): State<AppState>,
    Json(input): Json<FeedbackIn>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    if !(RATING_MIN..=RATING_MAX).contains(&input.rating) {
        return Err(AppError::Validation(format!(
            "rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    let url = url::Url::parse(&input.url)
        .map_err(|e| AppError::Validation(format!("invalid url: {e}")))?;

    let customers = CustomerRepository::new(state.pool());
    let customer_id = match input.customer_id {
        Some(raw) => customers
            .get(CustomerId::new(raw))
            .await?
            .map(|c| c.id),
        None => None,
    };

    let platform_id = match input.platform {
        Some(platform) => Some(
            NameRepository::new(state.pool())
                .intern_platform(platform)
                .await?,
        ),
        None => None,
    };

    let repo = FeedbackRepository::new(state.pool());
    let id = repo
        .create(&NewFeedback {
            url: url.into(),
            rating: input.rating,
            comment: input.comment,
            customer_id,
            platform_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": [{ "id": id.as_i64() }] })),
    ))
}

/// `GET /rest/v1/feedback/{id}` - feedback detail.
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Feedback>> {
    let repo = FeedbackRepository::new(state.pool());
    let feedback = repo
        .get(FeedbackId::new(feedback_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback {feedback_id}")))?;

    Ok(Json(feedback))
}

/// `DELETE /rest/v1/feedback/{id}` - delete one record.
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
) -> Result<Json<OperationOut>> {
    let repo = FeedbackRepository::new(state.pool());
    if !repo.delete(FeedbackId::new(feedback_id)).await? {
        return Err(AppError::NotFound(format!("feedback {feedback_id}")));
    }

    Ok(Json(OperationOut::ok()))
}

/// `DELETE /rest/v1/feedback` - delete records by id; unknown ids are
/// skipped.
pub async fn delete_bulk_feedback(
    State(state): State<AppState>,
    Json(input): Json<FeedbackDeleteIn>,
) -> Result<Json<OperationOut>> {
    let repo = FeedbackRepository::new(state.pool());
    let count_deleted = repo.delete_many(&input.id).await?;

    Ok(Json(OperationOut {
        success: true,
        message: None,
        data: Some(json!({ "count_deleted": count_deleted })),
    }))
}
