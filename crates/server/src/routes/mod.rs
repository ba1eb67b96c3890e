//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB ping)
//!
//! # Customers
//! GET    /rest/v1/customers             - Customer listing (filters + pagination)
//! POST   /rest/v1/customers             - Create customer
//! GET    /rest/v1/customers/{id}        - Customer detail
//! PATCH  /rest/v1/customers/{id}        - Partial update
//! DELETE /rest/v1/customers/{id}        - Soft delete (clears PII)
//! PATCH  /rest/v1/customers/{id}/phone  - Change phone number
//!
//! # Favorites (embedded list on the customer)
//! POST   /rest/v1/customers/{id}/favorites      - Add / move-to-front
//! DELETE /rest/v1/customers/{id}/favorites      - Bulk remove by item id
//! DELETE /rest/v1/customers/{id}/favorites/all  - Clear all
//!
//! # Basket (standalone entity)
//! GET    /rest/v1/basket                - Basket entry listing
//! POST   /rest/v1/basket                - Add basket entry
//! DELETE /rest/v1/basket                - Bulk delete by entry id
//!
//! # Feedback
//! GET    /rest/v1/feedback              - Feedback listing (page/page_size)
//! POST   /rest/v1/feedback              - Create feedback
//! GET    /rest/v1/feedback/{id}         - Feedback detail
//! DELETE /rest/v1/feedback/{id}         - Delete one
//! DELETE /rest/v1/feedback              - Bulk delete by id
//!
//! # Service
//! GET  /service/import_customers        - Run the legacy customer import
//! ```
//!
//! List parameters that accept several values (`id`, `customer_id`,
//! `item_id`, `city_id`) are passed comma-separated: `?id=1,2,3`.

pub mod basket;
pub mod customers;
pub mod favorites;
pub mod feedback;
pub mod pagination;
pub mod service;

use axum::{
    Router,
    routing::{delete, get, patch},
};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;

/// Generic operation response envelope.
#[derive(Debug, Serialize)]
pub struct OperationOut {
    pub success: bool,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OperationOut {
    /// A bare success with no message.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }
}

/// Create the customer routes router (favorites nested under it).
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list_customers).post(customers::create_customer))
        .route(
            "/{customer_id}",
            get(customers::get_customer)
                .patch(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/{customer_id}/phone", patch(customers::update_phone))
        .route(
            "/{customer_id}/favorites",
            axum::routing::post(favorites::add_favorite).delete(favorites::remove_favorites),
        )
        .route(
            "/{customer_id}/favorites/all",
            delete(favorites::clear_favorites),
        )
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(basket::list_basket)
            .post(basket::add_basket_entry)
            .delete(basket::delete_basket_entries),
    )
}

/// Create the feedback routes router.
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(feedback::list_feedback)
                .post(feedback::add_feedback)
                .delete(feedback::delete_bulk_feedback),
        )
        .route(
            "/{feedback_id}",
            get(feedback::get_feedback).delete(feedback::delete_feedback),
        )
}

/// Create the service routes router.
pub fn service_routes() -> Router<AppState> {
    Router::new().route("/import_customers", get(service::import_customers))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/rest/v1/customers", customer_routes())
        .nest("/rest/v1/basket", basket_routes())
        .nest("/rest/v1/feedback", feedback_routes())
        .nest("/service", service_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_out_omits_absent_data() {
        let v = serde_json::to_value(OperationOut::ok()).unwrap();
        assert_eq!(v, serde_json::json!({"success": true, "message": null}));
    }

    #[test]
    fn test_operation_out_with_data() {
        let v = serde_json::to_value(OperationOut {
            success: true,
            message: None,
            data: Some(serde_json::json!({"count_deleted": 2})),
        })
        .unwrap();
        assert_eq!(v["data"]["count_deleted"], 2);
    }
}
