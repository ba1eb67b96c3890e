//! Feedback domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vapteke_core::{CustomerId, FeedbackId, PlatformId};

/// A site feedback record.
///
/// `customer_id` is a weak reference: feedback survives customer deletion.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub url: String,
    pub rating: i16,
    pub comment: String,
    pub customer_id: Option<CustomerId>,
    /// Interned platform name, joined from `platforms`.
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a feedback record.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub url: String,
    pub rating: i16,
    pub comment: String,
    pub customer_id: Option<CustomerId>,
    pub platform_id: Option<PlatformId>,
}
