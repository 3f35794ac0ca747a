//! Guest reviews of listings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub booking_id: Uuid,
    pub author_id: Uuid,
    /// 1 to 5 stars
    #[schema(example = 5)]
    pub rating: i32,
    #[schema(example = "Lovely place, great host.")]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub listing_id: Uuid,
    pub booking_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: String,
}
