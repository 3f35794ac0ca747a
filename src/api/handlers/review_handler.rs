//! Review handlers.

use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Review;
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5)]
    pub rating: i32,
    #[validate(length(max = 5000, message = "Comment is too long"))]
    #[serde(default)]
    #[schema(example = "Lovely place, great host.")]
    pub comment: String,
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/:id", delete(delete_review))
}

/// Review a finished stay
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Stay not finished or invalid rating"),
        (status = 403, description = "Not the guest of this booking"),
        (status = 409, description = "Booking already reviewed")
    )
)]
pub async fn create_review(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<Created<Review>> {
    let review = state
        .services
        .reviews()
        .create(
            current_user.id,
            payload.booking_id,
            payload.rating,
            payload.comment,
        )
        .await?;
    Ok(Created(review))
}

/// Delete a review (author or admin)
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .reviews()
        .delete(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}
