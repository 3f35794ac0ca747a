//! Favorite listing handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::ListingResponse;
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteToggleResponse {
    /// Whether the listing is a favorite after the toggle
    pub favorited: bool,
}

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/:listing_id/toggle", post(toggle_favorite))
}

/// Add or remove a favorite
#[utoipa::path(
    post,
    path = "/api/favorites/{listing_id}/toggle",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("listing_id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "New favorite state", body = FavoriteToggleResponse),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn toggle_favorite(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<FavoriteToggleResponse>> {
    let favorited = state
        .services
        .favorites()
        .toggle(current_user.id, listing_id)
        .await?;
    Ok(Json(FavoriteToggleResponse { favorited }))
}

/// Favorited listings, most recent first
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorite listings", body = Vec<ListingResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_favorites(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ListingResponse>>> {
    let listings = state.services.favorites().list(current_user.id).await?;
    Ok(Json(listings.into_iter().map(ListingResponse::from).collect()))
}
