//! Notification inbox handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Notification;
use crate::errors::AppResult;
use crate::types::{NoContent, Paginated, PaginatedNotifications, PaginationParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    /// Notifications that changed from unread to read
    pub updated: u64,
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id", delete(delete_notification))
        .route("/:id/read", patch(mark_read))
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery, PaginationParams),
    responses(
        (status = 200, description = "Notifications", body = PaginatedNotifications),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Notification>>> {
    let page = state
        .services
        .notifications()
        .list(current_user.id, query.unread_only, params)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    )
)]
pub async fn unread_count(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<UnreadCountResponse>> {
    let unread = state
        .services
        .notifications()
        .unread_count(current_user.id)
        .await?;
    Ok(Json(UnreadCountResponse { unread }))
}

#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    let notification = state
        .services
        .notifications()
        .mark_read(current_user.id, id)
        .await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All notifications read", body = MarkAllReadResponse)
    )
)]
pub async fn mark_all_read(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = state
        .services
        .notifications()
        .mark_all_read(current_user.id)
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .notifications()
        .delete(current_user.id, id)
        .await?;
    Ok(NoContent)
}
