//! Admin console handlers.
//!
//! Mounted behind `require_admin_middleware`; every handler still takes
//! `CurrentUser` so actions are attributed in the admin log.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    AdminLog, AnalyticsRange, AnalyticsReport, HostRequest, HostRequestDecision,
    HostRequestStatus, PlatformStats, PrivilegeUpdate, UserResponse,
};
use crate::errors::AppResult;
use crate::infra::BackupFile;
use crate::services::UserQuery;
use crate::types::{
    Created, NoContent, Paginated, PaginatedAdminLogs, PaginatedHostRequests, PaginatedUsers,
    PaginationParams,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// 7d, 30d or 12m (default 30d)
    #[serde(default)]
    #[param(value_type = Option<String>, example = "30d")]
    pub range: AnalyticsRange,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    /// Include soft-deleted accounts
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HostRequestListQuery {
    pub status: Option<HostRequestStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminLogQuery {
    /// Only actions by this admin
    pub admin_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub is_admin: Option<bool>,
    pub is_host: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RejectHostRequest {
    #[validate(length(max = 2000, message = "Reason is too long"))]
    pub reason: Option<String>,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/analytics", get(get_analytics))
        .route("/users", get(list_users))
        .route("/users/:id", patch(update_user).delete(delete_user))
        .route("/users/:id/restore", post(restore_user))
        .route("/host-requests", get(list_host_requests))
        .route("/host-requests/:id/approve", post(approve_host_request))
        .route("/host-requests/:id/reject", post(reject_host_request))
        .route("/backups", get(list_backups).post(create_backup))
        .route("/logs", get(list_logs))
}

/// Platform totals
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform totals", body = PlatformStats),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<PlatformStats>> {
    let stats = state.services.admin().stats().await?;
    Ok(Json(stats))
}

/// Bucketed sign-ups, bookings and revenue
#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Analytics series", body = AnalyticsReport),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    let report = state.services.admin().analytics(query.range).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserListQuery, PaginationParams),
    responses(
        (status = 200, description = "Users", body = PaginatedUsers),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let query = UserQuery {
        search: query.search,
        include_deleted: query.include_deleted,
    };
    let page = state.services.admin().list_users(query, params).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// Change admin or host flags
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Cannot revoke own admin access"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = PrivilegeUpdate {
        is_admin: payload.is_admin,
        is_host: payload.is_host,
    };
    let user = state
        .services
        .admin()
        .update_user(current_user.id, id, update)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Soft delete a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .admin()
        .delete_user(current_user.id, id)
        .await?;
    Ok(NoContent)
}

/// Restore a soft-deleted user
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/restore",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 400, description = "User is not deleted")
    )
)]
pub async fn restore_user(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .admin()
        .restore_user(current_user.id, id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Host application queue, oldest first
#[utoipa::path(
    get,
    path = "/api/admin/host-requests",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(HostRequestListQuery, PaginationParams),
    responses(
        (status = 200, description = "Host requests", body = PaginatedHostRequests)
    )
)]
pub async fn list_host_requests(
    State(state): State<AppState>,
    Query(query): Query<HostRequestListQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<HostRequest>>> {
    let page = state
        .services
        .host_requests()
        .list(query.status, params)
        .await?;
    Ok(Json(page))
}

/// Approve an application; the applicant becomes a host
#[utoipa::path(
    post,
    path = "/api/admin/host-requests/{id}/approve",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Host request ID")),
    responses(
        (status = 200, description = "Request approved", body = HostRequest),
        (status = 400, description = "Request already decided"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn approve_host_request(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<HostRequest>> {
    let request = state
        .services
        .host_requests()
        .decide(current_user.id, id, HostRequestDecision::Approve)
        .await?;
    Ok(Json(request))
}

/// Reject an application
#[utoipa::path(
    post,
    path = "/api/admin/host-requests/{id}/reject",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Host request ID")),
    request_body = RejectHostRequest,
    responses(
        (status = 200, description = "Request rejected", body = HostRequest),
        (status = 400, description = "Request already decided"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn reject_host_request(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RejectHostRequest>,
) -> AppResult<Json<HostRequest>> {
    let reason = payload.reason.filter(|r| !r.trim().is_empty());
    let request = state
        .services
        .host_requests()
        .decide(current_user.id, id, HostRequestDecision::Reject { reason })
        .await?;
    Ok(Json(request))
}

/// Dump the database into the backup directory
#[utoipa::path(
    post,
    path = "/api/admin/backups",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Backup written", body = BackupFile),
        (status = 500, description = "pg_dump failed")
    )
)]
pub async fn create_backup(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Created<BackupFile>> {
    let backup = state.services.admin().create_backup(current_user.id).await?;
    Ok(Created(backup))
}

#[utoipa::path(
    get,
    path = "/api/admin/backups",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Backup files, newest first", body = Vec<BackupFile>)
    )
)]
pub async fn list_backups(State(state): State<AppState>) -> AppResult<Json<Vec<BackupFile>>> {
    let backups = state.services.admin().list_backups().await?;
    Ok(Json(backups))
}

/// Admin action log, newest first
#[utoipa::path(
    get,
    path = "/api/admin/logs",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AdminLogQuery, PaginationParams),
    responses(
        (status = 200, description = "Admin actions", body = PaginatedAdminLogs)
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<AdminLogQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AdminLog>>> {
    let page = state.services.admin().logs(query.admin_id, params).await?;
    Ok(Json(page))
}
