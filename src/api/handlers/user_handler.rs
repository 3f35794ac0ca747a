//! Account handlers: profile, password, security settings and public
//! profiles.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ProfileUpdate, PublicProfile, SecuritySettings, SecurityUpdate, UserResponse};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Profile update; empty strings clear optional fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Bio is too long"))]
    pub bio: Option<String>,
    #[validate(length(max = 32, message = "Phone number is too long"))]
    #[schema(example = "+351 912 345 678")]
    pub phone: Option<String>,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSecurityRequest {
    pub two_factor_enabled: Option<bool>,
    pub login_alerts: Option<bool>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/password", post(change_password))
        .route("/me/security", get(get_security).put(update_security))
        .route("/:id", get(get_public_profile))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update own profile
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_me(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = ProfileUpdate {
        name: payload.name,
        bio: payload.bio,
        phone: payload.phone,
        avatar_url: payload.avatar_url,
    };
    let user = state
        .services
        .users()
        .update_profile(current_user.id, update)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change own password
#[utoipa::path(
    post,
    path = "/api/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Current password is wrong")
    )
)]
pub async fn change_password(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .users()
        .change_password(current_user.id, payload.current_password, payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// Own security settings
#[utoipa::path(
    get,
    path = "/api/users/me/security",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Security settings", body = SecuritySettings),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_security(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<SecuritySettings>> {
    let settings = state
        .services
        .users()
        .security_settings(current_user.id)
        .await?;
    Ok(Json(settings))
}

/// Update own security settings
#[utoipa::path(
    put,
    path = "/api/users/me/security",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateSecurityRequest,
    responses(
        (status = 200, description = "Updated settings", body = SecuritySettings),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_security(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateSecurityRequest>,
) -> AppResult<Json<SecuritySettings>> {
    let update = SecurityUpdate {
        two_factor_enabled: payload.two_factor_enabled,
        login_alerts: payload.login_alerts,
    };
    let settings = state
        .services
        .users()
        .update_security(current_user.id, update)
        .await?;
    Ok(Json(settings))
}

/// Public profile of any active user
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicProfile>> {
    let profile = state.services.users().public_profile(id).await?;
    Ok(Json(profile))
}
