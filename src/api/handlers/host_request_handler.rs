//! Host application handlers for applicants.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::HostRequest;
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct HostApplicationRequest {
    #[validate(length(min = 1, max = 2000, message = "Tell us a little about your place"))]
    #[schema(example = "I rent out a two-bedroom flat in Porto.")]
    pub message: String,
}

pub fn host_request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(apply_for_hosting))
        .route("/me", get(my_host_requests))
}

/// Apply for hosting privileges
#[utoipa::path(
    post,
    path = "/api/host-requests",
    tag = "Host requests",
    security(("bearer_auth" = [])),
    request_body = HostApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = HostRequest),
        (status = 400, description = "Already a host"),
        (status = 409, description = "A request is already pending")
    )
)]
pub async fn apply_for_hosting(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<HostApplicationRequest>,
) -> AppResult<Created<HostRequest>> {
    let request = state
        .services
        .host_requests()
        .apply(current_user.id, payload.message)
        .await?;
    Ok(Created(request))
}

/// The caller's applications
#[utoipa::path(
    get,
    path = "/api/host-requests/me",
    tag = "Host requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own applications", body = Vec<HostRequest>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_host_requests(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<HostRequest>>> {
    let requests = state
        .services
        .host_requests()
        .mine(current_user.id)
        .await?;
    Ok(Json(requests))
}
