//! Saved payment card handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CardBrand, PaymentMethod};
use crate::errors::AppResult;
use crate::services::CardInput;
use crate::types::{Created, NoContent};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCardRequest {
    pub brand: CardBrand,
    /// Last four digits of the card number
    #[schema(example = "4242")]
    pub last4: String,
    #[validate(range(min = 1, max = 12, message = "exp_month must be between 1 and 12"))]
    #[schema(example = 12)]
    pub exp_month: i32,
    #[validate(range(min = 2000, max = 2100, message = "exp_year is invalid"))]
    #[schema(example = 2028)]
    pub exp_year: i32,
    #[validate(length(min = 1, max = 100, message = "Cardholder name is required"))]
    #[schema(example = "Jane Doe")]
    pub holder_name: String,
    /// Make this the default card
    #[serde(default)]
    pub make_default: bool,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cards).post(add_card))
        .route("/:id", delete(delete_card))
        .route("/:id/default", post(set_default_card))
}

/// List own cards, default first
#[utoipa::path(
    get,
    path = "/api/payment-methods",
    tag = "Payment methods",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Saved cards", body = Vec<PaymentMethod>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_cards(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PaymentMethod>>> {
    let cards = state
        .services
        .payment_methods()
        .list(current_user.id)
        .await?;
    Ok(Json(cards))
}

/// Save a card
#[utoipa::path(
    post,
    path = "/api/payment-methods",
    tag = "Payment methods",
    security(("bearer_auth" = [])),
    request_body = AddCardRequest,
    responses(
        (status = 201, description = "Card saved", body = PaymentMethod),
        (status = 400, description = "Validation error or expired card"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn add_card(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddCardRequest>,
) -> AppResult<Created<PaymentMethod>> {
    let card = CardInput {
        brand: payload.brand,
        last4: payload.last4,
        exp_month: payload.exp_month,
        exp_year: payload.exp_year,
        holder_name: payload.holder_name,
        make_default: payload.make_default,
    };
    let saved = state
        .services
        .payment_methods()
        .add(current_user.id, card)
        .await?;
    Ok(Created(saved))
}

/// Make a card the default
#[utoipa::path(
    post,
    path = "/api/payment-methods/{id}/default",
    tag = "Payment methods",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment method ID")),
    responses(
        (status = 200, description = "New default card", body = PaymentMethod),
        (status = 404, description = "Card not found")
    )
)]
pub async fn set_default_card(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PaymentMethod>> {
    let card = state
        .services
        .payment_methods()
        .set_default(current_user.id, id)
        .await?;
    Ok(Json(card))
}

/// Delete a card
#[utoipa::path(
    delete,
    path = "/api/payment-methods/{id}",
    tag = "Payment methods",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment method ID")),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn delete_card(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .payment_methods()
        .delete(current_user.id, id)
        .await?;
    Ok(NoContent)
}
