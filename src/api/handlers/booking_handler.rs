//! Booking handlers for guests and hosts.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{BookingResponse, BookingStatus, RefundQuote};
use crate::errors::AppResult;
use crate::services::BookingRequest;
use crate::types::{Created, Paginated, PaginatedBookings, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub listing_id: Uuid,
    #[schema(example = "2026-07-01")]
    pub check_in: NaiveDate,
    #[schema(example = "2026-07-05")]
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "At least one guest is required"))]
    #[schema(example = 2)]
    pub guests: i32,
}

/// Host decision on a booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// confirmed, rejected or completed
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HostBookingsQuery {
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
}

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_bookings).post(create_booking))
        .route("/:id", get(get_booking).patch(update_booking_status))
        .route("/:id/refund-quote", get(get_refund_quote))
        .route("/:id/cancel", post(cancel_booking))
}

/// Request a stay
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking requested", body = BookingResponse),
        (status = 400, description = "Invalid dates or guest count"),
        (status = 404, description = "Listing not found"),
        (status = 409, description = "Dates already booked")
    )
)]
pub async fn create_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<Created<BookingResponse>> {
    let request = BookingRequest {
        listing_id: payload.listing_id,
        check_in: payload.check_in,
        check_out: payload.check_out,
        guests: payload.guests,
    };
    let booking = state
        .services
        .bookings()
        .create(current_user.id, request)
        .await?;
    Ok(Created(BookingResponse::from(booking)))
}

/// The caller's trips
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Bookings as guest", body = PaginatedBookings),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_my_bookings(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<BookingResponse>>> {
    let page = state
        .services
        .bookings()
        .list_as_guest(current_user.id, params)
        .await?;
    Ok(Json(page.map(BookingResponse::from)))
}

/// Bookings on the caller's listings
#[utoipa::path(
    get,
    path = "/api/hosting/bookings",
    tag = "Hosting",
    security(("bearer_auth" = [])),
    params(HostBookingsQuery, PaginationParams),
    responses(
        (status = 200, description = "Bookings as host", body = PaginatedBookings),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn host_bookings(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<HostBookingsQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<BookingResponse>>> {
    let page = state
        .services
        .bookings()
        .list_as_host(current_user.id, query.status, params)
        .await?;
    Ok(Json(page.map(BookingResponse::from)))
}

/// Booking detail (guest, host or admin)
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = BookingResponse),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings()
        .get(current_user.actor(), id)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

/// Confirm, reject or complete a booking (host or admin)
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Not the host"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn update_booking_status(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBookingStatusRequest>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings()
        .update_status(current_user.actor(), id, payload.status)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

/// Preview the refund for cancelling now
#[utoipa::path(
    get,
    path = "/api/bookings/{id}/refund-quote",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Refund preview", body = RefundQuote),
        (status = 400, description = "Booking cannot be cancelled"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_refund_quote(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RefundQuote>> {
    let quote = state
        .services
        .bookings()
        .refund_quote(current_user.actor(), id)
        .await?;
    Ok(Json(quote))
}

/// Cancel a booking as guest or host
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 400, description = "Booking cannot be cancelled"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings()
        .cancel(current_user.actor(), id)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}
