//! Listing handlers: public search and detail, host CRUD, availability
//! and the reviews of a listing.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
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
use crate::domain::{
    BookedRange, ListingDetail, ListingFilter, ListingResponse, ListingUpdate, NewListing,
    PropertyType, Review,
};
use crate::errors::{AppError, AppResult};
use crate::types::{
    Created, NoContent, Paginated, PaginatedListings, PaginatedReviews, PaginationParams,
};

/// Search filters; `check_in` and `check_out` go together
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingSearchQuery {
    /// Matches city or country, case-insensitive
    pub location: Option<String>,
    /// Minimum guest capacity
    pub guests: Option<i32>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub property_type: Option<PropertyType>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl ListingSearchQuery {
    fn into_filter(self) -> AppResult<ListingFilter> {
        let stay = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Some((check_in, check_out)),
            (None, None) => None,
            _ => {
                return Err(AppError::validation(
                    "check_in and check_out must be given together",
                ))
            }
        };
        Ok(ListingFilter {
            location: self.location.filter(|l| !l.trim().is_empty()),
            guests: self.guests,
            min_price_cents: self.min_price_cents,
            max_price_cents: self.max_price_cents,
            property_type: self.property_type,
            stay,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// First night of the window
    pub from: NaiveDate,
    /// Day after the last night of the window
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    #[schema(example = "Sunny loft near the harbour")]
    pub title: String,
    #[validate(length(max = 10000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,
    pub property_type: PropertyType,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    #[schema(example = "Lisbon")]
    pub city: String,
    #[validate(length(min = 1, message = "Country is required"))]
    #[schema(example = "Portugal")]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 1, max = 100_000_000, message = "Nightly price must be between 1 and 100000000 cents"))]
    #[schema(example = 12500)]
    pub nightly_price_cents: i64,
    #[validate(range(min = 0, max = 10_000_000, message = "Cleaning fee must be between 0 and 10000000 cents"))]
    #[serde(default)]
    pub cleaning_fee_cents: i64,
    #[validate(range(min = 1, max = 50, message = "max_guests must be between 1 and 50"))]
    pub max_guests: i32,
    #[validate(range(min = 0, message = "bedrooms cannot be negative"))]
    #[serde(default)]
    pub bedrooms: i32,
    #[validate(range(min = 0, message = "bathrooms cannot be negative"))]
    #[serde(default)]
    pub bathrooms: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Publish right away
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

/// Partial listing update; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: Option<String>,
    #[validate(length(min = 1, message = "Country cannot be empty"))]
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 1, max = 100_000_000, message = "Nightly price must be between 1 and 100000000 cents"))]
    pub nightly_price_cents: Option<i64>,
    #[validate(range(min = 0, max = 10_000_000, message = "Cleaning fee must be between 0 and 10000000 cents"))]
    pub cleaning_fee_cents: Option<i64>,
    #[validate(range(min = 1, max = 50, message = "max_guests must be between 1 and 50"))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 0, message = "bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl From<UpdateListingRequest> for ListingUpdate {
    fn from(req: UpdateListingRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            property_type: req.property_type,
            address: req.address,
            city: req.city,
            country: req.country,
            latitude: req.latitude,
            longitude: req.longitude,
            nightly_price_cents: req.nightly_price_cents,
            cleaning_fee_cents: req.cleaning_fee_cents,
            max_guests: req.max_guests,
            bedrooms: req.bedrooms,
            bathrooms: req.bathrooms,
            amenities: req.amenities,
            image_urls: req.image_urls,
            is_published: req.is_published,
        }
    }
}

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_listings).post(create_listing))
        .route(
            "/:id",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
        .route("/:id/availability", get(get_availability))
        .route("/:id/reviews", get(list_listing_reviews))
}

/// Search published listings
#[utoipa::path(
    get,
    path = "/api/listings",
    tag = "Listings",
    params(ListingSearchQuery, PaginationParams),
    responses(
        (status = 200, description = "Matching listings", body = PaginatedListings),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingSearchQuery>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ListingResponse>>> {
    let filter = query.into_filter()?;
    let page = state.services.listings().search(filter, params).await?;
    Ok(Json(page))
}

/// Listing detail with rating summary
#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing detail", body = ListingDetail),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ListingDetail>> {
    let detail = state.services.listings().get(id).await?;
    Ok(Json(detail))
}

/// Create a listing (hosts only)
#[utoipa::path(
    post,
    path = "/api/listings",
    tag = "Listings",
    security(("bearer_auth" = [])),
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not a host")
    )
)]
pub async fn create_listing(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateListingRequest>,
) -> AppResult<Created<ListingResponse>> {
    let listing = NewListing {
        host_id: current_user.id,
        title: payload.title,
        description: payload.description,
        property_type: payload.property_type,
        address: payload.address,
        city: payload.city,
        country: payload.country,
        latitude: payload.latitude,
        longitude: payload.longitude,
        nightly_price_cents: payload.nightly_price_cents,
        cleaning_fee_cents: payload.cleaning_fee_cents,
        max_guests: payload.max_guests,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        amenities: payload.amenities,
        image_urls: payload.image_urls,
        is_published: payload.is_published,
    };
    let created = state
        .services
        .listings()
        .create(current_user.actor(), listing)
        .await?;
    Ok(Created(ListingResponse::from(created)))
}

/// Update a listing (owner or admin)
#[utoipa::path(
    put,
    path = "/api/listings/{id}",
    tag = "Listings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn update_listing(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateListingRequest>,
) -> AppResult<Json<ListingResponse>> {
    let updated = state
        .services
        .listings()
        .update(current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(ListingResponse::from(updated)))
}

/// Soft delete a listing (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    tag = "Listings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 400, description = "Upcoming confirmed bookings exist"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn delete_listing(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .listings()
        .delete(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

/// Booked date ranges in a window
#[utoipa::path(
    get,
    path = "/api/listings/{id}/availability",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Booked ranges", body = Vec<BookedRange>),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(window): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<BookedRange>>> {
    let ranges = state
        .services
        .listings()
        .availability(id, window.from, window.to)
        .await?;
    Ok(Json(ranges))
}

/// Reviews of a listing, newest first
#[utoipa::path(
    get,
    path = "/api/listings/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "Listing ID"), PaginationParams),
    responses(
        (status = 200, description = "Reviews", body = PaginatedReviews)
    )
)]
pub async fn list_listing_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Review>>> {
    let page = state.services.reviews().list_for_listing(id, params).await?;
    Ok(Json(page))
}

/// The caller's own listings, drafts included
#[utoipa::path(
    get,
    path = "/api/hosting/listings",
    tag = "Hosting",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own listings", body = Vec<ListingResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn host_listings(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ListingResponse>>> {
    let listings = state
        .services
        .listings()
        .host_listings(current_user.id)
        .await?;
    Ok(Json(listings.into_iter().map(ListingResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_search_query_requires_both_stay_dates() {
        let query = ListingSearchQuery {
            check_in: Some(date(2026, 7, 1)),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_search_query_builds_stay_and_drops_blank_location() {
        let query = ListingSearchQuery {
            location: Some("  ".to_string()),
            check_in: Some(date(2026, 7, 1)),
            check_out: Some(date(2026, 7, 4)),
            guests: Some(2),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.location, None);
        assert_eq!(filter.guests, Some(2));
        assert_eq!(filter.stay, Some((date(2026, 7, 1), date(2026, 7, 4))));
    }

    #[test]
    fn test_update_request_maps_only_given_fields() {
        let update: ListingUpdate = UpdateListingRequest {
            title: Some("New title".to_string()),
            is_published: Some(false),
            ..Default::default()
        }
        .into();
        assert_eq!(update.title.as_deref(), Some("New title"));
        assert_eq!(update.is_published, Some(false));
        assert_eq!(update.city, None);
    }

    #[test]
    fn test_update_request_caps_prices() {
        let update = UpdateListingRequest {
            nightly_price_cents: Some(100_000_000_000_000_000),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateListingRequest {
            nightly_price_cents: Some(25_000),
            cleaning_fee_cents: Some(10_000_001),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateListingRequest {
            nightly_price_cents: Some(25_000),
            cleaning_fee_cents: Some(5_000),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}
