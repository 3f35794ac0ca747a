//! Listing domain entity: a rentable property.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of property offered by a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Cabin,
    Villa,
    Room,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Cabin => "cabin",
            PropertyType::Villa => "villa",
            PropertyType::Room => "room",
            PropertyType::Other => "other",
        }
    }
}

impl From<&str> for PropertyType {
    fn from(s: &str) -> Self {
        match s {
            "apartment" => PropertyType::Apartment,
            "house" => PropertyType::House,
            "cabin" => PropertyType::Cabin,
            "villa" => PropertyType::Villa,
            "room" => PropertyType::Room,
            _ => PropertyType::Other,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub image_urls: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Owner or admin may edit and delete
    pub fn is_managed_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.host_id == user_id
    }

    /// Visible in search and bookable
    pub fn is_bookable(&self) -> bool {
        self.is_published && self.deleted_at.is_none()
    }
}

/// Data required to create a listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub host_id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub image_urls: Vec<String>,
    pub is_published: bool,
}

/// Partial listing update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nightly_price_cents: Option<i64>,
    pub cleaning_fee_cents: Option<i64>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// Search filters for the public listing index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive match on city or country
    pub location: Option<String>,
    pub guests: Option<i32>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub property_type: Option<PropertyType>,
    /// Only listings free for the whole `[check_in, check_out)` range
    pub stay: Option<(NaiveDate, NaiveDate)>,
}

/// Rating summary aggregated from reviews
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct RatingSummary {
    /// Average rating rounded to two decimals, absent without reviews
    pub average: Option<f64>,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        let average = sum as f64 / ratings.len() as f64;
        Self {
            average: Some((average * 100.0).round() / 100.0),
            count: ratings.len() as u64,
        }
    }
}

/// Listing response returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub host_id: Uuid,
    #[schema(example = "Sunny loft near the harbour")]
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub address: String,
    #[schema(example = "Lisbon")]
    pub city: String,
    #[schema(example = "Portugal")]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Nightly price in cents
    #[schema(example = 12500)]
    pub nightly_price_cents: i64,
    /// One-off cleaning fee in cents
    #[schema(example = 4000)]
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub image_urls: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            host_id: listing.host_id,
            title: listing.title,
            description: listing.description,
            property_type: listing.property_type,
            address: listing.address,
            city: listing.city,
            country: listing.country,
            latitude: listing.latitude,
            longitude: listing.longitude,
            nightly_price_cents: listing.nightly_price_cents,
            cleaning_fee_cents: listing.cleaning_fee_cents,
            max_guests: listing.max_guests,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            amenities: listing.amenities,
            image_urls: listing.image_urls,
            is_published: listing.is_published,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Listing detail with its rating summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub average_rating: Option<f64>,
    pub review_count: u64,
}

/// A date range already taken by a pending or confirmed booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookedRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_round_trips_through_storage() {
        for kind in [
            PropertyType::Apartment,
            PropertyType::House,
            PropertyType::Cabin,
            PropertyType::Villa,
            PropertyType::Room,
            PropertyType::Other,
        ] {
            assert_eq!(PropertyType::from(kind.as_str()), kind);
        }
        assert_eq!(PropertyType::from("castle"), PropertyType::Other);
    }

    #[test]
    fn test_rating_summary_without_reviews() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.average, None);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_rating_summary_rounds_to_two_decimals() {
        let summary = RatingSummary::from_ratings(&[5, 4, 4]);
        assert_eq!(summary.average, Some(4.33));
        assert_eq!(summary.count, 3);
    }
}
