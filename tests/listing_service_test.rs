//! Listing service tests: host gating, ownership and the detail cache.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use stayhub::domain::{ListingUpdate, NewListing, PropertyType};
use stayhub::errors::AppError;
use stayhub::infra::{
    MockBookingRepository, MockCacheStore, MockListingRepository, MockPersistence,
    MockReviewRepository, MockUserRepository,
};
use stayhub::services::{Actor, ListingManager, ListingService};

fn manager(uow: MockPersistence, cache: MockCacheStore) -> ListingManager<MockPersistence> {
    ListingManager::new(Arc::new(uow), Arc::new(cache))
}

fn evicting_cache() -> MockCacheStore {
    let mut cache = MockCacheStore::new();
    cache.expect_delete().returning(|_| Ok(()));
    cache
}

fn new_listing() -> NewListing {
    NewListing {
        host_id: Uuid::nil(),
        title: "Harbour loft".to_string(),
        description: "Two rooms above the fish market".to_string(),
        property_type: PropertyType::Apartment,
        address: "Rua Augusta 1".to_string(),
        city: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        latitude: Some(38.71),
        longitude: Some(-9.14),
        nightly_price_cents: 12_500,
        cleaning_fee_cents: 4_000,
        max_guests: 3,
        bedrooms: 1,
        bathrooms: 1,
        amenities: vec!["wifi".to_string()],
        image_urls: Vec::new(),
        is_published: true,
    }
}

#[tokio::test]
async fn test_guest_cannot_create_listing() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));
    let mut listings = MockListingRepository::new();
    listings.expect_create().never();

    let result = manager(
        MockPersistence::new().with_users(users).with_listings(listings),
        MockCacheStore::new(),
    )
    .create(Actor::new(Uuid::new_v4(), false), new_listing())
    .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_host_creates_listing_under_own_id() {
    let host_id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::host(id))));
    let mut listings = MockListingRepository::new();
    listings
        .expect_create()
        .withf(move |listing| listing.host_id == host_id)
        .times(1)
        .returning(|listing| Ok(common::listing(Uuid::new_v4(), listing.host_id)));

    let created = manager(
        MockPersistence::new().with_users(users).with_listings(listings),
        MockCacheStore::new(),
    )
    .create(Actor::new(host_id, false), new_listing())
    .await
    .unwrap();

    assert_eq!(created.host_id, host_id);
}

#[tokio::test]
async fn test_out_of_range_coordinates_are_rejected() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::host(id))));

    let mut listing = new_listing();
    listing.latitude = Some(123.0);
    let result = manager(MockPersistence::new().with_users(users), MockCacheStore::new())
        .create(Actor::new(Uuid::new_v4(), false), listing)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_only_owner_updates_listing() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    listings.expect_update().never();

    let result = manager(MockPersistence::new().with_listings(listings), MockCacheStore::new())
        .update(
            Actor::new(Uuid::new_v4(), false),
            Uuid::new_v4(),
            ListingUpdate::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_update_evicts_cached_detail() {
    let host_id = Uuid::new_v4();
    let listing_id = Uuid::new_v4();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    listings.expect_update().times(1).returning(move |id, update| {
        let mut listing = common::listing(id, host_id);
        if let Some(title) = update.title {
            listing.title = title;
        }
        Ok(listing)
    });
    let mut cache = MockCacheStore::new();
    let expected_key = format!("listing:{}", listing_id);
    cache
        .expect_delete()
        .withf(move |key| key == expected_key)
        .times(1)
        .returning(|_| Ok(()));

    let updated = manager(MockPersistence::new().with_listings(listings), cache)
        .update(
            Actor::new(host_id, false),
            listing_id,
            ListingUpdate {
                title: Some("Renamed loft".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Renamed loft");
}

#[tokio::test]
async fn test_delete_refused_with_upcoming_confirmed_bookings() {
    let host_id = Uuid::new_v4();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    listings.expect_delete().never();
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_has_upcoming_confirmed()
        .returning(|_, _| Ok(true));

    let result = manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_bookings(bookings),
        MockCacheStore::new(),
    )
    .delete(Actor::new(host_id, false), Uuid::new_v4())
    .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_admin_deletes_any_listing() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    listings.expect_delete().times(1).returning(|_| Ok(()));
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_has_upcoming_confirmed()
        .returning(|_, _| Ok(false));

    manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_bookings(bookings),
        evicting_cache(),
    )
    .delete(Actor::new(Uuid::new_v4(), true), Uuid::new_v4())
    .await
    .unwrap();
}

#[tokio::test]
async fn test_detail_includes_rating_summary_and_is_cached() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .times(1)
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_ratings_for_listing()
        .returning(|_| Ok(vec![5, 4, 4]));
    let mut cache = MockCacheStore::new();
    cache.expect_get_raw().returning(|_| Ok(None));
    cache
        .expect_set_raw()
        .withf(|key, value, _| key.starts_with("listing:") && value.contains("\"review_count\":3"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let detail = manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_reviews(reviews),
        cache,
    )
    .get(Uuid::new_v4())
    .await
    .unwrap();

    assert_eq!(detail.review_count, 3);
    assert_eq!(detail.average_rating, Some(4.33));
}

#[tokio::test]
async fn test_detail_served_from_cache() {
    let listing_id = Uuid::new_v4();
    let cached = serde_json::json!({
        "id": listing_id,
        "host_id": Uuid::new_v4(),
        "title": "Cached loft",
        "description": "",
        "property_type": "apartment",
        "address": "Rua Augusta 1",
        "city": "Lisbon",
        "country": "Portugal",
        "latitude": null,
        "longitude": null,
        "nightly_price_cents": 10000,
        "cleaning_fee_cents": 2500,
        "max_guests": 4,
        "bedrooms": 2,
        "bathrooms": 1,
        "amenities": [],
        "image_urls": [],
        "is_published": true,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
        "average_rating": 5.0,
        "review_count": 1
    })
    .to_string();
    let mut cache = MockCacheStore::new();
    cache
        .expect_get_raw()
        .returning(move |_| Ok(Some(cached.clone())));
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().never();

    let detail = manager(MockPersistence::new().with_listings(listings), cache)
        .get(listing_id)
        .await
        .unwrap();

    assert_eq!(detail.listing.title, "Cached loft");
    assert_eq!(detail.review_count, 1);
}

#[tokio::test]
async fn test_unpublished_listing_detail_is_hidden() {
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().returning(|id| {
        let mut listing = common::listing(id, Uuid::new_v4());
        listing.is_published = false;
        Ok(Some(listing))
    });
    let mut cache = MockCacheStore::new();
    cache.expect_get_raw().returning(|_| Ok(None));

    let result = manager(MockPersistence::new().with_listings(listings), cache)
        .get(Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}
