//! Review tests: only guests of finished stays may review, once.

mod common;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use stayhub::domain::{BookingStatus, NotificationKind, Review};
use stayhub::errors::AppError;
use stayhub::infra::{
    MockBookingRepository, MockCacheStore, MockNotificationRepository, MockPersistence,
    MockReviewRepository,
};
use stayhub::services::{Actor, ReviewManager, ReviewService};

fn manager(uow: MockPersistence, cache: MockCacheStore) -> ReviewManager<MockPersistence> {
    ReviewManager::new(Arc::new(uow), Arc::new(cache))
}

fn review(author_id: Uuid) -> Review {
    Review {
        id: Uuid::new_v4(),
        listing_id: Uuid::new_v4(),
        booking_id: Uuid::new_v4(),
        author_id,
        rating: 5,
        comment: "Lovely place".to_string(),
        created_at: Utc::now(),
    }
}

fn bookings_with(guest_id: Uuid, host_id: Uuid, check_out_days: i64, status: BookingStatus) -> MockBookingRepository {
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            guest_id,
            host_id,
            common::days_from_today(check_out_days - 3),
            common::days_from_today(check_out_days),
            status,
        )))
    });
    bookings
}

#[tokio::test]
async fn test_rating_must_be_in_range() {
    let result = manager(MockPersistence::new(), MockCacheStore::new())
        .create(Uuid::new_v4(), Uuid::new_v4(), 6, "Too good".to_string())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_only_the_guest_may_review() {
    let result = manager(
        MockPersistence::new().with_bookings(bookings_with(
            Uuid::new_v4(),
            Uuid::new_v4(),
            -1,
            BookingStatus::Completed,
        )),
        MockCacheStore::new(),
    )
    .create(Uuid::new_v4(), Uuid::new_v4(), 5, "Great".to_string())
    .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_review_before_checkout_is_rejected() {
    let guest_id = Uuid::new_v4();
    let result = manager(
        MockPersistence::new().with_bookings(bookings_with(
            guest_id,
            Uuid::new_v4(),
            3,
            BookingStatus::Confirmed,
        )),
        MockCacheStore::new(),
    )
    .create(guest_id, Uuid::new_v4(), 5, "Great".to_string())
    .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let guest_id = Uuid::new_v4();
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_booking()
        .returning(move |_| Ok(Some(review(guest_id))));
    reviews.expect_create().never();

    let result = manager(
        MockPersistence::new()
            .with_bookings(bookings_with(
                guest_id,
                Uuid::new_v4(),
                -2,
                BookingStatus::Completed,
            ))
            .with_reviews(reviews),
        MockCacheStore::new(),
    )
    .create(guest_id, Uuid::new_v4(), 4, "Again".to_string())
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_review_after_confirmed_stay_notifies_host() {
    let guest_id = Uuid::new_v4();
    let host_id = Uuid::new_v4();
    let mut reviews = MockReviewRepository::new();
    reviews.expect_find_by_booking().returning(|_| Ok(None));
    reviews
        .expect_create()
        .withf(|new| new.rating == 4 && new.comment == "Quiet street")
        .times(1)
        .returning(|new| {
            let mut created = review(new.author_id);
            created.rating = new.rating;
            created.comment = new.comment;
            Ok(created)
        });
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == host_id && n.kind == NotificationKind::NewReview)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));
    let mut cache = MockCacheStore::new();
    cache
        .expect_delete()
        .withf(|key| key.starts_with("listing:"))
        .times(1)
        .returning(|_| Ok(()));

    let created = manager(
        MockPersistence::new()
            .with_bookings(bookings_with(guest_id, host_id, 0, BookingStatus::Confirmed))
            .with_reviews(reviews)
            .with_notifications(notifications),
        cache,
    )
    .create(guest_id, Uuid::new_v4(), 4, "  Quiet street ".to_string())
    .await
    .unwrap();

    assert_eq!(created.author_id, guest_id);
    assert_eq!(created.rating, 4);
}

#[tokio::test]
async fn test_stranger_cannot_delete_review() {
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .returning(|_| Ok(Some(review(Uuid::new_v4()))));
    reviews.expect_delete().never();

    let result = manager(MockPersistence::new().with_reviews(reviews), MockCacheStore::new())
        .delete(Actor::new(Uuid::new_v4(), false), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_admin_removes_review() {
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_find_by_id()
        .returning(|_| Ok(Some(review(Uuid::new_v4()))));
    reviews.expect_delete().times(1).returning(|_| Ok(()));
    let mut cache = MockCacheStore::new();
    cache.expect_delete().returning(|_| Ok(()));

    manager(MockPersistence::new().with_reviews(reviews), cache)
        .delete(Actor::new(Uuid::new_v4(), true), Uuid::new_v4())
        .await
        .unwrap();
}
