//! Favorites and notification inbox tests.

mod common;

use std::sync::Arc;

use chrono::Utc;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use stayhub::domain::NotificationKind;
use stayhub::errors::AppError;
use stayhub::infra::{
    MockFavoriteRepository, MockListingRepository, MockNotificationRepository, MockPersistence,
};
use stayhub::services::{
    FavoriteManager, FavoriteService, NotificationManager, NotificationService,
};

fn listings_found() -> MockListingRepository {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    listings
}

#[tokio::test]
async fn test_toggle_adds_missing_favorite() {
    let mut favorites = MockFavoriteRepository::new();
    favorites.expect_exists().returning(|_, _| Ok(false));
    favorites.expect_add().times(1).returning(|_, _| Ok(()));
    favorites.expect_remove().never();

    let favorited = FavoriteManager::new(Arc::new(
        MockPersistence::new()
            .with_listings(listings_found())
            .with_favorites(favorites),
    ))
    .toggle(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap();

    assert!(favorited);
}

#[tokio::test]
async fn test_toggle_removes_existing_favorite() {
    let mut favorites = MockFavoriteRepository::new();
    favorites.expect_exists().returning(|_, _| Ok(true));
    favorites.expect_remove().times(1).returning(|_, _| Ok(()));
    favorites.expect_add().never();

    let favorited = FavoriteManager::new(Arc::new(
        MockPersistence::new()
            .with_listings(listings_found())
            .with_favorites(favorites),
    ))
    .toggle(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap();

    assert!(!favorited);
}

#[tokio::test]
async fn test_toggle_unknown_listing_is_not_found() {
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().returning(|_| Ok(None));

    let manager = FavoriteManager::new(Arc::new(MockPersistence::new().with_listings(listings)));
    let error = assert_err!(manager.toggle(Uuid::new_v4(), Uuid::new_v4()).await);

    assert!(matches!(error, AppError::NotFound));
}

#[tokio::test]
async fn test_favorites_keep_saved_order_and_skip_deleted() {
    let newest = Uuid::new_v4();
    let deleted = Uuid::new_v4();
    let oldest = Uuid::new_v4();

    let mut favorites = MockFavoriteRepository::new();
    favorites
        .expect_listing_ids()
        .returning(move |_| Ok(vec![newest, deleted, oldest]));
    let mut listings = MockListingRepository::new();
    listings.expect_find_many().returning(move |_| {
        Ok(vec![
            common::listing(oldest, Uuid::new_v4()),
            common::listing(newest, Uuid::new_v4()),
        ])
    });

    let saved = FavoriteManager::new(Arc::new(
        MockPersistence::new()
            .with_favorites(favorites)
            .with_listings(listings),
    ))
    .list(Uuid::new_v4())
    .await
    .unwrap();

    let ids: Vec<Uuid> = saved.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![newest, oldest]);
}

#[tokio::test]
async fn test_mark_read_of_foreign_notification_is_not_found() {
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_find_for_user().returning(|_, _| Ok(None));
    notifications.expect_mark_read().never();

    let result = NotificationManager::new(Arc::new(
        MockPersistence::new().with_notifications(notifications),
    ))
    .mark_read(Uuid::new_v4(), Uuid::new_v4())
    .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_find_for_user().returning(|_, user_id| {
        let mut notification = common::notification(user_id, NotificationKind::NewMessage);
        notification.read_at = Some(Utc::now());
        Ok(Some(notification))
    });
    notifications.expect_mark_read().never();

    let notification = NotificationManager::new(Arc::new(
        MockPersistence::new().with_notifications(notifications),
    ))
    .mark_read(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap();

    assert!(notification.read_at.is_some());
}

#[tokio::test]
async fn test_mark_all_read_reports_count() {
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_mark_all_read().returning(|_| Ok(3));

    let manager = NotificationManager::new(Arc::new(
        MockPersistence::new().with_notifications(notifications),
    ));
    let updated = assert_ok!(manager.mark_all_read(Uuid::new_v4()).await);

    assert_eq!(updated, 3);
}

#[tokio::test]
async fn test_delete_of_foreign_notification_is_not_found() {
    let owner = Uuid::new_v4();
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_find_for_user()
        .returning(move |_, user_id| {
            Ok((user_id == owner).then(|| common::notification(owner, NotificationKind::NewMessage)))
        });
    notifications.expect_delete().never();

    let manager = NotificationManager::new(Arc::new(
        MockPersistence::new().with_notifications(notifications),
    ));
    let result = manager.delete(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(assert_err!(result), AppError::NotFound));
}

#[tokio::test]
async fn test_owner_can_delete_notification() {
    let owner = Uuid::new_v4();
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_find_for_user()
        .returning(|_, user_id| Ok(Some(common::notification(user_id, NotificationKind::NewMessage))));
    notifications.expect_delete().times(1).returning(|_| Ok(()));

    let manager = NotificationManager::new(Arc::new(
        MockPersistence::new().with_notifications(notifications),
    ));

    assert_ok!(manager.delete(owner, Uuid::new_v4()).await);
}
