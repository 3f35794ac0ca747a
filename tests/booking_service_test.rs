//! Booking service tests: reservations, host decisions and cancellations.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use stayhub::domain::{BookingStatus, NotificationKind, RefundTier};
use stayhub::errors::AppError;
use stayhub::infra::{
    MockBookingRepository, MockListingRepository, MockNotificationRepository, MockPersistence,
    MockUserRepository,
};
use stayhub::jobs::MockEmailDispatcher;
use stayhub::services::{Actor, BookingManager, BookingRequest, BookingService};

fn manager(uow: MockPersistence, mailer: MockEmailDispatcher) -> BookingManager<MockPersistence> {
    BookingManager::new(Arc::new(uow), Arc::new(mailer))
}

fn quiet_mailer() -> MockEmailDispatcher {
    let mut mailer = MockEmailDispatcher::new();
    mailer.expect_dispatch().returning(|_| Ok(()));
    mailer
}

fn users_found() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));
    users
}

fn notifications_accepting() -> MockNotificationRepository {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));
    notifications
}

fn request(listing_id: Uuid, check_in_days: i64, nights: i64, guests: i32) -> BookingRequest {
    BookingRequest {
        listing_id,
        check_in: common::days_from_today(check_in_days),
        check_out: common::days_from_today(check_in_days + nights),
        guests,
    }
}

#[tokio::test]
async fn test_cannot_book_own_listing() {
    let host_id = Uuid::new_v4();
    let listing_id = Uuid::new_v4();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));

    let service = manager(MockPersistence::new().with_listings(listings), quiet_mailer());
    let result = service.create(host_id, request(listing_id, 10, 3, 2)).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_cannot_book_unpublished_listing() {
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().returning(|id| {
        let mut listing = common::listing(id, Uuid::new_v4());
        listing.is_published = false;
        Ok(Some(listing))
    });

    let service = manager(MockPersistence::new().with_listings(listings), quiet_mailer());
    let result = service
        .create(Uuid::new_v4(), request(Uuid::new_v4(), 10, 3, 2))
        .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_guest_count_is_capped_by_listing() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));

    let service = manager(MockPersistence::new().with_listings(listings), quiet_mailer());
    let result = service
        .create(Uuid::new_v4(), request(Uuid::new_v4(), 10, 3, 9))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_overlapping_booking_is_a_conflict() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    let mut bookings = MockBookingRepository::new();
    bookings.expect_has_overlap().returning(|_, _, _| Ok(true));
    bookings.expect_create().never();

    let service = manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_bookings(bookings),
        quiet_mailer(),
    );
    let result = service
        .create(Uuid::new_v4(), request(Uuid::new_v4(), 10, 3, 2))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_booking_snapshots_price_and_notifies_host() {
    let host_id = Uuid::new_v4();
    let guest_id = Uuid::new_v4();
    let listing_id = Uuid::new_v4();

    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    let mut bookings = MockBookingRepository::new();
    bookings.expect_has_overlap().returning(|_, _, _| Ok(false));
    bookings
        .expect_create()
        .withf(move |b| {
            b.host_id == host_id
                && b.quote.nights == 3
                && b.quote.subtotal_cents == 30_000
                && b.quote.total_cents == 32_500
        })
        .times(1)
        .returning(|b| {
            Ok(common::booking(
                Uuid::new_v4(),
                b.guest_id,
                b.host_id,
                b.check_in,
                b.check_out,
                BookingStatus::Pending,
            ))
        });
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == host_id && n.kind == NotificationKind::BookingRequested)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));
    let mut mailer = MockEmailDispatcher::new();
    mailer.expect_dispatch().times(1).returning(|_| Ok(()));

    let service = manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_bookings(bookings)
            .with_notifications(notifications)
            .with_users(users_found()),
        mailer,
    );
    let booking = service
        .create(guest_id, request(listing_id, 10, 3, 2))
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_cents, 32_500);
}

#[tokio::test]
async fn test_stranger_cannot_see_booking() {
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(|id| {
        Ok(Some(common::booking(
            id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            common::days_from_today(5),
            common::days_from_today(8),
            BookingStatus::Pending,
        )))
    });

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let result = service
        .get(Actor::new(Uuid::new_v4(), false), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_guest_cannot_confirm_own_booking() {
    let guest_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            guest_id,
            Uuid::new_v4(),
            common::days_from_today(5),
            common::days_from_today(8),
            BookingStatus::Pending,
        )))
    });

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let result = service
        .update_status(
            Actor::new(guest_id, false),
            Uuid::new_v4(),
            BookingStatus::Confirmed,
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_host_confirms_pending_booking() {
    let host_id = Uuid::new_v4();
    let guest_id = Uuid::new_v4();
    let pending = common::booking(
        Uuid::new_v4(),
        guest_id,
        host_id,
        common::days_from_today(5),
        common::days_from_today(8),
        BookingStatus::Pending,
    );
    let stored = pending.clone();

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    bookings
        .expect_update_status()
        .withf(|_, from, to| *from == BookingStatus::Pending && *to == BookingStatus::Confirmed)
        .times(1)
        .returning(move |_, _, status| {
            let mut updated = pending.clone();
            updated.status = status;
            Ok(updated)
        });
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == guest_id && n.kind == NotificationKind::BookingConfirmed)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));

    let service = manager(
        MockPersistence::new()
            .with_bookings(bookings)
            .with_listings(listings)
            .with_notifications(notifications)
            .with_users(users_found()),
        quiet_mailer(),
    );
    let booking = service
        .update_status(
            Actor::new(host_id, false),
            Uuid::new_v4(),
            BookingStatus::Confirmed,
        )
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_completing_before_checkout_is_rejected() {
    let host_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            Uuid::new_v4(),
            host_id,
            common::days_from_today(-1),
            common::days_from_today(2),
            BookingStatus::Confirmed,
        )))
    });
    bookings.expect_update_status().never();

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let result = service
        .update_status(
            Actor::new(host_id, false),
            Uuid::new_v4(),
            BookingStatus::Completed,
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_status_patch_cannot_cancel() {
    let host_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            Uuid::new_v4(),
            host_id,
            common::days_from_today(5),
            common::days_from_today(8),
            BookingStatus::Confirmed,
        )))
    });

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let result = service
        .update_status(
            Actor::new(host_id, false),
            Uuid::new_v4(),
            BookingStatus::Cancelled,
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_refund_quote_for_late_guest_cancellation() {
    let guest_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            guest_id,
            Uuid::new_v4(),
            common::days_from_today(3),
            common::days_from_today(5),
            BookingStatus::Confirmed,
        )))
    });

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let quote = service
        .refund_quote(Actor::new(guest_id, false), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(quote.days_until_check_in, 3);
    assert_eq!(quote.tier, RefundTier::Minimal);
    assert_eq!(quote.total_cents, 22_500);
    assert_eq!(quote.refund_cents, 2_250);
}

#[tokio::test]
async fn test_host_cancellation_refunds_in_full_and_notifies_guest() {
    let host_id = Uuid::new_v4();
    let guest_id = Uuid::new_v4();
    let confirmed = common::booking(
        Uuid::new_v4(),
        guest_id,
        host_id,
        common::days_from_today(2),
        common::days_from_today(4),
        BookingStatus::Confirmed,
    );
    let stored = confirmed.clone();

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    bookings
        .expect_cancel()
        .withf(move |_, from, record| {
            *from == BookingStatus::Confirmed
                && record.cancelled_by == host_id
                && record.refund_cents == 22_500
        })
        .times(1)
        .returning(move |_, _, record| {
            let mut cancelled = confirmed.clone();
            cancelled.status = BookingStatus::Cancelled;
            cancelled.refund_cents = Some(record.refund_cents);
            cancelled.cancelled_by = Some(record.cancelled_by);
            cancelled.cancelled_at = Some(record.cancelled_at);
            Ok(cancelled)
        });
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == guest_id && n.kind == NotificationKind::BookingCancelled)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));

    let service = manager(
        MockPersistence::new()
            .with_bookings(bookings)
            .with_listings(listings)
            .with_notifications(notifications)
            .with_users(users_found()),
        quiet_mailer(),
    );
    let booking = service
        .cancel(Actor::new(host_id, false), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(booking.refund_cents, Some(22_500));
}

#[tokio::test]
async fn test_completed_booking_cannot_be_cancelled() {
    let guest_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            guest_id,
            Uuid::new_v4(),
            common::days_from_today(-5),
            common::days_from_today(-2),
            BookingStatus::Completed,
        )))
    });
    bookings.expect_cancel().never();

    let service = manager(
        MockPersistence::new()
            .with_bookings(bookings)
            .with_notifications(notifications_accepting()),
        quiet_mailer(),
    );
    let result = service
        .cancel(Actor::new(guest_id, false), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_check_in_in_the_past_is_rejected() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::listing(id, Uuid::new_v4()))));
    let mut bookings = MockBookingRepository::new();
    bookings.expect_create().never();

    let service = manager(
        MockPersistence::new()
            .with_listings(listings)
            .with_bookings(bookings),
        quiet_mailer(),
    );
    let result = service
        .create(Uuid::new_v4(), request(Uuid::new_v4(), -1, 3, 2))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_guest_cancellation_records_tiered_refund() {
    let host_id = Uuid::new_v4();
    let guest_id = Uuid::new_v4();
    // 3 nights: 30_000 + 2_500 cleaning, 10 days out gives the half tier
    let confirmed = common::booking(
        Uuid::new_v4(),
        guest_id,
        host_id,
        common::days_from_today(10),
        common::days_from_today(13),
        BookingStatus::Confirmed,
    );
    let stored = confirmed.clone();

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    bookings
        .expect_cancel()
        .withf(move |_, from, record| {
            *from == BookingStatus::Confirmed
                && record.cancelled_by == guest_id
                && record.refund_cents == 16_250
        })
        .times(1)
        .returning(move |_, _, record| {
            let mut cancelled = confirmed.clone();
            cancelled.status = BookingStatus::Cancelled;
            cancelled.refund_cents = Some(record.refund_cents);
            cancelled.cancelled_by = Some(record.cancelled_by);
            Ok(cancelled)
        });
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == host_id && n.kind == NotificationKind::BookingCancelled)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));

    let service = manager(
        MockPersistence::new()
            .with_bookings(bookings)
            .with_listings(listings)
            .with_notifications(notifications)
            .with_users(users_found()),
        quiet_mailer(),
    );
    let booking = service
        .cancel(Actor::new(guest_id, false), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(booking.refund_cents, Some(16_250));
}

#[tokio::test]
async fn test_admin_cannot_cancel_or_quote() {
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(|id| {
        Ok(Some(common::booking(
            id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            common::days_from_today(10),
            common::days_from_today(12),
            BookingStatus::Confirmed,
        )))
    });
    bookings.expect_cancel().never();

    let service = manager(MockPersistence::new().with_bookings(bookings), quiet_mailer());
    let admin = Actor::new(Uuid::new_v4(), true);

    assert!(matches!(
        service.cancel(admin, Uuid::new_v4()).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        service.refund_quote(admin, Uuid::new_v4()).await,
        Err(AppError::Forbidden)
    ));
}

#[tokio::test]
async fn test_cancel_racing_a_host_decision_is_a_conflict() {
    let guest_id = Uuid::new_v4();
    let host_id = Uuid::new_v4();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().returning(move |id| {
        Ok(Some(common::booking(
            id,
            guest_id,
            host_id,
            common::days_from_today(10),
            common::days_from_today(12),
            BookingStatus::Pending,
        )))
    });
    bookings
        .expect_cancel()
        .withf(|_, from, _| *from == BookingStatus::Pending)
        .returning(|_, _, _| Err(AppError::state_conflict("Booking is already rejected")));
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .returning(move |id| Ok(Some(common::listing(id, host_id))));
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_create().never();

    let service = manager(
        MockPersistence::new()
            .with_bookings(bookings)
            .with_listings(listings)
            .with_notifications(notifications),
        quiet_mailer(),
    );
    let result = service
        .cancel(Actor::new(guest_id, false), Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}
