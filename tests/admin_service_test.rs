//! Admin console tests: stats, analytics caching, moderation guards, audit logging and backups.

mod common;

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use uuid::Uuid;

use stayhub::config::ANALYTICS_CACHE_TTL_SECONDS;
use stayhub::domain::analytics::build_report;
use stayhub::domain::{AnalyticsRange, BucketCount, BucketUnit, PrivilegeUpdate};
use stayhub::errors::AppError;
use stayhub::infra::{
    BackupFile, MockAdminLogRepository, MockBackupStorage, MockBookingRepository,
    MockCacheStore, MockHostRequestRepository, MockListingRepository, MockPersistence,
    MockUserRepository,
};
use stayhub::services::{AdminConsole, AdminService};

fn console(uow: MockPersistence, backups: MockBackupStorage) -> AdminConsole<MockPersistence> {
    AdminConsole::new(
        Arc::new(uow),
        Arc::new(MockCacheStore::new()),
        Arc::new(backups),
    )
}

fn console_with_cache(uow: MockPersistence, cache: MockCacheStore) -> AdminConsole<MockPersistence> {
    AdminConsole::new(
        Arc::new(uow),
        Arc::new(cache),
        Arc::new(MockBackupStorage::new()),
    )
}

fn logs_expecting(action: &'static str) -> MockAdminLogRepository {
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append()
        .withf(move |entry| entry.action == action)
        .times(1)
        .returning(|entry| Ok(common::admin_log(entry)));
    logs
}

#[tokio::test]
async fn test_admin_cannot_revoke_own_admin_access() {
    let admin_id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users.expect_set_privileges().never();

    let result = console(MockPersistence::new().with_users(users), MockBackupStorage::new())
        .update_user(
            admin_id,
            admin_id,
            PrivilegeUpdate {
                is_admin: Some(false),
                is_host: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_privilege_change_is_logged() {
    let target = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_set_privileges()
        .withf(move |id, update| *id == target && update.is_admin == Some(true))
        .times(1)
        .returning(|id, _| {
            let mut user = common::user(id);
            user.is_admin = true;
            Ok(user)
        });

    let user = console(
        MockPersistence::new()
            .with_users(users)
            .with_admin_logs(logs_expecting("user.update")),
        MockBackupStorage::new(),
    )
    .update_user(
        Uuid::new_v4(),
        target,
        PrivilegeUpdate {
            is_admin: Some(true),
            is_host: None,
        },
    )
    .await
    .unwrap();

    assert!(user.is_admin);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let admin_id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users.expect_delete().never();

    let result = console(MockPersistence::new().with_users(users), MockBackupStorage::new())
        .delete_user(admin_id, admin_id)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_delete_user_soft_deletes_and_logs() {
    let target = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));
    users
        .expect_delete()
        .withf(move |id| *id == target)
        .times(1)
        .returning(|_| Ok(()));

    console(
        MockPersistence::new()
            .with_users(users)
            .with_admin_logs(logs_expecting("user.delete")),
        MockBackupStorage::new(),
    )
    .delete_user(Uuid::new_v4(), target)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    users.expect_delete().never();
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append().never();

    let result = console(
        MockPersistence::new().with_users(users).with_admin_logs(logs),
        MockBackupStorage::new(),
    )
    .delete_user(Uuid::new_v4(), Uuid::new_v4())
    .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_restore_user_is_logged() {
    let mut users = MockUserRepository::new();
    users
        .expect_restore()
        .times(1)
        .returning(|id| Ok(common::user(id)));

    let user = console(
        MockPersistence::new()
            .with_users(users)
            .with_admin_logs(logs_expecting("user.restore")),
        MockBackupStorage::new(),
    )
    .restore_user(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap();

    assert!(user.deleted_at.is_none());
}

#[tokio::test]
async fn test_create_backup_is_logged() {
    let mut backups = MockBackupStorage::new();
    backups.expect_create().times(1).returning(|| {
        Ok(BackupFile {
            file_name: "stayhub-backup-20260101T020000Z.sql".to_string(),
            size_bytes: 2048,
            created_at: Utc::now(),
        })
    });

    let backup = console(
        MockPersistence::new().with_admin_logs(logs_expecting("backup.create")),
        backups,
    )
    .create_backup(Uuid::new_v4())
    .await
    .unwrap();

    assert_eq!(backup.size_bytes, 2048);
}

#[tokio::test]
async fn test_failed_backup_is_not_logged() {
    let mut backups = MockBackupStorage::new();
    backups
        .expect_create()
        .returning(|| Err(AppError::internal("pg_dump exited with status 1")));
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append().never();

    let result = console(MockPersistence::new().with_admin_logs(logs), backups)
        .create_backup(Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn test_stats_gathers_platform_totals() {
    let mut users = MockUserRepository::new();
    users
        .expect_count()
        .withf(|hosts_only| !*hosts_only)
        .returning(|_| Ok(42));
    users
        .expect_count()
        .withf(|hosts_only| *hosts_only)
        .returning(|_| Ok(6));
    let mut listings = MockListingRepository::new();
    listings.expect_count().returning(|| Ok(11));
    let mut bookings = MockBookingRepository::new();
    bookings.expect_count().returning(|| Ok(25));
    bookings.expect_revenue_total().returning(|| Ok(312_500));
    let mut host_requests = MockHostRequestRepository::new();
    host_requests.expect_count_pending().returning(|| Ok(3));

    let uow = MockPersistence::new()
        .with_users(users)
        .with_listings(listings)
        .with_bookings(bookings)
        .with_host_requests(host_requests);
    let stats = console(uow, MockBackupStorage::new()).stats().await.unwrap();

    assert_eq!(stats.users, 42);
    assert_eq!(stats.hosts, 6);
    assert_eq!(stats.listings, 11);
    assert_eq!(stats.bookings, 25);
    assert_eq!(stats.pending_host_requests, 3);
    assert_eq!(stats.revenue_cents, 312_500);
}

#[tokio::test]
async fn test_analytics_served_from_cache_skips_queries() {
    let today = common::today();
    let cached = build_report(
        AnalyticsRange::Week,
        today,
        &[BucketCount { bucket: today, value: 4 }],
        &[],
        &[],
    );
    let json = serde_json::to_string(&cached).unwrap();

    let mut cache = MockCacheStore::new();
    cache
        .expect_get_raw()
        .withf(|key| key == "analytics:7d")
        .returning(move |_| Ok(Some(json.clone())));
    cache.expect_set_raw().never();
    let mut users = MockUserRepository::new();
    users.expect_signups_by_bucket().never();

    let report = console_with_cache(MockPersistence::new().with_users(users), cache)
        .analytics(AnalyticsRange::Week)
        .await
        .unwrap();

    assert_eq!(report, cached);
}

#[tokio::test]
async fn test_analytics_miss_queries_daily_buckets_and_caches() {
    let today = common::today();
    let since = today - Duration::days(6);

    let mut cache = MockCacheStore::new();
    cache.expect_get_raw().returning(|_| Ok(None));
    cache
        .expect_set_raw()
        .withf(|key, _, ttl| key == "analytics:7d" && *ttl == ANALYTICS_CACHE_TTL_SECONDS)
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut users = MockUserRepository::new();
    users
        .expect_signups_by_bucket()
        .withf(move |unit, from| *unit == BucketUnit::Day && *from == since)
        .times(1)
        .returning(move |_, _| Ok(vec![BucketCount { bucket: today, value: 2 }]));
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_bookings_by_bucket()
        .withf(move |unit, from| *unit == BucketUnit::Day && *from == since)
        .returning(move |_, _| Ok(vec![BucketCount { bucket: since, value: 1 }]));
    bookings
        .expect_revenue_by_bucket()
        .withf(move |unit, from| *unit == BucketUnit::Day && *from == since)
        .returning(move |_, _| Ok(vec![BucketCount { bucket: since, value: 32_500 }]));

    let uow = MockPersistence::new().with_users(users).with_bookings(bookings);
    let report = console_with_cache(uow, cache)
        .analytics(AnalyticsRange::Week)
        .await
        .unwrap();

    assert_eq!(report.series.len(), 7);
    assert_eq!(report.series[0].bucket, since);
    assert_eq!(report.series[0].new_bookings, 1);
    assert_eq!(report.series[6].new_users, 2);
    assert_eq!(report.total_revenue_cents, 32_500);
}

#[tokio::test]
async fn test_yearly_analytics_queries_monthly_buckets() {
    let mut cache = MockCacheStore::new();
    cache.expect_get_raw().returning(|_| Ok(None));
    cache
        .expect_set_raw()
        .withf(|key, _, _| key == "analytics:12m")
        .returning(|_, _, _| Ok(()));

    let monthly = |unit: &BucketUnit, from: &chrono::NaiveDate| {
        *unit == BucketUnit::Month && from.day() == 1
    };
    let mut users = MockUserRepository::new();
    users
        .expect_signups_by_bucket()
        .withf(monthly)
        .returning(|_, _| Ok(vec![]));
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_bookings_by_bucket()
        .withf(monthly)
        .returning(|_, _| Ok(vec![]));
    bookings
        .expect_revenue_by_bucket()
        .withf(monthly)
        .returning(|_, _| Ok(vec![]));

    let uow = MockPersistence::new().with_users(users).with_bookings(bookings);
    let report = console_with_cache(uow, cache)
        .analytics(AnalyticsRange::Year)
        .await
        .unwrap();

    assert_eq!(report.unit, BucketUnit::Month);
    assert_eq!(report.series.len(), 12);
    assert_eq!(report.total_new_users, 0);
}
