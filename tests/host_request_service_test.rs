//! Host onboarding tests: applications and admin decisions.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use stayhub::domain::{HostRequestDecision, HostRequestStatus, NotificationKind};
use stayhub::errors::AppError;
use stayhub::infra::{
    MockAdminLogRepository, MockHostRequestRepository, MockNotificationRepository,
    MockPersistence, MockUserRepository,
};
use stayhub::services::{HostRequestManager, HostRequestService};

fn manager(uow: MockPersistence) -> HostRequestManager<MockPersistence> {
    HostRequestManager::new(Arc::new(uow))
}

fn guest_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));
    users
}

#[tokio::test]
async fn test_apply_trims_message() {
    let user_id = Uuid::new_v4();
    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_pending_for_user().returning(|_| Ok(None));
    requests
        .expect_create()
        .withf(|_, message| message == "I have a flat in Porto")
        .times(1)
        .returning(|user_id, _| {
            Ok(common::host_request(
                Uuid::new_v4(),
                user_id,
                HostRequestStatus::Pending,
            ))
        });

    let request = manager(
        MockPersistence::new()
            .with_users(guest_users())
            .with_host_requests(requests),
    )
    .apply(user_id, "  I have a flat in Porto\n".to_string())
    .await
    .unwrap();

    assert_eq!(request.user_id, user_id);
    assert!(request.is_pending());
}

#[tokio::test]
async fn test_existing_host_cannot_apply() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::host(id))));

    let result = manager(MockPersistence::new().with_users(users))
        .apply(Uuid::new_v4(), "again".to_string())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_second_pending_application_conflicts() {
    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_pending_for_user().returning(|user_id| {
        Ok(Some(common::host_request(
            Uuid::new_v4(),
            user_id,
            HostRequestStatus::Pending,
        )))
    });
    requests.expect_create().never();

    let result = manager(
        MockPersistence::new()
            .with_users(guest_users())
            .with_host_requests(requests),
    )
    .apply(Uuid::new_v4(), "please".to_string())
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_approval_grants_host_and_is_logged() {
    let admin_id = Uuid::new_v4();
    let applicant = Uuid::new_v4();
    let request_id = Uuid::new_v4();

    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_by_id().returning(move |id| {
        Ok(Some(common::host_request(
            id,
            applicant,
            HostRequestStatus::Pending,
        )))
    });
    requests
        .expect_decide()
        .withf(move |id, reviewer, decision| {
            *id == request_id && *reviewer == admin_id && *decision == HostRequestDecision::Approve
        })
        .times(1)
        .returning(move |id, reviewer, _| {
            let mut decided = common::host_request(id, applicant, HostRequestStatus::Approved);
            decided.reviewed_by = Some(reviewer);
            Ok(decided)
        });
    let mut users = MockUserRepository::new();
    users
        .expect_set_privileges()
        .withf(move |id, update| *id == applicant && update.is_host == Some(true))
        .times(1)
        .returning(|id, _| Ok(common::host(id)));
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |n| n.user_id == applicant && n.kind == NotificationKind::HostRequestApproved)
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append()
        .withf(move |entry| {
            entry.action == "host_request.approve" && entry.target_id == Some(request_id)
        })
        .times(1)
        .returning(|entry| Ok(common::admin_log(entry)));

    let decided = manager(
        MockPersistence::new()
            .with_host_requests(requests)
            .with_users(users)
            .with_notifications(notifications)
            .with_admin_logs(logs),
    )
    .decide(admin_id, request_id, HostRequestDecision::Approve)
    .await
    .unwrap();

    assert_eq!(decided.status, HostRequestStatus::Approved);
    assert_eq!(decided.reviewed_by, Some(admin_id));
}

#[tokio::test]
async fn test_rejection_keeps_guest_role() {
    let applicant = Uuid::new_v4();
    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_by_id().returning(move |id| {
        Ok(Some(common::host_request(
            id,
            applicant,
            HostRequestStatus::Pending,
        )))
    });
    requests.expect_decide().returning(move |id, _, decision| {
        let mut decided = common::host_request(id, applicant, HostRequestStatus::Rejected);
        if let HostRequestDecision::Reject { reason } = decision {
            decided.rejection_reason = reason;
        }
        Ok(decided)
    });
    let mut users = MockUserRepository::new();
    users.expect_set_privileges().never();
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(|n| n.kind == NotificationKind::HostRequestRejected && n.body == "Add photos first")
        .times(1)
        .returning(|n| Ok(common::notification(n.user_id, n.kind)));
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append()
        .withf(|entry| entry.action == "host_request.reject")
        .times(1)
        .returning(|entry| Ok(common::admin_log(entry)));

    let decided = manager(
        MockPersistence::new()
            .with_host_requests(requests)
            .with_users(users)
            .with_notifications(notifications)
            .with_admin_logs(logs),
    )
    .decide(
        Uuid::new_v4(),
        Uuid::new_v4(),
        HostRequestDecision::Reject {
            reason: Some("Add photos first".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(decided.status, HostRequestStatus::Rejected);
    assert_eq!(decided.rejection_reason.as_deref(), Some("Add photos first"));
}

#[tokio::test]
async fn test_decided_request_cannot_be_decided_again() {
    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_by_id().returning(|id| {
        Ok(Some(common::host_request(
            id,
            Uuid::new_v4(),
            HostRequestStatus::Approved,
        )))
    });
    requests.expect_decide().never();

    let result = manager(MockPersistence::new().with_host_requests(requests))
        .decide(Uuid::new_v4(), Uuid::new_v4(), HostRequestDecision::Approve)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_concurrent_decision_is_a_conflict() {
    let mut requests = MockHostRequestRepository::new();
    requests.expect_find_by_id().returning(|id| {
        Ok(Some(common::host_request(
            id,
            Uuid::new_v4(),
            HostRequestStatus::Pending,
        )))
    });
    requests
        .expect_decide()
        .times(1)
        .returning(|_, _, _| Err(AppError::state_conflict("Host request was already rejected")));
    let mut users = MockUserRepository::new();
    users.expect_set_privileges().never();
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_create().never();
    let mut logs = MockAdminLogRepository::new();
    logs.expect_append().never();

    let result = manager(
        MockPersistence::new()
            .with_host_requests(requests)
            .with_users(users)
            .with_notifications(notifications)
            .with_admin_logs(logs),
    )
    .decide(Uuid::new_v4(), Uuid::new_v4(), HostRequestDecision::Approve)
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}
