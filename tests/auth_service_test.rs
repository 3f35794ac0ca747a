//! Authentication service tests.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use stayhub::config::Config;
use stayhub::domain::{Password, SecuritySettings, User};
use stayhub::errors::AppError;
use stayhub::infra::{MockPersistence, MockSecurityRepository, MockUserRepository};
use stayhub::jobs::MockEmailDispatcher;
use stayhub::services::{AuthService, Authenticator, Claims};

const PASSWORD: &str = "correct-horse-battery";

fn user_with_password(id: Uuid) -> User {
    let mut user = common::user(id);
    user.password_hash = Password::new(PASSWORD).unwrap().into_string();
    user
}

/// Signed session token for `user_id`, issued `issued_ago` in the past
fn token_issued(user_id: Uuid, is_admin: bool, issued_ago: Duration) -> String {
    let issued_at = Utc::now() - issued_ago;
    let claims = Claims {
        sub: user_id,
        email: "guest@example.com".to_string(),
        is_admin,
        exp: (issued_at + Duration::hours(24)).timestamp(),
        iat: issued_at.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(Config::for_tests().jwt_secret_bytes()),
    )
    .unwrap()
}

fn default_security() -> MockSecurityRepository {
    let mut security = MockSecurityRepository::new();
    security
        .expect_get()
        .returning(|user_id| Ok(SecuritySettings::defaults_for(user_id)));
    security
}

fn authenticator(
    uow: MockPersistence,
    mailer: MockEmailDispatcher,
) -> Authenticator<MockPersistence> {
    Authenticator::new(Arc::new(uow), Arc::new(mailer), Config::for_tests())
}

#[tokio::test]
async fn test_register_rejects_reserved_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email_with_deleted()
        .returning(|_| Ok(Some(common::user(Uuid::new_v4()))));
    users.expect_create().never();

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let result = service
        .register("guest@example.com".into(), PASSWORD.into(), "Guest".into())
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_register_hashes_password_and_trims_name() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email_with_deleted()
        .returning(|_| Ok(None));
    users
        .expect_create()
        .withf(|email, hash, name| {
            email == "new@example.com" && hash.starts_with("$argon2") && name == "New Guest"
        })
        .times(1)
        .returning(|email, hash, name| Ok(User::new(Uuid::new_v4(), email, hash, name)));

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let user = service
        .register("new@example.com".into(), PASSWORD.into(), "  New Guest ".into())
        .await
        .unwrap();

    assert_eq!(user.name, "New Guest");
    assert!(!user.is_host);
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(user_with_password(id))));

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let result = service
        .login("guest@example.com".into(), "not-the-password".into())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_with_unknown_email_fails_the_same_way() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let result = service
        .login("nobody@example.com".into(), PASSWORD.into())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_issues_verifiable_token_and_sends_alert() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(move |_| {
        let mut user = user_with_password(id);
        user.is_admin = true;
        Ok(Some(user))
    });
    let mut security = MockSecurityRepository::new();
    security
        .expect_get()
        .returning(|user_id| Ok(SecuritySettings::defaults_for(user_id)));
    let mut mailer = MockEmailDispatcher::new();
    mailer
        .expect_dispatch()
        .withf(|job| job.to == "guest@example.com")
        .times(1)
        .returning(|_| Ok(()));

    let service = authenticator(
        MockPersistence::new()
            .with_users(users)
            .with_security(security),
        mailer,
    );
    let token = service
        .login("guest@example.com".into(), PASSWORD.into())
        .await
        .unwrap();

    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.user.id, id);

    let claims = service.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, id);
    assert!(claims.is_admin);
}

#[tokio::test]
async fn test_login_skips_alert_when_disabled() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(user_with_password(id))));
    let mut security = MockSecurityRepository::new();
    security.expect_get().returning(|user_id| {
        let mut settings = SecuritySettings::defaults_for(user_id);
        settings.login_alerts = false;
        Ok(settings)
    });
    let mut mailer = MockEmailDispatcher::new();
    mailer.expect_dispatch().never();

    let service = authenticator(
        MockPersistence::new()
            .with_users(users)
            .with_security(security),
        mailer,
    );

    assert!(service
        .login("guest@example.com".into(), PASSWORD.into())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_login_survives_mail_queue_failure() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(user_with_password(id))));
    let mut security = MockSecurityRepository::new();
    security
        .expect_get()
        .returning(|user_id| Ok(SecuritySettings::defaults_for(user_id)));
    let mut mailer = MockEmailDispatcher::new();
    mailer
        .expect_dispatch()
        .returning(|_| Err(AppError::internal("queue down")));

    let service = authenticator(
        MockPersistence::new()
            .with_users(users)
            .with_security(security),
        mailer,
    );

    assert!(service
        .login("guest@example.com".into(), PASSWORD.into())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_session_of_deleted_user_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let result = service.session_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[test]
fn test_tampered_token_is_rejected() {
    let service = authenticator(MockPersistence::new(), MockEmailDispatcher::new());
    assert!(service.verify_token("not.a.jwt").is_err());
}

#[tokio::test]
async fn test_authenticate_uses_stored_admin_flag() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));

    let service = authenticator(
        MockPersistence::new()
            .with_users(users)
            .with_security(default_security()),
        MockEmailDispatcher::new(),
    );
    let token = token_issued(id, true, Duration::minutes(5));
    let user = service.authenticate(&token).await.unwrap();

    assert_eq!(user.id, id);
    assert!(!user.is_admin);
}

#[tokio::test]
async fn test_authenticate_rejects_deleted_account() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let service = authenticator(
        MockPersistence::new().with_users(users),
        MockEmailDispatcher::new(),
    );
    let token = token_issued(Uuid::new_v4(), false, Duration::minutes(5));

    assert!(matches!(
        service.authenticate(&token).await,
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_authenticate_rejects_token_older_than_password_change() {
    let id = Uuid::new_v4();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(common::user(id))));
    let mut security = MockSecurityRepository::new();
    security.expect_get().returning(|user_id| {
        let mut settings = SecuritySettings::defaults_for(user_id);
        settings.password_changed_at = Some(Utc::now() - Duration::hours(1));
        Ok(settings)
    });

    let service = authenticator(
        MockPersistence::new()
            .with_users(users)
            .with_security(security),
        MockEmailDispatcher::new(),
    );

    let stale = token_issued(id, false, Duration::hours(2));
    assert!(matches!(
        service.authenticate(&stale).await,
        Err(AppError::Unauthorized)
    ));

    let fresh = token_issued(id, false, Duration::minutes(30));
    assert!(service.authenticate(&fresh).await.is_ok());
}
