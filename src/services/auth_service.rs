//! Authentication service - registration, login and session tokens.
//!
//! Passwords are hashed through the domain `Password` value object.
//! Sessions are stateless JWTs, returned in the body and set as a cookie
//! by the handler.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::jobs::{dispatch_quietly, EmailDispatcher, EmailJob};

/// Verified against when the email is unknown, so both failure paths
/// spend the same Argon2 work.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c3RheWh1YmR1bW15c2FsdA$2cJ3pVv0rKZ7XoGk3u1rJ8qYw0tQy9xgkYk6r2m1d1Q";

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    /// Admin flag at sign-in time; requests use the stored flag instead
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    /// The signed-in account
    pub user: UserResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new guest account
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Check credentials and issue a session token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Load the account behind a verified session
    async fn session_user(&self, user_id: Uuid) -> AppResult<User>;

    /// Resolve a session token to the live account behind it.
    ///
    /// Fails for deleted accounts and for tokens issued before the last
    /// password change.
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        user: UserResponse::from(user.clone()),
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn EmailDispatcher>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, mailer: Arc<dyn EmailDispatcher>, config: Config) -> Self {
        Self {
            uow,
            mailer,
            config,
        }
    }

    async fn send_login_alert(&self, user: &User) {
        match self.uow.security().get(user.id).await {
            Ok(settings) if settings.login_alerts => {
                let job = EmailJob::login_alert(&user.email, &user.name, Utc::now());
                dispatch_quietly(self.mailer.as_ref(), job).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Skipping login alert");
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        // Soft-deleted accounts keep their email reserved
        if self
            .uow
            .users()
            .find_by_email_with_deleted(&email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(email, password_hash, name.trim().to_string())
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&email).await?;

        let stored = Password::from_hash(
            user.as_ref()
                .map(|u| u.password_hash.clone())
                .unwrap_or_else(|| DUMMY_HASH.to_string()),
        );
        let password_valid = stored.verify(&password);

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = generate_token(&user, &self.config)?;
        tracing::info!(user_id = %user.id, "User logged in");

        self.send_login_alert(&user).await;
        Ok(token)
    }

    async fn session_user(&self, user_id: Uuid) -> AppResult<User> {
        // Deleted accounts lose their session immediately
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;
        let user = self.session_user(claims.sub).await?;

        let security = self.uow.security().get(user.id).await?;
        if security
            .password_changed_at
            .is_some_and(|changed| claims.iat < changed.timestamp())
        {
            tracing::debug!(user_id = %user.id, "Rejecting token issued before password change");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
