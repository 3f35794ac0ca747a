//! User service - own profile, password and security settings.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Password, ProfileUpdate, PublicProfile, SecuritySettings, SecurityUpdate, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
///
/// Every operation works on active accounts only.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Profile shown to other users
    async fn public_profile(&self, id: Uuid) -> AppResult<PublicProfile>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// Verify the current password, then store the new one
    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    async fn security_settings(&self, id: Uuid) -> AppResult<SecuritySettings>;

    async fn update_security(&self, id: Uuid, update: SecurityUpdate)
        -> AppResult<SecuritySettings>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn public_profile(&self, id: Uuid) -> AppResult<PublicProfile> {
        self.get_user(id).await.map(PublicProfile::from)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Name is required"));
            }
        }
        self.uow.users().update_profile(id, update).await
    }

    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.get_user(id).await?;

        if !Password::from_hash(user.password_hash).verify(&current_password) {
            return Err(AppError::InvalidCredentials);
        }
        if current_password == new_password {
            return Err(AppError::validation(
                "New password must differ from the current one",
            ));
        }

        let password_hash = Password::new(&new_password)?.into_string();

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.users().update_password(id, password_hash).await?;
                    ctx.security().mark_password_changed(id, Utc::now()).await
                })
            })
            .await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn security_settings(&self, id: Uuid) -> AppResult<SecuritySettings> {
        self.get_user(id).await?;
        self.uow.security().get(id).await
    }

    async fn update_security(
        &self,
        id: Uuid,
        update: SecurityUpdate,
    ) -> AppResult<SecuritySettings> {
        self.get_user(id).await?;
        self.uow.security().update(id, update).await
    }
}
