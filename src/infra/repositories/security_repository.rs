//! Security settings repository.
//!
//! Rows are created lazily: reads fall back to defaults and writes upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::base::DbHandle;
use super::entities::security_settings::{ActiveModel, Entity as SecurityEntity};
use crate::domain::{SecuritySettings, SecurityUpdate};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SecurityRepository: Send + Sync {
    /// Stored settings, or the defaults if the user never saved any
    async fn get(&self, user_id: Uuid) -> AppResult<SecuritySettings>;

    async fn update(&self, user_id: Uuid, update: SecurityUpdate) -> AppResult<SecuritySettings>;

    async fn mark_password_changed(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

pub struct SecurityStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> SecurityStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }

    async fn save(&self, settings: SecuritySettings, exists: bool) -> AppResult<SecuritySettings> {
        let active = ActiveModel {
            user_id: Set(settings.user_id),
            two_factor_enabled: Set(settings.two_factor_enabled),
            login_alerts: Set(settings.login_alerts),
            password_changed_at: Set(settings.password_changed_at),
            updated_at: Set(Utc::now()),
        };

        let model = if exists {
            active.update(self.db.conn()).await?
        } else {
            active.insert(self.db.conn()).await?
        };
        Ok(SecuritySettings::from(model))
    }

    async fn load(&self, user_id: Uuid) -> AppResult<(SecuritySettings, bool)> {
        let stored = SecurityEntity::find_by_id(user_id).one(self.db.conn()).await?;
        Ok(match stored {
            Some(model) => (SecuritySettings::from(model), true),
            None => (SecuritySettings::defaults_for(user_id), false),
        })
    }
}

#[async_trait]
impl<H: DbHandle> SecurityRepository for SecurityStore<H> {
    async fn get(&self, user_id: Uuid) -> AppResult<SecuritySettings> {
        Ok(self.load(user_id).await?.0)
    }

    async fn update(&self, user_id: Uuid, update: SecurityUpdate) -> AppResult<SecuritySettings> {
        let (mut settings, exists) = self.load(user_id).await?;
        if let Some(two_factor_enabled) = update.two_factor_enabled {
            settings.two_factor_enabled = two_factor_enabled;
        }
        if let Some(login_alerts) = update.login_alerts {
            settings.login_alerts = login_alerts;
        }
        self.save(settings, exists).await
    }

    async fn mark_password_changed(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let (mut settings, exists) = self.load(user_id).await?;
        settings.password_changed_at = Some(at);
        self.save(settings, exists).await?;
        Ok(())
    }
}
