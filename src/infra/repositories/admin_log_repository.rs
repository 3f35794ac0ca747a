//! Append-only audit log of admin actions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::base::{fetch_page, DbHandle};
use super::entities::admin_log::{self, ActiveModel, Entity as AdminLogEntity};
use crate::domain::{AdminLog, NewAdminLog};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminLogRepository: Send + Sync {
    async fn append(&self, entry: NewAdminLog) -> AppResult<AdminLog>;

    /// Log entries, newest first, optionally for one admin
    async fn list(
        &self,
        admin_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<(Vec<AdminLog>, u64)>;
}

pub struct AdminLogStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> AdminLogStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> AdminLogRepository for AdminLogStore<H> {
    async fn append(&self, entry: NewAdminLog) -> AppResult<AdminLog> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            admin_id: Set(entry.admin_id),
            action: Set(entry.action),
            target_type: Set(entry.target_type),
            target_id: Set(entry.target_id),
            details: Set(entry.details),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(AdminLog::from(model))
    }

    async fn list(
        &self,
        admin_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<(Vec<AdminLog>, u64)> {
        let mut query = AdminLogEntity::find().order_by_desc(admin_log::Column::CreatedAt);
        if let Some(admin_id) = admin_id {
            query = query.filter(admin_log::Column::AdminId.eq(admin_id));
        }

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(AdminLog::from).collect(), total))
    }
}
