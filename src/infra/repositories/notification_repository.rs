//! Notification repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{fetch_page, DbHandle};
use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use crate::domain::{NewNotification, Notification};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> AppResult<Notification>;

    /// A user's notifications, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<(Vec<Notification>, u64)>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64>;

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>>;

    async fn mark_read(&self, id: Uuid) -> AppResult<Notification>;

    /// Returns the number of notifications flipped to read
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct NotificationStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> NotificationStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> NotificationRepository for NotificationStore<H> {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            kind: Set(new.kind.as_str().to_string()),
            title: Set(new.title),
            body: Set(new.body),
            link: Set(new.link),
            read_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(Notification::from(model))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<(Vec<Notification>, u64)> {
        let mut query = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt);
        if unread_only {
            query = query.filter(notification::Column::ReadAt.is_null());
        }

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(Notification::from).collect(), total))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .count(self.db.conn())
            .await?)
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        let model = NotificationEntity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(self.db.conn())
            .await?;
        Ok(model.map(Notification::from))
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        let model = NotificationEntity::find_by_id(id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;

        if model.read_at.is_some() {
            return Ok(Notification::from(model));
        }

        let mut active: ActiveModel = model.into();
        active.read_at = Set(Some(Utc::now()));
        let model = active.update(self.db.conn()).await?;
        Ok(Notification::from(model))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(notification::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = NotificationEntity::delete_by_id(id)
            .exec(self.db.conn())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
