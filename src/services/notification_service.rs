//! In-app notifications of the signed-in user.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Notification;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Paginated<Notification>>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64>;

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification>;

    /// Returns how many notifications changed
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Other users' notifications look missing
    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
        self.uow
            .notifications()
            .find_for_user(id, user_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Paginated<Notification>> {
        let (notifications, total) = self
            .uow
            .notifications()
            .list_for_user(user_id, unread_only, params.clone())
            .await?;
        Ok(params.paginate(notifications, total))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        self.uow.notifications().unread_count(user_id).await
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
        let notification = self.find_owned(user_id, id).await?;
        if notification.read_at.is_some() {
            return Ok(notification);
        }
        self.uow.notifications().mark_read(id).await
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.uow.notifications().mark_all_read(user_id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.find_owned(user_id, id).await?;
        self.uow.notifications().delete(id).await
    }
}
