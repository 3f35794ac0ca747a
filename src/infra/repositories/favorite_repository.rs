//! Favorite listings of a user.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::DbHandle;
use super::entities::favorite::{self, ActiveModel, Entity as FavoriteEntity};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn exists(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool>;

    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()>;

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()>;

    /// Favorited listing ids, most recent first
    async fn listing_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;
}

pub struct FavoriteStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> FavoriteStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> FavoriteRepository for FavoriteStore<H> {
    async fn exists(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool> {
        let found = FavoriteEntity::find_by_id((user_id, listing_id))
            .one(self.db.conn())
            .await?;
        Ok(found.is_some())
    }

    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        ActiveModel {
            user_id: Set(user_id),
            listing_id: Set(listing_id),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.conn())
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        FavoriteEntity::delete_by_id((user_id, listing_id))
            .exec(self.db.conn())
            .await?;
        Ok(())
    }

    async fn listing_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = FavoriteEntity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(self.db.conn())
            .await?;

        Ok(rows.into_iter().map(|f| f.listing_id).collect())
    }
}
