//! Favorites: a user's saved listings.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Listing;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait FavoriteService: Send + Sync {
    /// Add or remove a listing; returns whether it is now a favorite
    async fn toggle(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool>;

    /// Favorited listings, most recently saved first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Listing>>;
}

pub struct FavoriteManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> FavoriteManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> FavoriteService for FavoriteManager<U> {
    async fn toggle(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool> {
        self.uow
            .listings()
            .find_by_id(listing_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if ctx.favorites().exists(user_id, listing_id).await? {
                        ctx.favorites().remove(user_id, listing_id).await?;
                        Ok(false)
                    } else {
                        ctx.favorites().add(user_id, listing_id).await?;
                        Ok(true)
                    }
                })
            })
            .await
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Listing>> {
        let ids = self.uow.favorites().listing_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<Uuid, Listing> = self
            .uow
            .listings()
            .find_many(ids.clone())
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        // Deleted listings drop out silently
        Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
    }
}
