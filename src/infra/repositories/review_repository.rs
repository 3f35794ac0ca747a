//! Review repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::base::{fetch_page, DbHandle};
use super::entities::review::{self, ActiveModel, Entity as ReviewEntity};
use crate::domain::{NewReview, Review};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Review>>;

    async fn create(&self, review: NewReview) -> AppResult<Review>;

    /// Reviews of a listing, newest first
    async fn list_for_listing(
        &self,
        listing_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)>;

    /// Every rating given to a listing
    async fn ratings_for_listing(&self, listing_id: Uuid) -> AppResult<Vec<i32>>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct ReviewStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> ReviewStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> ReviewRepository for ReviewStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let model = ReviewEntity::find_by_id(id).one(self.db.conn()).await?;
        Ok(model.map(Review::from))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Review>> {
        let model = ReviewEntity::find()
            .filter(review::Column::BookingId.eq(booking_id))
            .one(self.db.conn())
            .await?;
        Ok(model.map(Review::from))
    }

    async fn create(&self, new: NewReview) -> AppResult<Review> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(new.listing_id),
            booking_id: Set(new.booking_id),
            author_id: Set(new.author_id),
            rating: Set(new.rating),
            comment: Set(new.comment),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(Review::from(model))
    }

    async fn list_for_listing(
        &self,
        listing_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)> {
        let query = ReviewEntity::find()
            .filter(review::Column::ListingId.eq(listing_id))
            .order_by_desc(review::Column::CreatedAt);

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(Review::from).collect(), total))
    }

    async fn ratings_for_listing(&self, listing_id: Uuid) -> AppResult<Vec<i32>> {
        let ratings: Vec<i32> = ReviewEntity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::ListingId.eq(listing_id))
            .into_tuple()
            .all(self.db.conn())
            .await?;
        Ok(ratings)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ReviewEntity::delete_by_id(id).exec(self.db.conn()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
