//! Guest reviews of completed stays.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::listing_service::listing_cache_key;
use super::{today, Actor};
use crate::config::{MAX_RATING, MIN_RATING};
use crate::domain::{BookingStatus, NewNotification, NewReview, NotificationKind, Review};
use crate::errors::{AppError, AppResult};
use crate::infra::cache::evict;
use crate::infra::{CacheStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review a finished stay; one review per booking, by its guest
    async fn create(
        &self,
        author_id: Uuid,
        booking_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review>;

    async fn list_for_listing(
        &self,
        listing_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Paginated<Review>>;

    /// Author or admin
    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct ReviewManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<U: UnitOfWork> ReviewManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewManager<U> {
    async fn create(
        &self,
        author_id: Uuid,
        booking_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let booking = self
            .uow
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if booking.guest_id != author_id {
            return Err(AppError::Forbidden);
        }

        let stay_over = booking.status == BookingStatus::Completed
            || (booking.status == BookingStatus::Confirmed && booking.stay_ended(today()));
        if !stay_over {
            return Err(AppError::validation(
                "Reviews can only be left after the stay has ended",
            ));
        }
        if self.uow.reviews().find_by_booking(booking_id).await?.is_some() {
            return Err(AppError::conflict("Review"));
        }

        let listing_id = booking.listing_id;
        let host_id = booking.host_id;
        let review = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let review = ctx
                        .reviews()
                        .create(NewReview {
                            listing_id,
                            booking_id,
                            author_id,
                            rating,
                            comment: comment.trim().to_string(),
                        })
                        .await?;
                    ctx.notifications()
                        .create(
                            NewNotification::new(
                                host_id,
                                NotificationKind::NewReview,
                                "New review",
                                format!("A guest rated their stay {} out of {}", rating, MAX_RATING),
                            )
                            .with_link(format!("/listings/{}", listing_id)),
                        )
                        .await?;
                    Ok(review)
                })
            })
            .await?;

        evict(self.cache.as_ref(), &listing_cache_key(listing_id)).await;
        Ok(review)
    }

    async fn list_for_listing(
        &self,
        listing_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Paginated<Review>> {
        let (reviews, total) = self
            .uow
            .reviews()
            .list_for_listing(listing_id, params.clone())
            .await?;
        Ok(params.paginate(reviews, total))
    }

    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let review = self
            .uow
            .reviews()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        if review.author_id != actor.id && !actor.is_admin {
            return Err(AppError::Forbidden);
        }

        self.uow.reviews().delete(id).await?;
        evict(self.cache.as_ref(), &listing_cache_key(review.listing_id)).await;
        Ok(())
    }
}
