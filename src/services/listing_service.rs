//! Listing service - search, detail, host CRUD and availability.
//!
//! Listing detail is cached in Redis; every write through this service
//! (and new or removed reviews) evicts the entry.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::{today, Actor};
use crate::config::{CACHE_PREFIX_LISTING, LISTING_CACHE_TTL_SECONDS};
use crate::domain::{
    BookedRange, Listing, ListingDetail, ListingFilter, ListingResponse, ListingUpdate,
    NewListing, RatingSummary,
};
use crate::errors::{AppError, AppResult};
use crate::infra::cache::{evict, read_json, write_json};
use crate::infra::{CacheStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

pub(crate) fn listing_cache_key(id: Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_LISTING, id)
}

#[async_trait]
pub trait ListingService: Send + Sync {
    /// Published listings matching the filter
    async fn search(
        &self,
        filter: ListingFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<ListingResponse>>;

    /// Published listing with its rating summary
    async fn get(&self, id: Uuid) -> AppResult<ListingDetail>;

    /// Hosts (and admins) only
    async fn create(&self, actor: Actor, listing: NewListing) -> AppResult<Listing>;

    /// Owner or admin
    async fn update(&self, actor: Actor, id: Uuid, update: ListingUpdate) -> AppResult<Listing>;

    /// Soft delete; refused while confirmed stays are still ahead
    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    /// Ranges already held by pending or confirmed bookings in `[from, to)`
    async fn availability(
        &self,
        id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<BookedRange>>;

    /// Every listing of a host, drafts included
    async fn host_listings(&self, host_id: Uuid) -> AppResult<Vec<Listing>>;
}

pub struct ListingManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<U: UnitOfWork> ListingManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }

    async fn find_managed(&self, actor: Actor, id: Uuid) -> AppResult<Listing> {
        let listing = self
            .uow
            .listings()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !listing.is_managed_by(actor.id, actor.is_admin) {
            return Err(AppError::Forbidden);
        }
        Ok(listing)
    }
}

fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        return Err(AppError::validation("latitude must be between -90 and 90"));
    }
    if longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        return Err(AppError::validation("longitude must be between -180 and 180"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ListingService for ListingManager<U> {
    async fn search(
        &self,
        filter: ListingFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<ListingResponse>> {
        if let Some((check_in, check_out)) = filter.stay {
            if check_out <= check_in {
                return Err(AppError::validation("check_out must be after check_in"));
            }
        }
        if let (Some(min), Some(max)) = (filter.min_price_cents, filter.max_price_cents) {
            if min > max {
                return Err(AppError::validation(
                    "min_price_cents cannot exceed max_price_cents",
                ));
            }
        }

        let (listings, total) = self.uow.listings().search(filter, params.clone()).await?;
        Ok(params
            .paginate(listings, total)
            .map(ListingResponse::from))
    }

    async fn get(&self, id: Uuid) -> AppResult<ListingDetail> {
        let key = listing_cache_key(id);
        if let Some(detail) = read_json::<ListingDetail>(self.cache.as_ref(), &key).await {
            return Ok(detail);
        }

        let listing = self
            .uow
            .listings()
            .find_by_id(id)
            .await?
            .filter(Listing::is_bookable)
            .ok_or(AppError::NotFound)?;
        let ratings = self.uow.reviews().ratings_for_listing(id).await?;
        let summary = RatingSummary::from_ratings(&ratings);

        let detail = ListingDetail {
            listing: ListingResponse::from(listing),
            average_rating: summary.average,
            review_count: summary.count,
        };
        write_json(self.cache.as_ref(), &key, &detail, LISTING_CACHE_TTL_SECONDS).await;
        Ok(detail)
    }

    async fn create(&self, actor: Actor, listing: NewListing) -> AppResult<Listing> {
        let host = self
            .uow
            .users()
            .find_by_id(actor.id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !host.can_host() {
            return Err(AppError::Forbidden);
        }
        validate_location(listing.latitude, listing.longitude)?;

        let created = self
            .uow
            .listings()
            .create(NewListing {
                host_id: host.id,
                ..listing
            })
            .await?;

        tracing::info!(listing_id = %created.id, host_id = %host.id, "Listing created");
        Ok(created)
    }

    async fn update(&self, actor: Actor, id: Uuid, update: ListingUpdate) -> AppResult<Listing> {
        self.find_managed(actor, id).await?;
        validate_location(update.latitude, update.longitude)?;

        let listing = self.uow.listings().update(id, update).await?;
        evict(self.cache.as_ref(), &listing_cache_key(id)).await;
        Ok(listing)
    }

    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.find_managed(actor, id).await?;

        if self
            .uow
            .bookings()
            .has_upcoming_confirmed(id, today())
            .await?
        {
            return Err(AppError::bad_request(
                "Listing has upcoming confirmed bookings",
            ));
        }

        self.uow.listings().delete(id).await?;
        evict(self.cache.as_ref(), &listing_cache_key(id)).await;

        tracing::info!(listing_id = %id, actor_id = %actor.id, "Listing deleted");
        Ok(())
    }

    async fn availability(
        &self,
        id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<BookedRange>> {
        if to <= from {
            return Err(AppError::validation("to must be after from"));
        }
        self.uow
            .listings()
            .find_by_id(id)
            .await?
            .filter(Listing::is_bookable)
            .ok_or(AppError::NotFound)?;

        self.uow.bookings().booked_ranges(id, from, to).await
    }

    async fn host_listings(&self, host_id: Uuid) -> AppResult<Vec<Listing>> {
        self.uow.listings().list_by_host(host_id).await
    }
}
