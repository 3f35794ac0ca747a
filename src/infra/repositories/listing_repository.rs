//! Listing repository with search and soft delete.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{contains_pattern, fetch_page, DbHandle};
use super::entities::booking;
use super::entities::listing::{self, ActiveModel, Entity as ListingEntity};
use crate::domain::{BookingStatus, Listing, ListingFilter, ListingUpdate, NewListing};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Listing repository trait for dependency injection.
///
/// Soft-deleted listings are never returned.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>>;

    /// Published listings matching `filter`, newest first
    async fn search(
        &self,
        filter: ListingFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Listing>, u64)>;

    /// Every listing of a host, published or not
    async fn list_by_host(&self, host_id: Uuid) -> AppResult<Vec<Listing>>;

    /// Listings with the given ids, in no particular order
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Listing>>;

    async fn create(&self, listing: NewListing) -> AppResult<Listing>;

    async fn update(&self, id: Uuid, update: ListingUpdate) -> AppResult<Listing>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;
}

pub struct ListingStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> ListingStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }

    async fn find_active_model(&self, id: Uuid) -> AppResult<listing::Model> {
        ListingEntity::find_by_id(id)
            .filter(listing::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)
    }
}

fn lower_like(column: listing::Column, term: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(contains_pattern(term))
}

fn search_condition(filter: &ListingFilter) -> Condition {
    let mut condition = Condition::all()
        .add(listing::Column::DeletedAt.is_null())
        .add(listing::Column::IsPublished.eq(true));

    if let Some(term) = filter.location.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(lower_like(listing::Column::City, term))
                .add(lower_like(listing::Column::Country, term))
                .add(lower_like(listing::Column::Title, term)),
        );
    }
    if let Some(guests) = filter.guests {
        condition = condition.add(listing::Column::MaxGuests.gte(guests));
    }
    if let Some(min) = filter.min_price_cents {
        condition = condition.add(listing::Column::NightlyPriceCents.gte(min));
    }
    if let Some(max) = filter.max_price_cents {
        condition = condition.add(listing::Column::NightlyPriceCents.lte(max));
    }
    if let Some(kind) = filter.property_type {
        condition = condition.add(listing::Column::PropertyType.eq(kind.as_str()));
    }
    if let Some((check_in, check_out)) = filter.stay {
        let blocking: Vec<&str> = BookingStatus::BLOCKING.iter().map(|s| s.as_str()).collect();
        let taken = Query::select()
            .column(booking::Column::ListingId)
            .from(booking::Entity)
            .and_where(booking::Column::Status.is_in(blocking))
            .and_where(booking::Column::CheckIn.lt(check_out))
            .and_where(booking::Column::CheckOut.gt(check_in))
            .to_owned();
        condition = condition.add(listing::Column::Id.not_in_subquery(taken));
    }

    condition
}

#[async_trait]
impl<H: DbHandle> ListingRepository for ListingStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let model = ListingEntity::find_by_id(id)
            .filter(listing::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await?;

        Ok(model.map(Listing::from))
    }

    async fn search(
        &self,
        filter: ListingFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Listing>, u64)> {
        let query = ListingEntity::find()
            .filter(search_condition(&filter))
            .order_by_desc(listing::Column::CreatedAt);

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(Listing::from).collect(), total))
    }

    async fn list_by_host(&self, host_id: Uuid) -> AppResult<Vec<Listing>> {
        let models = ListingEntity::find()
            .filter(listing::Column::HostId.eq(host_id))
            .filter(listing::Column::DeletedAt.is_null())
            .order_by_desc(listing::Column::CreatedAt)
            .all(self.db.conn())
            .await?;

        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = ListingEntity::find()
            .filter(listing::Column::Id.is_in(ids))
            .filter(listing::Column::DeletedAt.is_null())
            .all(self.db.conn())
            .await?;

        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn create(&self, new: NewListing) -> AppResult<Listing> {
        let now = Utc::now();
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            host_id: Set(new.host_id),
            title: Set(new.title),
            description: Set(new.description),
            property_type: Set(new.property_type.as_str().to_string()),
            address: Set(new.address),
            city: Set(new.city),
            country: Set(new.country),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            nightly_price_cents: Set(new.nightly_price_cents),
            cleaning_fee_cents: Set(new.cleaning_fee_cents),
            max_guests: Set(new.max_guests),
            bedrooms: Set(new.bedrooms),
            bathrooms: Set(new.bathrooms),
            amenities: Set(serde_json::json!(new.amenities)),
            image_urls: Set(serde_json::json!(new.image_urls)),
            is_published: Set(new.is_published),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(Listing::from(model))
    }

    async fn update(&self, id: Uuid, update: ListingUpdate) -> AppResult<Listing> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();

        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(kind) = update.property_type {
            active.property_type = Set(kind.as_str().to_string());
        }
        if let Some(address) = update.address {
            active.address = Set(address);
        }
        if let Some(city) = update.city {
            active.city = Set(city);
        }
        if let Some(country) = update.country {
            active.country = Set(country);
        }
        if update.latitude.is_some() {
            active.latitude = Set(update.latitude);
        }
        if update.longitude.is_some() {
            active.longitude = Set(update.longitude);
        }
        if let Some(price) = update.nightly_price_cents {
            active.nightly_price_cents = Set(price);
        }
        if let Some(fee) = update.cleaning_fee_cents {
            active.cleaning_fee_cents = Set(fee);
        }
        if let Some(max_guests) = update.max_guests {
            active.max_guests = Set(max_guests);
        }
        if let Some(bedrooms) = update.bedrooms {
            active.bedrooms = Set(bedrooms);
        }
        if let Some(bathrooms) = update.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if let Some(amenities) = update.amenities {
            active.amenities = Set(serde_json::json!(amenities));
        }
        if let Some(image_urls) = update.image_urls {
            active.image_urls = Set(serde_json::json!(image_urls));
        }
        if let Some(is_published) = update.is_published {
            active.is_published = Set(is_published);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.conn()).await?;
        Ok(Listing::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_active_model(id).await?.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.is_published = Set(false);
        active.updated_at = Set(now);
        active.update(self.db.conn()).await?;
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(ListingEntity::find()
            .filter(listing::Column::DeletedAt.is_null())
            .count(self.db.conn())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn search_sql(filter: &ListingFilter) -> String {
        ListingEntity::find()
            .filter(search_condition(filter))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_location_wildcards_are_literal() {
        let sql = search_sql(&ListingFilter {
            location: Some("100%_Lisbon".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("ESCAPE"), "{}", sql);
        assert!(!sql.contains("'%100%_lisbon%'"), "{}", sql);
    }

    #[test]
    fn test_only_published_live_listings_match() {
        let sql = search_sql(&ListingFilter::default());
        assert!(sql.contains(r#""deleted_at" IS NULL"#), "{}", sql);
        assert!(sql.contains(r#""is_published" = TRUE"#), "{}", sql);
    }
}
