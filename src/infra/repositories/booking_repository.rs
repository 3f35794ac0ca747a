//! Booking repository: reservations, availability and revenue aggregates.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use super::base::{bucket_counts, fetch_page, DbHandle};
use super::entities::booking::{self, ActiveModel, Entity as BookingEntity};
use crate::domain::{
    BookedRange, Booking, BookingStatus, BucketCount, BucketUnit, CancellationRecord, NewBooking,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;

    /// Whether a pending or confirmed booking of the listing overlaps the stay
    async fn has_overlap(
        &self,
        listing_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool>;

    /// Bookings made by a guest, newest first
    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Booking>, u64)>;

    /// Bookings on a host's listings, newest first
    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<Booking>, u64)>;

    /// Blocking stays of a listing intersecting `[from, to)`
    async fn booked_ranges(
        &self,
        listing_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<BookedRange>>;

    /// Whether a confirmed stay of the listing checks out after `today`
    async fn has_upcoming_confirmed(&self, listing_id: Uuid, today: NaiveDate) -> AppResult<bool>;

    /// Move a booking from `from` to `to`.
    ///
    /// Conflict if the stored status is no longer `from`.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Booking>;

    /// Cancel a booking still in `from`; Conflict otherwise
    async fn cancel(
        &self,
        id: Uuid,
        from: BookingStatus,
        record: CancellationRecord,
    ) -> AppResult<Booking>;

    async fn count(&self) -> AppResult<u64>;

    /// Booked revenue (confirmed and completed) across the platform
    async fn revenue_total(&self) -> AppResult<i64>;

    async fn bookings_by_bucket(&self, unit: BucketUnit, since: NaiveDate)
        -> AppResult<Vec<BucketCount>>;

    async fn revenue_by_bucket(&self, unit: BucketUnit, since: NaiveDate)
        -> AppResult<Vec<BucketCount>>;
}

pub struct BookingStore<H = DatabaseConnection> {
    db: H,
}

impl<H: DbHandle> BookingStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<booking::Model> {
        BookingEntity::find_by_id(id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Fetch the row after a guarded update; zero rows means the status moved
    async fn reload_if_changed(&self, id: Uuid, rows_affected: u64) -> AppResult<Booking> {
        let model = self.find_model(id).await?;
        if rows_affected == 0 {
            return Err(AppError::state_conflict(format!(
                "Booking is already {}",
                model.status
            )));
        }
        Ok(Booking::from(model))
    }
}

fn blocking_statuses() -> Vec<&'static str> {
    BookingStatus::BLOCKING.iter().map(|s| s.as_str()).collect()
}

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    value: i64,
}

const REVENUE_TOTAL_SQL: &str = "SELECT COALESCE(SUM(total_cents), 0)::bigint AS value \
     FROM bookings WHERE status IN ('confirmed', 'completed')";

const BOOKINGS_SQL: &str = "SELECT date_trunc($1, created_at)::date AS bucket, \
     COUNT(*)::bigint AS value \
     FROM bookings WHERE created_at >= $2 \
     GROUP BY 1";

const REVENUE_SQL: &str = "SELECT date_trunc($1, created_at)::date AS bucket, \
     COALESCE(SUM(total_cents), 0)::bigint AS value \
     FROM bookings WHERE created_at >= $2 AND status IN ('confirmed', 'completed') \
     GROUP BY 1";

#[async_trait]
impl<H: DbHandle> BookingRepository for BookingStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let model = BookingEntity::find_by_id(id).one(self.db.conn()).await?;
        Ok(model.map(Booking::from))
    }

    async fn create(&self, new: NewBooking) -> AppResult<Booking> {
        let now = Utc::now();
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(new.listing_id),
            guest_id: Set(new.guest_id),
            host_id: Set(new.host_id),
            check_in: Set(new.check_in),
            check_out: Set(new.check_out),
            guests: Set(new.guests),
            nightly_price_cents: Set(new.quote.nightly_price_cents),
            cleaning_fee_cents: Set(new.quote.cleaning_fee_cents),
            total_cents: Set(new.quote.total_cents),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            refund_cents: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(self.db.conn()).await?;
        Ok(Booking::from(model))
    }

    async fn has_overlap(
        &self,
        listing_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool> {
        let clashes = BookingEntity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .filter(booking::Column::Status.is_in(blocking_statuses()))
            .filter(booking::Column::CheckIn.lt(check_out))
            .filter(booking::Column::CheckOut.gt(check_in))
            .count(self.db.conn())
            .await?;

        Ok(clashes > 0)
    }

    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Booking>, u64)> {
        let query = BookingEntity::find()
            .filter(booking::Column::GuestId.eq(guest_id))
            .order_by_desc(booking::Column::CreatedAt);

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(Booking::from).collect(), total))
    }

    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<Booking>, u64)> {
        let mut query = BookingEntity::find()
            .filter(booking::Column::HostId.eq(host_id))
            .order_by_desc(booking::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        let (models, total) = fetch_page(query, self.db.conn(), &params).await?;
        Ok((models.into_iter().map(Booking::from).collect(), total))
    }

    async fn booked_ranges(
        &self,
        listing_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<BookedRange>> {
        let models = BookingEntity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .filter(booking::Column::Status.is_in(blocking_statuses()))
            .filter(booking::Column::CheckIn.lt(to))
            .filter(booking::Column::CheckOut.gt(from))
            .order_by_asc(booking::Column::CheckIn)
            .all(self.db.conn())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| BookedRange {
                check_in: m.check_in,
                check_out: m.check_out,
            })
            .collect())
    }

    async fn has_upcoming_confirmed(&self, listing_id: Uuid, today: NaiveDate) -> AppResult<bool> {
        let upcoming = BookingEntity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .filter(booking::Column::CheckOut.gt(today))
            .count(self.db.conn())
            .await?;

        Ok(upcoming > 0)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let result = BookingEntity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(self.db.conn())
            .await?;

        self.reload_if_changed(id, result.rows_affected).await
    }

    async fn cancel(
        &self,
        id: Uuid,
        from: BookingStatus,
        record: CancellationRecord,
    ) -> AppResult<Booking> {
        let result = BookingEntity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .col_expr(booking::Column::RefundCents, Expr::value(Some(record.refund_cents)))
            .col_expr(booking::Column::CancelledBy, Expr::value(Some(record.cancelled_by)))
            .col_expr(booking::Column::CancelledAt, Expr::value(Some(record.cancelled_at)))
            .col_expr(booking::Column::UpdatedAt, Expr::value(record.cancelled_at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(self.db.conn())
            .await?;

        self.reload_if_changed(id, result.rows_affected).await
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(BookingEntity::find().count(self.db.conn()).await?)
    }

    async fn revenue_total(&self) -> AppResult<i64> {
        let row = TotalRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            REVENUE_TOTAL_SQL,
        ))
        .one(self.db.conn())
        .await?;

        Ok(row.map(|r| r.value).unwrap_or(0))
    }

    async fn bookings_by_bucket(
        &self,
        unit: BucketUnit,
        since: NaiveDate,
    ) -> AppResult<Vec<BucketCount>> {
        bucket_counts(self.db.conn(), BOOKINGS_SQL, unit, since).await
    }

    async fn revenue_by_bucket(
        &self,
        unit: BucketUnit,
        since: NaiveDate,
    ) -> AppResult<Vec<BucketCount>> {
        bucket_counts(self.db.conn(), REVENUE_SQL, unit, since).await
    }
}
