//! Booking domain entity, pricing and status transitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::MAX_BOOKING_NIGHTS;
use crate::errors::{AppError, AppResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Statuses that hold the listing's calendar
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    /// Statuses that count as earned revenue
    pub const REVENUE: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Completed];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Whether the status machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (*self, next),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }
}

impl From<&str> for BookingStatus {
    fn from(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "rejected" => BookingStatus::Rejected,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Pending,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub total_cents: i64,
    pub status: BookingStatus,
    pub refund_cents: Option<i64>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Guest, host or admin may see the booking
    pub fn is_visible_to(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.guest_id == user_id || self.host_id == user_id
    }

    /// The stay has ended on or before `today`
    pub fn stay_ended(&self, today: NaiveDate) -> bool {
        self.check_out <= today
    }

    /// The other party of the booking from `user_id`'s point of view
    pub fn counterpart_of(&self, user_id: Uuid) -> Uuid {
        if user_id == self.host_id {
            self.guest_id
        } else {
            self.host_id
        }
    }
}

/// Data required to persist a booking
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub quote: PriceQuote,
}

/// Cancellation outcome written back to a booking
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationRecord {
    pub cancelled_by: Uuid,
    pub refund_cents: i64,
    pub cancelled_at: DateTime<Utc>,
}

/// Price breakdown for a stay, snapshotted on the booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceQuote {
    pub nights: i64,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

/// Validate a stay and compute its price.
///
/// `check_out` must be after `check_in` and the stay at most
/// `MAX_BOOKING_NIGHTS` long.
pub fn quote_stay(
    check_in: NaiveDate,
    check_out: NaiveDate,
    nightly_price_cents: i64,
    cleaning_fee_cents: i64,
) -> AppResult<PriceQuote> {
    let nights = (check_out - check_in).num_days();
    if nights < 1 {
        return Err(AppError::validation("Check-out must be after check-in"));
    }
    if nights > MAX_BOOKING_NIGHTS {
        return Err(AppError::validation(format!(
            "A booking cannot exceed {} nights",
            MAX_BOOKING_NIGHTS
        )));
    }

    let subtotal_cents = nightly_price_cents
        .checked_mul(nights)
        .ok_or_else(|| AppError::validation("Booking total is too large"))?;
    let total_cents = subtotal_cents
        .checked_add(cleaning_fee_cents)
        .ok_or_else(|| AppError::validation("Booking total is too large"))?;

    Ok(PriceQuote {
        nights,
        nightly_price_cents,
        cleaning_fee_cents,
        subtotal_cents,
        total_cents,
    })
}

/// Half-open date ranges `[a_in, a_out)` and `[b_in, b_out)` intersect
pub fn ranges_overlap(
    a_in: NaiveDate,
    a_out: NaiveDate,
    b_in: NaiveDate,
    b_out: NaiveDate,
) -> bool {
    a_in < b_out && b_in < a_out
}

/// Booking response returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    #[schema(example = "2026-07-01")]
    pub check_in: NaiveDate,
    #[schema(example = "2026-07-05")]
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: i32,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub total_cents: i64,
    pub status: BookingStatus,
    pub refund_cents: Option<i64>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            nights: booking.nights(),
            id: booking.id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            host_id: booking.host_id,
            check_in: booking.check_in,
            check_out: booking.check_out,
            guests: booking.guests,
            nightly_price_cents: booking.nightly_price_cents,
            cleaning_fee_cents: booking.cleaning_fee_cents,
            total_cents: booking.total_cents,
            status: booking.status,
            refund_cents: booking.refund_cents,
            cancelled_by: booking.cancelled_by,
            cancelled_at: booking.cancelled_at,
            created_at: booking.created_at,
        }
    }
}
