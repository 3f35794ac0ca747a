//! Cancellation refund policy.
//!
//! The refund depends only on how many days remain before check-in:
//!
//! | days before check-in | refund |
//! |----------------------|--------|
//! | 14 or more           | 100%   |
//! | 7 to 13              | 50%    |
//! | 1 to 6               | 10%    |
//! | 0 or past            | 0%     |
//!
//! A booking that was never confirmed, or one cancelled by its host, is
//! always refunded in full.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::booking::{Booking, BookingStatus};
use crate::config::{REFUND_FULL_MIN_DAYS, REFUND_HALF_MIN_DAYS, REFUND_MINIMAL_MIN_DAYS};

/// Refund tier selected by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RefundTier {
    Full,
    Half,
    Minimal,
    None,
}

impl RefundTier {
    pub fn percent(&self) -> i64 {
        match self {
            RefundTier::Full => 100,
            RefundTier::Half => 50,
            RefundTier::Minimal => 10,
            RefundTier::None => 0,
        }
    }

    pub fn for_days_until_check_in(days: i64) -> Self {
        if days >= REFUND_FULL_MIN_DAYS {
            RefundTier::Full
        } else if days >= REFUND_HALF_MIN_DAYS {
            RefundTier::Half
        } else if days >= REFUND_MINIMAL_MIN_DAYS {
            RefundTier::Minimal
        } else {
            RefundTier::None
        }
    }
}

/// Refund preview for a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RefundQuote {
    pub days_until_check_in: i64,
    pub tier: RefundTier,
    pub percent: i64,
    pub total_cents: i64,
    pub refund_cents: i64,
}

/// Compute the refund owed if `booking` were cancelled on `today`.
pub fn refund_quote(booking: &Booking, today: NaiveDate, by_host: bool) -> RefundQuote {
    let days_until_check_in = (booking.check_in - today).num_days();
    let tier = if by_host || booking.status == BookingStatus::Pending {
        RefundTier::Full
    } else {
        RefundTier::for_days_until_check_in(days_until_check_in)
    };
    let percent = tier.percent();

    RefundQuote {
        days_until_check_in,
        tier,
        percent,
        total_cents: booking.total_cents,
        refund_cents: percent_of(booking.total_cents, percent),
    }
}

/// `percent`% of `cents`, rounded down
fn percent_of(cents: i64, percent: i64) -> i64 {
    let scaled = i128::from(cents) * i128::from(percent) / 100;
    // |scaled| <= |cents| so the narrowing cannot fail
    i64::try_from(scaled).unwrap_or(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn confirmed_booking(check_in: NaiveDate, total_cents: i64) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            check_in,
            check_out: check_in + Duration::days(3),
            guests: 2,
            nightly_price_cents: total_cents / 3,
            cleaning_fee_cents: 0,
            total_cents,
            status: BookingStatus::Confirmed,
            refund_cents: None,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RefundTier::for_days_until_check_in(30), RefundTier::Full);
        assert_eq!(RefundTier::for_days_until_check_in(14), RefundTier::Full);
        assert_eq!(RefundTier::for_days_until_check_in(13), RefundTier::Half);
        assert_eq!(RefundTier::for_days_until_check_in(7), RefundTier::Half);
        assert_eq!(RefundTier::for_days_until_check_in(6), RefundTier::Minimal);
        assert_eq!(RefundTier::for_days_until_check_in(1), RefundTier::Minimal);
        assert_eq!(RefundTier::for_days_until_check_in(0), RefundTier::None);
        assert_eq!(RefundTier::for_days_until_check_in(-3), RefundTier::None);
    }

    #[test]
    fn test_guest_cancellation_uses_tier() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let booking = confirmed_booking(today + Duration::days(10), 30_000);
        let quote = refund_quote(&booking, today, false);
        assert_eq!(quote.days_until_check_in, 10);
        assert_eq!(quote.tier, RefundTier::Half);
        assert_eq!(quote.refund_cents, 15_000);
    }

    #[test]
    fn test_minimal_refund_rounds_down() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let booking = confirmed_booking(today + Duration::days(2), 12_345);
        let quote = refund_quote(&booking, today, false);
        assert_eq!(quote.percent, 10);
        assert_eq!(quote.refund_cents, 1_234);
    }

    #[test]
    fn test_host_cancellation_is_always_full() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let booking = confirmed_booking(today, 30_000);
        let quote = refund_quote(&booking, today, true);
        assert_eq!(quote.tier, RefundTier::Full);
        assert_eq!(quote.refund_cents, 30_000);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let booking = confirmed_booking(today + Duration::days(20), 100_000_000_000_000_000);
        let quote = refund_quote(&booking, today, false);
        assert_eq!(quote.tier, RefundTier::Full);
        assert_eq!(quote.refund_cents, 100_000_000_000_000_000);

        let booking = confirmed_booking(today + Duration::days(10), i64::MAX);
        assert_eq!(refund_quote(&booking, today, false).refund_cents, i64::MAX / 2);
    }

    #[test]
    fn test_pending_booking_is_fully_refunded() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut booking = confirmed_booking(today + Duration::days(1), 9_000);
        booking.status = BookingStatus::Pending;
        assert_eq!(refund_quote(&booking, today, false).refund_cents, 9_000);
    }
}
