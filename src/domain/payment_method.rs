//! Saved payment cards.
//!
//! Only display data is stored: brand, last four digits and expiry.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Other,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::Other => "other",
        }
    }
}

impl From<&str> for CardBrand {
    fn from(s: &str) -> Self {
        match s {
            "visa" => CardBrand::Visa,
            "mastercard" => CardBrand::Mastercard,
            "amex" => CardBrand::Amex,
            "discover" => CardBrand::Discover,
            _ => CardBrand::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand: CardBrand,
    #[schema(example = "4242")]
    pub last4: String,
    #[schema(example = 12)]
    pub exp_month: i32,
    #[schema(example = 2028)]
    pub exp_year: i32,
    pub holder_name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentMethod {
    pub user_id: Uuid,
    pub brand: CardBrand,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub holder_name: String,
    pub is_default: bool,
}

/// A card stays valid through the last day of its expiry month
static LAST4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));

/// Exactly four ASCII digits
pub fn is_valid_last4(last4: &str) -> bool {
    LAST4_PATTERN.is_match(last4)
}

pub fn is_expired(exp_month: i32, exp_year: i32, today: NaiveDate) -> bool {
    let current = today.year() * 12 + today.month() as i32;
    let expiry = exp_year * 12 + exp_month;
    expiry < current
}
