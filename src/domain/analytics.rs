//! Admin analytics time buckets.
//!
//! A range is turned into consecutive calendar buckets ending with the
//! bucket that contains `today`; per-bucket counts coming from the
//! database are left-joined onto them and missing buckets read as zero.

use std::collections::HashMap;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Supported analytics windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AnalyticsRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "12m")]
    Year,
}

impl Default for AnalyticsRange {
    fn default() -> Self {
        AnalyticsRange::Month
    }
}

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BucketUnit {
    Day,
    Month,
}

impl BucketUnit {
    /// Field name understood by PostgreSQL `date_trunc`
    pub fn as_sql(&self) -> &'static str {
        match self {
            BucketUnit::Day => "day",
            BucketUnit::Month => "month",
        }
    }

    /// Start of the bucket containing `date`
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            BucketUnit::Day => date,
            BucketUnit::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

impl AnalyticsRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsRange::Week => "7d",
            AnalyticsRange::Month => "30d",
            AnalyticsRange::Year => "12m",
        }
    }

    pub fn unit(&self) -> BucketUnit {
        match self {
            AnalyticsRange::Week | AnalyticsRange::Month => BucketUnit::Day,
            AnalyticsRange::Year => BucketUnit::Month,
        }
    }

    fn bucket_count(&self) -> u32 {
        match self {
            AnalyticsRange::Week => 7,
            AnalyticsRange::Month => 30,
            AnalyticsRange::Year => 12,
        }
    }

    /// Bucket start dates in ascending order, the last one containing `today`
    pub fn bucket_starts(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let count = self.bucket_count();
        match self.unit() {
            BucketUnit::Day => (0..count)
                .rev()
                .map(|back| today - Duration::days(i64::from(back)))
                .collect(),
            BucketUnit::Month => {
                let current = BucketUnit::Month.truncate(today);
                (0..count)
                    .rev()
                    .filter_map(|back| current.checked_sub_months(Months::new(back)))
                    .collect()
            }
        }
    }

    /// First day covered by the range
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        self.bucket_starts(today).first().copied().unwrap_or(today)
    }
}

impl std::str::FromStr for AnalyticsRange {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "7d" => Ok(AnalyticsRange::Week),
            "30d" => Ok(AnalyticsRange::Month),
            "12m" => Ok(AnalyticsRange::Year),
            other => Err(AppError::validation(format!(
                "Unknown analytics range '{}'. Use 7d, 30d or 12m",
                other
            ))),
        }
    }
}

/// One bucketed count as returned by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketCount {
    pub bucket: NaiveDate,
    pub value: i64,
}

/// One point of the analytics series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeriesPoint {
    #[schema(example = "2026-06-01")]
    pub bucket: NaiveDate,
    pub new_users: i64,
    pub new_bookings: i64,
    pub revenue_cents: i64,
}

/// Analytics response for one range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsReport {
    pub range: AnalyticsRange,
    pub unit: BucketUnit,
    pub series: Vec<SeriesPoint>,
    pub total_new_users: i64,
    pub total_new_bookings: i64,
    pub total_revenue_cents: i64,
}

fn index(counts: &[BucketCount], unit: BucketUnit) -> HashMap<NaiveDate, i64> {
    let mut map = HashMap::new();
    for count in counts {
        *map.entry(unit.truncate(count.bucket)).or_insert(0) += count.value;
    }
    map
}

/// Left-join the three count series onto the range's buckets.
pub fn build_report(
    range: AnalyticsRange,
    today: NaiveDate,
    users: &[BucketCount],
    bookings: &[BucketCount],
    revenue: &[BucketCount],
) -> AnalyticsReport {
    let unit = range.unit();
    let users = index(users, unit);
    let bookings = index(bookings, unit);
    let revenue = index(revenue, unit);

    let series: Vec<SeriesPoint> = range
        .bucket_starts(today)
        .into_iter()
        .map(|bucket| SeriesPoint {
            bucket,
            new_users: users.get(&bucket).copied().unwrap_or(0),
            new_bookings: bookings.get(&bucket).copied().unwrap_or(0),
            revenue_cents: revenue.get(&bucket).copied().unwrap_or(0),
        })
        .collect();

    AnalyticsReport {
        range,
        unit,
        total_new_users: series.iter().map(|p| p.new_users).sum(),
        total_new_bookings: series.iter().map(|p| p.new_bookings).sum(),
        total_revenue_cents: series.iter().map(|p| p.revenue_cents).sum(),
        series,
    }
}

/// Headline totals for the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlatformStats {
    pub users: u64,
    pub hosts: u64,
    pub listings: u64,
    pub bookings: u64,
    pub pending_host_requests: u64,
    pub revenue_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_buckets_end_today() {
        let today = date(2026, 3, 2);
        let buckets = AnalyticsRange::Week.bucket_starts(today);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets.first(), Some(&date(2026, 2, 24)));
        assert_eq!(buckets.last(), Some(&today));
    }

    #[test]
    fn test_monthly_buckets_cross_year_boundary() {
        let buckets = AnalyticsRange::Year.bucket_starts(date(2026, 2, 17));
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets.first(), Some(&date(2025, 3, 1)));
        assert_eq!(buckets.last(), Some(&date(2026, 2, 1)));
        assert!(buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_buckets_are_zero_filled() {
        let today = date(2026, 6, 10);
        let report = build_report(
            AnalyticsRange::Week,
            today,
            &[BucketCount { bucket: date(2026, 6, 9), value: 3 }],
            &[
                BucketCount { bucket: date(2026, 6, 4), value: 1 },
                BucketCount { bucket: date(2026, 6, 10), value: 2 },
            ],
            &[BucketCount { bucket: date(2026, 6, 10), value: 50_000 }],
        );

        assert_eq!(report.series.len(), 7);
        assert_eq!(report.series[0].new_bookings, 1);
        assert_eq!(report.series[5].new_users, 3);
        assert_eq!(report.series[6].revenue_cents, 50_000);
        assert_eq!(report.series[2], SeriesPoint {
            bucket: date(2026, 6, 6),
            new_users: 0,
            new_bookings: 0,
            revenue_cents: 0,
        });
        assert_eq!(report.total_new_bookings, 3);
    }

    #[test]
    fn test_counts_outside_range_are_ignored() {
        let report = build_report(
            AnalyticsRange::Week,
            date(2026, 6, 10),
            &[BucketCount { bucket: date(2026, 1, 1), value: 99 }],
            &[],
            &[],
        );
        assert_eq!(report.total_new_users, 0);
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("12m".parse::<AnalyticsRange>().unwrap(), AnalyticsRange::Year);
        assert!("1y".parse::<AnalyticsRange>().is_err());
    }
}
