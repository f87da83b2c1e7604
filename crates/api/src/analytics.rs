//! Revenue analytics over payment records.
//!
//! The repository returns raw aggregates (per-status rows, time-bucketed
//! revenue); this module owns the window/bucket coupling, the bucket
//! labels, and the zero-filled report shape.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saltbox_core::PaymentStatus;

use crate::db::payments::{StatusAggregateRow, TrendRow};

/// Reporting period selecting both the rolling window and the bucket size.
///
/// - `daily` - last 7 calendar days, bucketed by day
/// - `weekly` - last 12 ISO weeks, bucketed by week
/// - `monthly` - last 12 calendar months, bucketed by month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Period {
    /// Resolve the period parameter, defaulting anything unrecognized to
    /// monthly.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("daily") => Self::Daily,
            Some("weekly") => Self::Weekly,
            _ => Self::Monthly,
        }
    }

    /// The `date_trunc` field for this period's buckets.
    #[must_use]
    pub const fn granularity(self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
        }
    }

    /// Start of the rolling window, aligned to the bucket boundary so the
    /// window always holds whole buckets (7, 12, and 12 respectively,
    /// including the current one).
    #[must_use]
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let start_day = match self {
            Self::Daily => today - Duration::days(6),
            Self::Weekly => {
                // date_trunc('week', ...) buckets start on Monday
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                monday - Duration::weeks(11)
            }
            Self::Monthly => {
                let first_of_month = today.with_day(1).unwrap_or(today);
                first_of_month
                    .checked_sub_months(Months::new(11))
                    .unwrap_or(first_of_month)
            }
        };
        start_day
            .and_hms_opt(0, 0, 0)
            .map_or(now, |t| t.and_utc())
    }

    /// Human-readable label for a bucket start.
    #[must_use]
    pub fn label(self, bucket: DateTime<Utc>) -> String {
        match self {
            Self::Daily => bucket.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let iso = bucket.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Self::Monthly => bucket.format("%Y-%m").to_string(),
        }
    }
}

/// Count and summed amount for one status.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub count: i64,
    pub amount: Decimal,
}

/// Per-status breakdown with every status always present.
///
/// Statuses absent from the data report zeros rather than being omitted.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub pending: StatusBreakdown,
    pub paid: StatusBreakdown,
    pub failed: StatusBreakdown,
    pub refunded: StatusBreakdown,
}

impl StatusSummary {
    /// Zero-fill from the statuses actually present in the data.
    #[must_use]
    pub fn from_rows(rows: &[StatusAggregateRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            let slot = match row.status {
                PaymentStatus::Pending => &mut summary.pending,
                PaymentStatus::Paid => &mut summary.paid,
                PaymentStatus::Failed => &mut summary.failed,
                PaymentStatus::Refunded => &mut summary.refunded,
            };
            slot.count = row.count;
            slot.amount = row.amount;
        }
        summary
    }
}

/// One entry of the revenue trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Bucket label (`2026-03-15`, `2026-W11`, or `2026-03`).
    pub period: String,
    pub revenue: Decimal,
    pub orders: i64,
}

/// The full analytics report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Sum over paid records, unbounded by date.
    pub total_revenue: Decimal,
    pub statuses: StatusSummary,
    pub trend: Vec<TrendPoint>,
}

impl AnalyticsReport {
    /// Assemble the report from repository aggregates.
    ///
    /// Trend rows arrive sorted ascending by bucket from the query.
    #[must_use]
    pub fn assemble(
        period: Period,
        total_revenue: Decimal,
        statuses: &[StatusAggregateRow],
        trend: Vec<TrendRow>,
    ) -> Self {
        Self {
            total_revenue,
            statuses: StatusSummary::from_rows(statuses),
            trend: trend
                .into_iter()
                .map(|row| TrendPoint {
                    period: period.label(row.bucket),
                    revenue: row.revenue,
                    orders: row.orders,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn at(date: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_period_parse_defaults_to_monthly() {
        assert_eq!(Period::parse(None), Period::Monthly);
        assert_eq!(Period::parse(Some("quarterly")), Period::Monthly);
        assert_eq!(Period::parse(Some("daily")), Period::Daily);
        assert_eq!(Period::parse(Some("weekly")), Period::Weekly);
    }

    #[test]
    fn test_daily_window_spans_seven_days() {
        let now = at("2026-03-15T17:45:00Z");
        let start = Period::Daily.window_start(now);
        assert_eq!(start, at("2026-03-09T00:00:00Z"));
        // 7 day buckets: 03-09 through 03-15 inclusive
        assert_eq!((now.date_naive() - start.date_naive()).num_days(), 6);
    }

    #[test]
    fn test_weekly_window_starts_on_a_monday() {
        // 2026-03-15 is a Sunday
        let now = at("2026-03-15T12:00:00Z");
        let start = Period::Weekly.window_start(now);
        assert_eq!(start.weekday(), Weekday::Mon);
        // Monday of the current ISO week is 2026-03-09; 11 weeks back
        assert_eq!(start, at("2025-12-22T00:00:00Z"));
    }

    #[test]
    fn test_monthly_window_uses_calendar_months() {
        let now = at("2026-03-31T23:00:00Z");
        let start = Period::Monthly.window_start(now);
        // 12 calendar months including March 2026
        assert_eq!(start, at("2025-04-01T00:00:00Z"));
        assert_eq!(start.day(), 1);
    }

    #[test]
    fn test_bucket_labels() {
        let bucket = at("2026-03-02T00:00:00Z");
        assert_eq!(Period::Daily.label(bucket), "2026-03-02");
        assert_eq!(Period::Weekly.label(bucket), "2026-W10");
        assert_eq!(Period::Monthly.label(bucket), "2026-03");
    }

    #[test]
    fn test_week_label_at_year_boundary() {
        // 2027-01-01 falls in ISO week 53 of 2026
        let bucket = Utc.with_ymd_and_hms(2026, 12, 28, 0, 0, 0).unwrap();
        assert_eq!(Period::Weekly.label(bucket), "2026-W53");
    }

    #[test]
    fn test_status_summary_zero_fills_missing_statuses() {
        let rows = vec![StatusAggregateRow {
            status: PaymentStatus::Paid,
            count: 3,
            amount: "150.00".parse().unwrap(),
        }];
        let summary = StatusSummary::from_rows(&rows);

        assert_eq!(summary.paid.count, 3);
        assert_eq!(summary.paid.amount, "150.00".parse::<Decimal>().unwrap());
        assert_eq!(summary.pending.count, 0);
        assert_eq!(summary.pending.amount, Decimal::ZERO);
        assert_eq!(summary.failed.count, 0);
        assert_eq!(summary.refunded.count, 0);

        // Zeroed statuses appear in the serialized report, not omitted
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["failed"]["count"], 0);
    }

    #[test]
    fn test_report_assembly_labels_trend() {
        let trend = vec![
            TrendRow {
                bucket: at("2026-02-01T00:00:00Z"),
                revenue: "10".parse().unwrap(),
                orders: 1,
            },
            TrendRow {
                bucket: at("2026-03-01T00:00:00Z"),
                revenue: "25".parse().unwrap(),
                orders: 2,
            },
        ];
        let report = AnalyticsReport::assemble(
            Period::Monthly,
            "35".parse().unwrap(),
            &[],
            trend,
        );

        assert_eq!(report.trend.len(), 2);
        assert_eq!(report.trend[0].period, "2026-02");
        assert_eq!(report.trend[1].period, "2026-03");
        assert_eq!(report.trend[1].orders, 2);
        assert_eq!(report.total_revenue, "35".parse::<Decimal>().unwrap());
    }
}
