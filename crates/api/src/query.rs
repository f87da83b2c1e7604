//! Translation of raw listing query parameters into store directives.
//!
//! Product and payment listings share one parameter grammar: `page`,
//! `limit`, `search`, `category`, `minPrice`/`maxPrice`, `status`,
//! `startDate`/`endDate`, `sortBy`/`sortOrder`. Parameters arrive as raw
//! strings and are resolved leniently: an invalid or missing value falls
//! back to its default instead of erroring.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use saltbox_core::PaymentStatus;

/// Default page size for product listings.
pub const PRODUCT_PAGE_SIZE: i64 = 10;

/// Default page size for payment listings.
pub const PAYMENT_PAGE_SIZE: i64 = 20;

/// Upper bound on client-requested page sizes.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sortable fields for product listings: API name to column.
pub const PRODUCT_SORT_FIELDS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("name", "name"),
    ("price", "price"),
    ("stock", "stock"),
    ("category", "category"),
];

/// Sortable fields for payment listings: API name to column.
pub const PAYMENT_SORT_FIELDS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("totalAmount", "total_amount"),
    ("status", "status"),
];

/// Raw listing parameters as they arrive on the query string.
///
/// Everything is optional and untyped; resolution into typed directives
/// happens through the accessor methods so that malformed input degrades
/// to defaults rather than a 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Resolved pagination directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub limit: i64,
}

impl PageParams {
    /// Rows to skip before the requested page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Resolved sort directives. The column always comes from an allowlist and
/// is safe to interpolate into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Parse a positive integer, falling back to `default` on anything else.
fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Parse a timestamp, accepting a bare calendar date or RFC 3339.
fn parse_date(raw: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_milli_opt(23, 59, 59, 999)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return time.map(|t| t.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl ListQuery {
    /// Resolve page/limit with the endpoint's default page size.
    ///
    /// Invalid or non-positive values fall back to the defaults; the limit
    /// is clamped to [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn page_params(&self, default_limit: i64) -> PageParams {
        PageParams {
            page: parse_positive(self.page.as_deref(), 1),
            limit: parse_positive(self.limit.as_deref(), default_limit).min(MAX_PAGE_SIZE),
        }
    }

    /// Resolve the sort pair against an allowlist of sortable fields.
    ///
    /// Unknown `sortBy` values fall back to creation time. A `sortOrder`
    /// of exactly `"desc"` (or nothing at all) sorts descending; any other
    /// value sorts ascending.
    #[must_use]
    pub fn sort(&self, fields: &'static [(&'static str, &'static str)]) -> Sort {
        let column = self
            .sort_by
            .as_deref()
            .and_then(|requested| {
                fields
                    .iter()
                    .find(|(name, _)| *name == requested)
                    .map(|(_, column)| *column)
            })
            .unwrap_or("created_at");

        let direction = match self.sort_order.as_deref() {
            None | Some("desc") => SortDirection::Desc,
            Some(_) => SortDirection::Asc,
        };

        Sort { column, direction }
    }

    /// The trimmed search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The trimmed category filter, if any.
    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Inclusive price bounds, each present only when supplied and valid.
    #[must_use]
    pub fn price_range(&self) -> (Option<Decimal>, Option<Decimal>) {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<Decimal>().ok());
        (
            parse(self.min_price.as_deref()),
            parse(self.max_price.as_deref()),
        )
    }

    /// Inclusive date bounds, each present only when supplied and valid.
    ///
    /// A bare calendar `endDate` is normalized to 23:59:59.999 so the
    /// range covers the whole day.
    #[must_use]
    pub fn date_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (
            self.start_date.as_deref().and_then(|s| parse_date(s, false)),
            self.end_date.as_deref().and_then(|s| parse_date(s, true)),
        )
    }

    /// The status filter, if supplied and a valid enum value.
    #[must_use]
    pub fn status_filter(&self) -> Option<PaymentStatus> {
        self.status.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let mut q = ListQuery::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "page" => q.page = value,
                "limit" => q.limit = value,
                "search" => q.search = value,
                "category" => q.category = value,
                "minPrice" => q.min_price = value,
                "maxPrice" => q.max_price = value,
                "status" => q.status = value,
                "startDate" => q.start_date = value,
                "endDate" => q.end_date = value,
                "sortBy" => q.sort_by = value,
                "sortOrder" => q.sort_order = value,
                other => panic!("unknown key {other}"),
            }
        }
        q
    }

    #[test]
    fn test_page_defaults() {
        let params = ListQuery::default().page_params(PRODUCT_PAGE_SIZE);
        assert_eq!(params, PageParams { page: 1, limit: 10 });
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_invalid_page_and_limit_fall_back() {
        let q = query(&[("page", "zero"), ("limit", "-5")]);
        let params = q.page_params(PAYMENT_PAGE_SIZE);
        assert_eq!(params, PageParams { page: 1, limit: 20 });
    }

    #[test]
    fn test_limit_is_clamped() {
        let q = query(&[("limit", "5000")]);
        assert_eq!(q.page_params(PRODUCT_PAGE_SIZE).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_math() {
        let q = query(&[("page", "3"), ("limit", "25")]);
        assert_eq!(q.page_params(PRODUCT_PAGE_SIZE).offset(), 50);
    }

    #[test]
    fn test_sort_defaults_to_created_at_desc() {
        let sort = ListQuery::default().sort(PRODUCT_SORT_FIELDS);
        assert_eq!(sort.column, "created_at");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_unknown_field_falls_back() {
        let q = query(&[("sortBy", "owner_id"), ("sortOrder", "desc")]);
        let sort = q.sort(PRODUCT_SORT_FIELDS);
        assert_eq!(sort.column, "created_at");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_order_anything_but_desc_is_asc() {
        let q = query(&[("sortBy", "price"), ("sortOrder", "ascending")]);
        let sort = q.sort(PRODUCT_SORT_FIELDS);
        assert_eq!(sort.column, "price");
        assert_eq!(sort.direction, SortDirection::Asc);

        let q = query(&[("sortBy", "totalAmount"), ("sortOrder", "DESC")]);
        let sort = q.sort(PAYMENT_SORT_FIELDS);
        assert_eq!(sort.column, "total_amount");
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_price_range_partial_bounds() {
        let q = query(&[("minPrice", "10.50")]);
        let (min, max) = q.price_range();
        assert_eq!(min, Some("10.50".parse().unwrap()));
        assert_eq!(max, None);

        let q = query(&[("minPrice", "abc"), ("maxPrice", "99")]);
        let (min, max) = q.price_range();
        assert_eq!(min, None);
        assert_eq!(max, Some("99".parse().unwrap()));
    }

    #[test]
    fn test_end_date_covers_whole_day() {
        let q = query(&[("endDate", "2026-03-15")]);
        let (_, end) = q.date_range();
        let end = end.unwrap();
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);

        // A payment stamped 23:59:59 on the end date stays inside the bound.
        let late = DateTime::parse_from_rfc3339("2026-03-15T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(late <= end);
    }

    #[test]
    fn test_start_date_is_midnight() {
        let q = query(&[("startDate", "2026-03-01")]);
        let (start, _) = q.date_range();
        let start = start.unwrap();
        assert_eq!(start.hour(), 0);
        assert_eq!(start.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_rfc3339_dates_pass_through() {
        let q = query(&[("startDate", "2026-03-01T12:30:00Z")]);
        let (start, _) = q.date_range();
        assert_eq!(start.unwrap().hour(), 12);
    }

    #[test]
    fn test_invalid_dates_are_ignored() {
        let q = query(&[("startDate", "yesterday"), ("endDate", "03/15/2026")]);
        assert_eq!(q.date_range(), (None, None));
    }

    #[test]
    fn test_status_filter_lenient() {
        assert_eq!(
            query(&[("status", "paid")]).status_filter(),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(query(&[("status", "gone")]).status_filter(), None);
    }

    #[test]
    fn test_search_term_trimmed() {
        assert_eq!(query(&[("search", "  salt  ")]).search_term(), Some("salt"));
        assert_eq!(query(&[("search", "   ")]).search_term(), None);
    }
}
