//! Derived pagination envelope for list responses.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside list payloads.
///
/// Never stored; always derived from the requested page/limit and the total
/// row count of the filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The requested page (1-based).
    pub current_page: i64,
    /// Total number of pages: `ceil(total_count / limit)`.
    pub total_pages: i64,
    /// Total number of rows matching the filter, across all pages.
    pub total_count: i64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl Pagination {
    /// Derive the envelope from a page/limit pair and a total row count.
    ///
    /// `limit` must be positive; callers obtain it from the query builder,
    /// which clamps it into range.
    #[must_use]
    pub const fn from_total(page: i64, limit: i64, total_count: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };

        Self {
            current_page: page,
            total_pages,
            total_count,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Pagination::from_total(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::from_total(1, 10, 1).total_pages, 1);
        assert_eq!(Pagination::from_total(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::from_total(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::from_total(1, 20, 95).total_pages, 5);
    }

    #[test]
    fn test_has_next_and_prev() {
        let first = Pagination::from_total(1, 10, 35);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let middle = Pagination::from_total(2, 10, 35);
        assert!(middle.has_next);
        assert!(middle.has_prev);

        let last = Pagination::from_total(4, 10, 35);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_empty_result_set() {
        let empty = Pagination::from_total(1, 10, 0);
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_page_past_the_end() {
        let past = Pagination::from_total(9, 10, 35);
        assert!(!past.has_next);
        assert!(past.has_prev);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(Pagination::from_total(2, 10, 25)).expect("serialize");
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalCount"], 25);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], true);
    }
}
