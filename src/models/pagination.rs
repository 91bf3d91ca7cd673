//! Page arithmetic for article listings

use serde::{Deserialize, Serialize};

/// Number of articles shown on one listing page
pub const PAGE_SIZE: i64 = 10;

/// Page metadata for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// `ceil(total_records / page_size)`; zero when there are no records
    pub total_pages: i64,
    /// 1-based page being shown
    pub current_page: i64,
    pub page_size: i64,
    pub total_records: i64,
}

impl Pagination {
    /// Compute page metadata.
    ///
    /// `page` is taken as given: a page past the end is legal and simply
    /// has no items.
    pub fn new(page: i64, total_records: i64, page_size: i64) -> Self {
        let total_records = total_records.max(0);
        let total_pages = if page_size > 0 {
            (total_records + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            total_pages,
            current_page: page,
            page_size,
            total_records,
        }
    }

    /// Row offset of the first item on the current page
    pub fn offset(&self) -> i64 {
        self.current_page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Parse the `page` query parameter.
///
/// Missing, non-numeric and non-positive values all mean page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}
