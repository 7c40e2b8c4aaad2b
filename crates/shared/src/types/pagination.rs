//! Page window and envelope for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page a client may ask for.
pub const MAX_PER_PAGE: u32 = 100;

const DEFAULT_PER_PAGE: u32 = 20;

/// 1-based page window, read from `?page=&per_page=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Pulls out-of-range values back into `page >= 1`, `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * self.limit()
    }

    /// Rows to fetch.
    #[must_use]
    pub fn limit(self) -> u64 {
        u64::from(self.per_page)
    }
}

/// Number of pages needed for `total` rows. An empty list still has one page.
#[must_use]
pub fn page_count(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    u32::try_from(total.div_ceil(u64::from(per_page)))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// `{ data, meta }` envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Where this page sits in the full result.
    pub meta: PageMeta,
}

/// Page position and result size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number, starting at 1.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
    /// Rows across all pages.
    pub total: u64,
    /// Pages across the whole result, at least 1.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Wraps one page of rows fetched with `request` out of `total`.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page: request.per_page,
                total,
                total_pages: page_count(total, request.per_page),
            },
        }
    }

    /// Converts each row, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
