//! # Pagination
//!
//! Page requests and result pages for the listing reads.
//!
//! ```text
//! PageRequest { page: 2, per_page: 20 }
//!      │
//!      ├── offset() = 20, limit() = 20   ──► SELECT ... LIMIT ? OFFSET ?
//!      │
//!      ▼
//! Page { items, total: 45, pages: 3, page: 2, has_next: true, has_prev: true }
//! ```

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Builds a request, clamping `page` to at least 1 and `per_page`
    /// to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Builds a request from optional caller input.
    pub fn from_parts(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        PageRequest::new(page.unwrap_or(1), per_page.unwrap_or(default_per_page))
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u32,
    pub page: u32,
    pub per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page);
        let pages = u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX);

        Page {
            items,
            total,
            pages,
            page: request.page,
            per_page: request.per_page,
            has_next: request.page < pages,
            has_prev: request.page > 1,
        }
    }

    /// Converts the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pages: self.pages,
            page: self.page,
            per_page: self.per_page,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}
