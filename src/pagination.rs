//! Page-number pagination envelope.

use serde::{Deserialize, Serialize};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Hard ceiling for client-requested page sizes.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Fixed page size for comment listings; not client-overridable.
pub const COMMENT_PAGE_SIZE: u64 = 10;

/// Client-supplied pagination parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to the ceiling.
    pub fn size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble the envelope for page `page` (1-based) of `count` total
    /// rows at `page_size` rows per page. Links are relative to `path`.
    pub fn new(path: &str, page: u64, page_size: u64, count: u64, results: Vec<T>) -> Self {
        let last_page = count.div_ceil(page_size).max(1);

        let next = (page < last_page)
            .then(|| format!("{}?page={}&page_size={}", path, page + 1, page_size));
        let previous =
            (page > 1).then(|| format!("{}?page={}&page_size={}", path, page - 1, page_size));

        Page {
            count,
            next,
            previous,
            results,
        }
    }
}
