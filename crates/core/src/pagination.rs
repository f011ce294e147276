//! Page/limit pagination shared by the listing endpoints.

use serde::Deserialize;

/// A requested page of results.
///
/// Values are clamped rather than rejected: page numbers below 1 become 1 and
/// limits are kept within `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Largest page size a client may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page request, falling back to `default_limit` when no limit is given.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(default_limit)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip (`(page - 1) * limit`).
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::new(None, None, 6);
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 6);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let page = PageRequest::new(Some(0), Some(0), 10);
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 1);

        let page = PageRequest::new(Some(3), Some(5000), 10);
        assert_eq!(page.limit(), PageRequest::MAX_LIMIT);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn test_total_pages() {
        let page = PageRequest::new(Some(1), Some(6), 6);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(6), 1);
        assert_eq!(page.total_pages(7), 2);
        assert_eq!(page.total_pages(13), 3);
    }
}
