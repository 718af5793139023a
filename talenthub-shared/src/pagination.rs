/// Shared pagination for list endpoints
///
/// Every list endpoint accepts the same `page`/`limit` query parameters and
/// wraps its results in the same envelope:
///
/// ```json
/// {
///   "items": [...],
///   "pagination": { "page": 1, "limit": 10, "total": 42, "pages": 5 }
/// }
/// ```
///
/// `page` floors at 1 and `limit` clamps to 1..=100; out-of-range input is
/// normalized rather than rejected. A page past the end is a valid request
/// that returns empty items with the real total.

use serde::{Deserialize, Serialize};

/// Default items per page
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Hard ceiling on items per page
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Raw `page`/`limit` query parameters as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Normalizes raw query values into usable parameters
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_LIMIT))
    }
}

/// Normalized pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Row offset for the current page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// Pagination metadata attached to every list response
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    pub fn new(params: PageParams, total: i64) -> Self {
        // Ceiling division; zero rows means zero pages
        let pages = (total + params.limit - 1) / params.limit;

        Self {
            page: params.page,
            limit: params.limit,
            total,
            pages,
        }
    }
}

/// List response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        Self {
            items,
            pagination: PageInfo::new(params, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageQuery::default().params();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_normalization() {
        let params = PageParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);

        let params = PageParams::new(-5, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_offset() {
        let params = PageParams::new(3, 20);
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let params = PageParams::new(1, 10);
        assert_eq!(PageInfo::new(params, 0).pages, 0);
        assert_eq!(PageInfo::new(params, 1).pages, 1);
        assert_eq!(PageInfo::new(params, 10).pages, 1);
        assert_eq!(PageInfo::new(params, 11).pages, 2);
        assert_eq!(PageInfo::new(params, 42).pages, 5);
    }

    #[test]
    fn test_envelope_shape() {
        let page = Paginated::new(vec![1, 2, 3], PageParams::new(2, 3), 7);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["limit"], 3);
        assert_eq!(json["pagination"]["total"], 7);
        assert_eq!(json["pagination"]["pages"], 3);
    }
}
