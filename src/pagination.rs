//! Page-number pagination for list endpoints. Page size is clamped to the
//! configured bounds rather than rejected.

use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        let api = &config::config().api;
        self.page_size
            .unwrap_or(api.default_page_size)
            .clamp(api.min_page_size, api.max_page_size)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(count: i64, params: &PageParams, results: Vec<T>) -> Self {
        Self {
            count,
            page: params.page(),
            page_size: params.limit(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, page_size: Option<i64>) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn clamps_page_size_into_bounds() {
        assert_eq!(params(None, Some(5)).limit(), 10);
        assert_eq!(params(None, Some(30)).limit(), 30);
        assert_eq!(params(None, Some(500)).limit(), 50);
    }

    #[test]
    fn offset_follows_page_and_size() {
        let p = params(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn nonpositive_page_is_treated_as_first() {
        assert_eq!(params(Some(0), None).page(), 1);
        assert_eq!(params(Some(-2), None).offset(), 0);
    }
}
