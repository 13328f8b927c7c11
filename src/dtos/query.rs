//! Query DTOs - Data Transfer Objects per query string di ricerca e paginazione

use crate::repositories::ProductFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagina richiesta, normalizzata: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Satura a `i64::MAX`: una pagina oltre la fine torna semplicemente vuota
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Query parameters di GET /products
/// es. /products?page=2&page_size=20&category=books&min_price=5&search=rust
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: non_empty(&self.category),
            min_price: self.min_price,
            max_price: self.max_price,
            is_active: self.is_active,
            search: non_empty(&self.search),
        }
    }
}

/// Query parameters di GET /products/search?q=...
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, page_size: 10 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, page_size: 1 });
        assert_eq!(Pagination::new(Some(-3), Some(1000)), Pagination { page: 1, page_size: 100 });
        assert_eq!(Pagination::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let pagination = Pagination::new(Some(i64::MAX), Some(100));
        assert_eq!(pagination.page, i64::MAX);
        assert_eq!(pagination.offset(), i64::MAX);
    }

    #[test]
    fn test_blank_filters_are_dropped() {
        let query = ProductQuery {
            category: Some("  ".to_string()),
            search: Some(" mouse ".to_string()),
            ..Default::default()
        };
        let filter = query.filter();
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("mouse"));
    }
}
