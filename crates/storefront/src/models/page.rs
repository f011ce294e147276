//! Paged listing responses.

use serde::Serialize;

use shopfront_core::PageRequest;

use super::order::Order;
use super::product::Product;

/// `{data, total, page, totalProducts, totalPages}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub total_products: i64,
    pub total_pages: i64,
}

impl ProductPage {
    /// Wrap one page of products; `total` counts every product matching the filters.
    #[must_use]
    pub fn new(data: Vec<Product>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            total_products: total,
            total_pages: request.total_pages(total),
        }
    }
}

/// `{data, total, page, totalPages}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub data: Vec<Order>,
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
}

impl OrderPage {
    #[must_use]
    pub fn new(data: Vec<Order>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            total_pages: request.total_pages(total),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_page_shape() {
        let page = ProductPage::new(Vec::new(), 13, PageRequest::new(Some(2), Some(6), 6));
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [],
                "total": 13,
                "page": 2,
                "totalProducts": 13,
                "totalPages": 3
            })
        );
    }

    #[test]
    fn test_order_page_shape() {
        let page = OrderPage::new(Vec::new(), 0, PageRequest::new(None, None, 10));
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": [], "total": 0, "page": 1, "totalPages": 0})
        );
    }
}
