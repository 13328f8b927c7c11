//! Product DTOs - Data Transfer Objects per il catalogo prodotti

use crate::entities::Product;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare un nuovo prodotto (senza id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateProductDTO {
    #[validate(length(min = 3, max = 255, message = "Product name must be between 3 and 255 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 0.0, message = "Product price must be greater than or equal to 0"))]
    pub price: f64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Product stock must be greater than or equal to 0"))]
    pub stock: i32,

    #[serde(default)]
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: String,
}

/// DTO per aggiornare un prodotto (solo i campi `Some(_)` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateProductDTO {
    #[validate(length(min = 3, max = 255, message = "Product name must be between 3 and 255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Product price must be greater than or equal to 0"))]
    pub price: Option<f64>,

    #[validate(range(min = 0, message = "Product stock must be greater than or equal to 0"))]
    pub stock: Option<i32>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,

    pub is_active: Option<bool>,
}

/// Body di PUT /products/{id}/stock
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct StockUpdateDTO {
    #[validate(range(min = 0, message = "Product stock must be greater than or equal to 0"))]
    pub stock: i32,
}

/// Body di PUT /products/status (solo admin)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct BulkStatusDTO {
    #[validate(length(min = 1, message = "At least one product id is required"))]
    pub product_ids: Vec<i64>,
    pub is_active: bool,
}

/// Pagina di prodotti con i metadati di paginazione
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductListDTO {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl ProductListDTO {
    pub fn new(products: Vec<Product>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            products,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(ProductListDTO::new(vec![], 0, 1, 10).total_pages, 0);
        assert_eq!(ProductListDTO::new(vec![], 10, 1, 10).total_pages, 1);
        assert_eq!(ProductListDTO::new(vec![], 11, 1, 10).total_pages, 2);
    }

    #[test]
    fn test_create_product_validation() {
        let ok = CreateProductDTO {
            name: "Keyboard".to_string(),
            description: String::new(),
            price: 49.9,
            stock: 3,
            category: "hardware".to_string(),
            image_url: String::new(),
        };
        assert!(ok.validate().is_ok());

        let short_name = CreateProductDTO {
            name: "ab".to_string(),
            ..ok.clone()
        };
        assert!(short_name.validate().is_err());

        let negative_price = CreateProductDTO {
            price: -1.0,
            ..ok.clone()
        };
        assert!(negative_price.validate().is_err());

        let negative_stock = CreateProductDTO { stock: -5, ..ok };
        assert!(negative_stock.validate().is_err());
    }

    #[test]
    fn test_bulk_status_requires_ids() {
        let empty = BulkStatusDTO {
            product_ids: vec![],
            is_active: false,
        };
        assert!(empty.validate().is_err());
    }
}
