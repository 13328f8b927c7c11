//! Integration tests per gli endpoints del catalogo prodotti
//!
//! Test per:
//! - GET /api/v1/products (lista, filtri, paginazione)
//! - GET /api/v1/products/search
//! - GET /api/v1/products/{id}
//! - POST/PUT/DELETE /api/v1/products (autenticati)
//! - PUT /api/v1/products/{id}/stock
//! - PUT /api/v1/products/status (solo admin)

mod common;

#[cfg(test)]
mod product_tests {
    use super::common::*;
    use axum_test::http::StatusCode;
    use serde_json::{Value, json};

    fn names(body: &Value) -> Vec<String> {
        body["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    }

    // ============================================================
    // Rotte pubbliche
    // ============================================================

    #[tokio::test]
    async fn test_list_products_default_pagination() {
        let app = create_test_app();
        for i in 0..12 {
            app.seed_product(&format!("Product {:02}", i), "books", 10.0).await;
        }

        let response = app.server.get("/api/v1/products").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 12);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["products"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_list_products_second_page_and_clamping() {
        let app = create_test_app();
        for i in 0..12 {
            app.seed_product(&format!("Product {:02}", i), "books", 10.0).await;
        }

        let response = app
            .server
            .get("/api/v1/products")
            .add_query_param("page", 2)
            .add_query_param("page_size", 10)
            .await;
        let body: Value = response.json();
        assert_eq!(names(&body), vec!["Product 10", "Product 11"]);

        let clamped = app
            .server
            .get("/api/v1/products")
            .add_query_param("page", 0)
            .add_query_param("page_size", 1000)
            .await;
        let body: Value = clamped.json();
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 100);
        assert_eq!(body["total_pages"], 1);
    }

    #[tokio::test]
    async fn test_list_products_page_past_the_end() {
        let app = create_test_app();
        app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .get("/api/v1/products")
            .add_query_param("page", i64::MAX)
            .add_query_param("page_size", 100)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 1);
        assert!(body["products"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let app = create_test_app();
        app.seed_product("Rust Book", "books", 40.0).await;
        app.seed_product("snake_case guide", "books", 10.0).await;

        let response = app
            .server
            .get("/api/v1/products/search")
            .add_query_param("q", "_")
            .await;
        assert_eq!(names(&response.json()), vec!["snake_case guide"]);
    }

    #[tokio::test]
    async fn test_list_products_filters() {
        let app = create_test_app();
        app.seed_product("Rust Book", "books", 40.0).await;
        app.seed_product("Go Book", "books", 25.0).await;
        app.seed_product("Keyboard", "hardware", 60.0).await;

        let by_category = app
            .server
            .get("/api/v1/products")
            .add_query_param("category", "books")
            .await;
        assert_eq!(names(&by_category.json()), vec!["Rust Book", "Go Book"]);

        let by_price = app
            .server
            .get("/api/v1/products")
            .add_query_param("min_price", 30)
            .add_query_param("max_price", 60)
            .await;
        assert_eq!(names(&by_price.json()), vec!["Rust Book", "Keyboard"]);

        let by_search = app
            .server
            .get("/api/v1/products")
            .add_query_param("search", "rust")
            .await;
        assert_eq!(names(&by_search.json()), vec!["Rust Book"]);
    }

    #[tokio::test]
    async fn test_search_products() {
        let app = create_test_app();
        app.seed_product("Rust Book", "books", 40.0).await;
        app.seed_product("Keyboard", "hardware", 60.0).await;

        let response = app
            .server
            .get("/api/v1/products/search")
            .add_query_param("q", "BOOK")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 1);
        assert_eq!(names(&body), vec!["Rust Book"]);

        let empty = app.server.get("/api/v1/products/search").await;
        empty.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_get_product() {
        let app = create_test_app();
        let product = app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .get(&format!("/api/v1/products/{}", product.id))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "Rust Book");
        assert_eq!(body["price"], 40.0);

        let missing = app.server.get("/api/v1/products/9999").await;
        missing.assert_status_not_found();
        let body: Value = missing.json();
        assert_eq!(body["error"], "Product not found");
    }

    // ============================================================
    // Rotte autenticate
    // ============================================================

    #[tokio::test]
    async fn test_create_product_requires_auth() {
        let app = create_test_app();

        let response = app
            .server
            .post("/api/v1/products")
            .json(&json!({ "name": "Rust Book", "price": 40.0 }))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_create_product() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;

        let response = app
            .server
            .post("/api/v1/products")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({
                "name": "Rust Book",
                "description": "The book",
                "price": 40.0,
                "stock": 3,
                "category": "books"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["name"], "Rust Book");
        assert_eq!(body["stock"], 3);
        assert_eq!(body["is_active"], true);
        assert!(body.get("deleted_at").is_none());
    }

    #[tokio::test]
    async fn test_create_product_duplicate_name() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;
        app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .post("/api/v1/products")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "name": "Rust Book", "price": 10.0 }))
            .await;

        response.assert_status_conflict();
    }

    #[tokio::test]
    async fn test_create_product_validation() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;

        for body in [
            json!({ "name": "ab", "price": 10.0 }),
            json!({ "name": "Rust Book", "price": -1.0 }),
            json!({ "name": "Rust Book", "price": 1.0, "stock": -4 }),
        ] {
            let response = app
                .server
                .post("/api/v1/products")
                .add_header(auth_header(), bearer(&token))
                .json(&body)
                .await;
            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn test_update_product() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;
        let product = app.seed_product("Rust Book", "books", 40.0).await;
        app.seed_product("Go Book", "books", 25.0).await;

        let response = app
            .server
            .put(&format!("/api/v1/products/{}", product.id))
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "price": 35.5, "is_active": false }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["price"], 35.5);
        assert_eq!(body["is_active"], false);
        assert_eq!(body["name"], "Rust Book");

        let clash = app
            .server
            .put(&format!("/api/v1/products/{}", product.id))
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "name": "Go Book" }))
            .await;
        clash.assert_status_conflict();

        let missing = app
            .server
            .put("/api/v1/products/9999")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "price": 1.0 }))
            .await;
        missing.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_delete_product_is_soft() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;
        let product = app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .delete(&format!("/api/v1/products/{}", product.id))
            .add_header(auth_header(), bearer(&token))
            .await;
        response.assert_status_ok();

        app.server
            .get(&format!("/api/v1/products/{}", product.id))
            .await
            .assert_status_not_found();

        let again = app
            .server
            .delete(&format!("/api/v1/products/{}", product.id))
            .add_header(auth_header(), bearer(&token))
            .await;
        again.assert_status_not_found();

        // il nome torna disponibile
        let recreate = app
            .server
            .post("/api/v1/products")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "name": "Rust Book", "price": 10.0 }))
            .await;
        recreate.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_update_stock() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;
        let product = app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .put(&format!("/api/v1/products/{}/stock", product.id))
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "stock": 42 }))
            .await;
        response.assert_status_ok();

        let body: Value = app
            .server
            .get(&format!("/api/v1/products/{}", product.id))
            .await
            .json();
        assert_eq!(body["stock"], 42);

        let negative = app
            .server
            .put(&format!("/api/v1/products/{}/stock", product.id))
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "stock": -1 }))
            .await;
        negative.assert_status_bad_request();

        let missing = app
            .server
            .put("/api/v1/products/9999/stock")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "stock": 1 }))
            .await;
        missing.assert_status_not_found();
    }

    // ============================================================
    // Rotte admin
    // ============================================================

    #[tokio::test]
    async fn test_bulk_status_requires_admin() {
        let app = create_test_app();
        let (_, token) = app.register("a@b.co", "abc").await;
        let product = app.seed_product("Rust Book", "books", 40.0).await;

        let response = app
            .server
            .put("/api/v1/products/status")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "product_ids": [product.id], "is_active": false }))
            .await;

        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_bulk_status_as_admin() {
        let app = create_test_app();
        let (_, admin_token) = app.register_admin("admin@b.co", "admin").await;
        let a = app.seed_product("Rust Book", "books", 40.0).await;
        let b = app.seed_product("Go Book", "books", 25.0).await;
        app.seed_product("Keyboard", "hardware", 60.0).await;

        let response = app
            .server
            .put("/api/v1/products/status")
            .add_header(auth_header(), bearer(&admin_token))
            .json(&json!({ "product_ids": [a.id, b.id, 9999], "is_active": false }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "2 products updated");

        let inactive = app
            .server
            .get("/api/v1/products")
            .add_query_param("is_active", false)
            .await;
        assert_eq!(names(&inactive.json()), vec!["Rust Book", "Go Book"]);

        let empty = app
            .server
            .put("/api/v1/products/status")
            .add_header(auth_header(), bearer(&admin_token))
            .json(&json!({ "product_ids": [], "is_active": true }))
            .await;
        empty.assert_status_bad_request();
    }
}
