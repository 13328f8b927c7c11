//! Integration tests per health check e fallback

mod common;

#[cfg(test)]
mod health_tests {
    use super::common::*;
    use axum_test::http::HeaderName;
    use catalog_server::REQUEST_ID_HEADER;
    use serde_json::Value;

    #[tokio::test]
    async fn test_root() {
        let app = create_test_app();
        let response = app.server.get("/").await;
        response.assert_status_ok();
        response.assert_text("Server is running!");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app();

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["api"], "healthy");
        assert_eq!(body["services"]["database"], "healthy");
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_ready_and_live() {
        let app = create_test_app();

        let ready = app.server.get("/ready").await;
        ready.assert_status_ok();
        let body: Value = ready.json();
        assert_eq!(body["message"], "Service is ready");

        let live = app.server.get("/live").await;
        live.assert_status_ok();
        let body: Value = live.json();
        assert_eq!(body["message"], "Service is alive");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_404() {
        let app = create_test_app();

        let response = app.server.get("/api/v1/nothing-here").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["details"], "/api/v1/nothing-here");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let app = create_test_app();

        let response = app.server.get("/live").await;

        let id = response.headers().get(REQUEST_ID_HEADER).expect("request id header");
        assert!(!id.to_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = create_test_app();

        let response = app
            .server
            .get("/api/v1/nothing-here")
            .add_header(HeaderName::from_static(REQUEST_ID_HEADER), "req-42".to_string())
            .await;

        response.assert_status_not_found();
        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
    }
}
