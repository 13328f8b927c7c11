//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, Config, auth, config};
pub use services::root;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use std::any::Any as PanicPayload;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, error, info_span, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::*;

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .nest("/api/v1/auth", configure_auth_routes(state.clone()))
        .nest("/api/v1/products", configure_product_routes(state.clone()))
        .fallback(not_found);

    with_http_layers(router).with_state(state)
}

/// Layer comuni a tutte le route, dal più esterno:
/// request id -> trace -> propagazione dell'id nella risposta -> recupero dai panic
pub fn with_http_layers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn request_span(req: &Request) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}

/// Un panic in un handler diventa un 500 JSON invece di chiudere la connessione
fn handle_panic(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    AppError::internal_server_error("Internal server error").into_response()
}

/// Configura le routes di autenticazione (register, login, refresh) e del profilo
fn configure_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    let public_routes = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token));

    let protected_routes = Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // L'ultimo layer aggiunto è il primo ad essere eseguito: prima auth, poi admin
    let admin_routes = Router::new()
        .route("/users/{user_id}", get(get_user_by_id))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(protected_routes).merge(admin_routes)
}

/// Configura le routes del catalogo prodotti
fn configure_product_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    // Rotte pubbliche (nessuna autenticazione)
    let public_routes = Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/{product_id}", get(get_product));

    // Rotte che richiedono autenticazione
    let protected_routes = Router::new()
        .route("/", post(create_product))
        .route("/{product_id}", put(update_product).delete(delete_product))
        .route("/{product_id}/stock", put(update_stock))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    let admin_routes = Router::new()
        .route("/status", put(bulk_update_status))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(protected_routes).merge(admin_routes)
}

/// CORS dalle origini configurate; `*` (o nessuna origine valida) apre a tutte
pub fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    base.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    async fn boom() -> &'static str {
        panic!("boom");
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let router = with_http_layers(
            Router::new()
                .route("/boom", get(boom))
                .route("/ok", get(|| async { "ok" })),
        );
        let server = TestServer::new(router).unwrap();

        let response = server.get("/boom").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Internal server error");

        // il server continua a servire le richieste successive
        server.get("/ok").await.assert_status_ok();
    }
}
