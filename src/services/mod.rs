//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod product;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{login_user, refresh_token, register_user};
pub use product::{
    bulk_update_status, create_product, delete_product, get_product, list_products,
    search_products, update_product, update_stock,
};
pub use user::{change_password, get_profile, get_user_by_id, update_profile};

use crate::AppState;
use crate::dtos::MessageResponseDTO;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, warn};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub services: BTreeMap<&'static str, &'static str>,
}

/// Root endpoint
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// GET /health - stato dell'API e delle sue dipendenze
#[instrument(skip(state))]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut services = BTreeMap::new();
    services.insert("api", "healthy");

    let database_ok = match state.user.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    };
    services.insert("database", if database_ok { "healthy" } else { "unhealthy" });

    let (status_code, status) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let body = HealthResponse {
        status,
        timestamp: Utc::now().to_rfc3339(),
        services,
    };
    (status_code, Json(body))
}

/// GET /ready - pronto a servire richieste solo se il database risponde
#[instrument(skip(state))]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.user.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponseDTO::new("Service is ready")),
        ),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(MessageResponseDTO::new("Database is not ready")),
            )
        }
    }
}

/// GET /live
pub async fn liveness_check() -> Json<MessageResponseDTO> {
    Json(MessageResponseDTO::new("Service is alive"))
}

/// Fallback per le route inesistenti
pub async fn not_found(uri: Uri) -> crate::core::AppError {
    crate::core::AppError::not_found("Not Found").with_details(uri.path().to_string())
}
