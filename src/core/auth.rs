use crate::core::{AppError, AppState, Claims};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use std::sync::Arc;
use tracing::{Span, debug, field, instrument, warn};

/// Estrae il token da un header `Authorization` nella forma esatta
/// `Bearer <token>`: due parti separate da un solo spazio, schema case-sensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Verifica il bearer token e inserisce i `Claims` nelle extensions della richiesta.
/// Qualunque fallimento è un 401 generico: scaduto e malformato non si distinguono.
#[instrument(skip(state, req, next), fields(user_id = field::Empty))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            warn!("Missing or malformed authorization header");
            AppError::unauthorized("Authorization header required")
        })?;

    let claims = state.tokens.validate(token).map_err(|_| {
        warn!("Rejected bearer token");
        AppError::unauthorized("Invalid or expired token")
    })?;

    Span::current().record("user_id", claims.user_id);
    debug!("Authenticated user {}", claims.user_id);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Da montare dopo `authentication_middleware`: richiede il flag admin nei claims
#[instrument(skip(req, next))]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let is_admin = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.is_admin)
        .unwrap_or(false);

    if !is_admin {
        warn!("Admin access denied");
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}
