//! Auth services - Registrazione, login e refresh dei token

use crate::core::{AppError, AppState, AuthError, Claims};
use crate::dtos::{AuthResponseDTO, LoginDTO, RefreshTokenDTO, RegisterDTO, TokenDTO, UserDTO};
use crate::entities::User;
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn auth_response(state: &AppState, user: User) -> Result<AuthResponseDTO, AppError> {
    let issued = state.tokens.issue(&Claims::from(&user))?;
    Ok(AuthResponseDTO {
        user: UserDTO::from(user),
        token: TokenDTO::from(issued),
    })
}

#[instrument(skip(state, body), fields(email = %body.email, username = %body.username))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<(StatusCode, Json<AuthResponseDTO>), AppError> {
    // 1. Validazione + unicità + hash della password (CredentialManager)
    // 2. Emissione del token per il nuovo utente
    // 3. 201 con utente e token
    let user = state.credentials.register(body).await?;
    let response = auth_response(&state, user)?;
    info!("User registered");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<Json<AuthResponseDTO>, AppError> {
    let user = state.credentials.login(&body.email, &body.password).await?;
    let response = auth_response(&state, user)?;
    Ok(Json(response))
}

/// Emette un nuovo token a partire da uno ancora valido.
/// L'utente viene ricaricato: account cancellati o disattivati non rinnovano.
#[instrument(skip(state, body))]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshTokenDTO>,
) -> Result<Json<TokenDTO>, AppError> {
    let claims = state.tokens.validate(&body.refresh_token)?;

    let user = state
        .credentials
        .get_by_id(claims.user_id)
        .await
        .map_err(|e| match e {
            AuthError::NotFound => {
                warn!("Refresh for missing user {}", claims.user_id);
                AuthError::InvalidToken
            }
            other => other,
        })?;

    if !user.is_active {
        return Err(AuthError::InactiveAccount.into());
    }

    let issued = state.tokens.issue(&Claims::from(&user))?;
    Ok(Json(TokenDTO::from(issued)))
}
