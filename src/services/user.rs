//! User services - Profilo dell'utente autenticato e lookup admin

use crate::core::{AppError, AppState, Claims};
use crate::dtos::{ChangePasswordDTO, MessageResponseDTO, UpdateProfileDTO, UserDTO};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>, // inserito da authentication_middleware
) -> Result<Json<UserDTO>, AppError> {
    debug!("Fetching profile");
    let user = state.credentials.get_by_id(claims.user_id).await?;
    Ok(Json(UserDTO::from(user)))
}

#[instrument(skip(state, claims, body), fields(user_id = %claims.user_id))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateProfileDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    let user = state.credentials.update_profile(claims.user_id, body).await?;
    info!("Profile updated");
    Ok(Json(UserDTO::from(user)))
}

#[instrument(skip(state, claims, body), fields(user_id = %claims.user_id))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<ChangePasswordDTO>,
) -> Result<Json<MessageResponseDTO>, AppError> {
    state
        .credentials
        .change_password(claims.user_id, &body.current_password, &body.new_password)
        .await?;
    Ok(Json(MessageResponseDTO::new("Password changed successfully")))
}

/// Solo admin (vedi admin_middleware)
#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state.credentials.get_by_id(user_id).await?;
    Ok(Json(UserDTO::from(user)))
}
