//! User DTOs - Data Transfer Objects per utenti e autenticazione

use crate::core::IssuedToken;
use crate::entities::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vista pubblica di un utente: la password non esce mai dal server
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            full_name: value.full_name(),
            id: value.id,
            email: value.email,
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            is_active: value.is_active,
            is_admin: value.is_admin,
            last_login_at: value.last_login_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO per creare un nuovo utente (senza id, password già hashata)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// DTO per aggiornare un utente (solo i campi `Some(_)` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserDTO {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

/// Body di POST /auth/register. I campi mancanti diventano stringhe vuote
/// così che la validazione risponda con un errore esplicito.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterDTO {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body di POST /auth/login
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// Body di POST /auth/change-password
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ChangePasswordDTO {
    pub current_password: String,
    pub new_password: String,
}

/// Body di PUT /auth/profile
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateProfileDTO {
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: Option<String>,
}

impl From<UpdateProfileDTO> for UpdateUserDTO {
    fn from(value: UpdateProfileDTO) -> Self {
        Self {
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            ..Default::default()
        }
    }
}

/// Body di POST /auth/refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshTokenDTO {
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenDTO {
    pub access_token: String,
    pub token_type: String,
    /// Scadenza assoluta (unix seconds)
    pub expires_at: i64,
    /// Secondi rimanenti al momento dell'emissione
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenDTO {
    fn from(value: IssuedToken) -> Self {
        let expires_in = (value.expires_at - Utc::now().timestamp()).max(0);
        Self {
            access_token: value.token,
            token_type: "Bearer".to_string(),
            expires_at: value.expires_at,
            expires_in,
        }
    }
}

/// Risposta di register/login: utente + token
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponseDTO {
    pub user: UserDTO,
    pub token: TokenDTO,
}

/// Messaggio generico di conferma
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponseDTO {
    pub message: String,
}

impl MessageResponseDTO {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
