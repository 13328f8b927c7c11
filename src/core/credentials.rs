//! CredentialManager - regole di registrazione, login e gestione password

use super::error::AuthError;
use crate::dtos::{CreateUserDTO, RegisterDTO, UpdateProfileDTO, UpdateUserDTO};
use crate::entities::User;
use crate::repositories::UserRepository;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$")
        .expect("email regex is valid");
}

pub struct CredentialManager {
    users: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl CredentialManager {
    pub fn new(users: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Registra un nuovo account (attivo, non admin).
    ///
    /// La validazione avviene prima di qualunque accesso allo storage; poi
    /// unicità di email e username, in quest'ordine. Il vincolo UNIQUE del
    /// database resta l'ultima difesa contro registrazioni concorrenti.
    #[instrument(skip_all, fields(email = %input.email, username = %input.username))]
    pub async fn register(&self, input: RegisterDTO) -> Result<User, AuthError> {
        validate_email(&input.email)?;
        validate_username(&input.username)?;
        validate_password(&input.password)?;

        if self.users.exists_by_email(&input.email).await? {
            warn!("Registration rejected: email already in use");
            return Err(AuthError::AlreadyExists);
        }
        if self.users.exists_by_username(&input.username).await? {
            warn!("Registration rejected: username already in use");
            return Err(AuthError::AlreadyExists);
        }

        let password = self.hash(&input.password)?;

        let mut user = self
            .users
            .create(&CreateUserDTO {
                email: input.email,
                username: input.username,
                password,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await?;

        self.touch_last_login(&mut user).await;
        info!("User registered with id {}", user.id);
        Ok(user)
    }

    /// Utente inesistente e password errata producono lo stesso errore
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            warn!("Login attempt on inactive account {}", user.id);
            return Err(AuthError::InactiveAccount);
        }

        if !user.verify_password(password) {
            debug!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.touch_last_login(&mut user).await;
        info!("User {} logged in", user.id);
        Ok(user)
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self.get_by_id(user_id).await?;

        if !user.verify_password(current_password) {
            return Err(AuthError::InvalidCredentials);
        }
        validate_password(new_password)?;

        let hash = self.hash(new_password)?;
        self.users.update_password(&user_id, &hash).await?;
        info!("Password changed");
        Ok(())
    }

    /// Applica solo i campi presenti; uno username nuovo deve essere libero
    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        user_id: i64,
        changes: UpdateProfileDTO,
    ) -> Result<User, AuthError> {
        let user = self.get_by_id(user_id).await?;

        if let Some(username) = changes.username.as_ref().filter(|u| **u != user.username) {
            validate_username(username)?;
            if self.users.exists_by_username(username).await? {
                return Err(AuthError::AlreadyExists);
            }
        }

        let update: UpdateUserDTO = changes.into();
        let updated = self.users.update(&user_id, &update).await?;
        Ok(updated)
    }

    pub async fn get_by_id(&self, user_id: i64) -> Result<User, AuthError> {
        self.users.read(&user_id).await?.ok_or(AuthError::NotFound)
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        User::hash_password(password, self.bcrypt_cost)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))
    }

    /// Aggiorna anche la copia locale, così la risposta riflette lo storage
    async fn touch_last_login(&self, user: &mut User) {
        match self.users.update_last_login(&user.id).await {
            Ok(()) => user.last_login_at = Some(Utc::now()),
            Err(e) => warn!("Failed to record last login for user {}: {}", user.id, e),
        }
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(AuthError::Validation("Invalid email format"));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if len == 0 {
        return Err(AuthError::Validation("Username is required"));
    }
    if len < MIN_USERNAME_LENGTH {
        return Err(AuthError::Validation("Username must be at least 3 characters"));
    }
    if len > MAX_USERNAME_LENGTH {
        return Err(AuthError::Validation("Username must be at most 50 characters"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation("Password must be at least 8 characters"));
    }
    Ok(())
}
