//! Application State - Stato globale dell'applicazione
//!
//! Contiene i repository e i manager condivisi tra route e middleware.

use super::config::Config;
use super::credentials::CredentialManager;
use super::token::TokenManager;
use crate::repositories::{
    MySqlProductRepository, MySqlUserRepository, ProductRepository, UserRepository,
};
use sqlx::MySqlPool;
use std::sync::Arc;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: Arc<dyn UserRepository>,

    /// Repository per il catalogo prodotti
    pub product: Arc<dyn ProductRepository>,

    /// Registrazione, login, cambio password
    pub credentials: CredentialManager,

    /// Emissione e verifica dei JWT
    pub tokens: TokenManager,
}

impl AppState {
    /// Crea lo stato di produzione sopra il pool MySQL
    pub fn new(pool: MySqlPool, config: &Config) -> Self {
        Self::with_repositories(
            Arc::new(MySqlUserRepository::new(pool.clone())),
            Arc::new(MySqlProductRepository::new(pool)),
            config,
        )
    }

    /// Costruisce lo stato con repository arbitrari (es. quelli in memoria nei test)
    pub fn with_repositories(
        user: Arc<dyn UserRepository>,
        product: Arc<dyn ProductRepository>,
        config: &Config,
    ) -> Self {
        Self {
            credentials: CredentialManager::new(user.clone(), config.bcrypt_cost),
            tokens: TokenManager::new(&config.jwt_secret, config.jwt_expires_in),
            user,
            product,
        }
    }
}
