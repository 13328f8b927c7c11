//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Credenziali (registrazione, login, password)
//! - Token JWT e middleware di autenticazione
//! - Configurazione e logging
//! - Gestione errori
//! - Stato applicazione

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod state;
pub mod token;

// Re-exports per facilitare l'import
pub use auth::{admin_middleware, authentication_middleware, bearer_token};
pub use config::{Config, LogFormat};
pub use credentials::CredentialManager;
pub use error::{AppError, AuthError};
pub use logging::init_tracing;
pub use state::AppState;
pub use token::{Claims, IssuedToken, TokenManager};
