//! User entity - Entità utente con metodi per gestione password

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Sempre un hash bcrypt, mai in chiaro
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with the given cost
    pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, cost)?;
        Ok(hash)
    }

    /// Nome completo, con fallback sullo username se nome e cognome sono vuoti
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.username.clone(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_password(password: &str) -> User {
        let now = Utc::now();
        User {
            id: 1,
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            password: User::hash_password(password, 4).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_admin: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let user = user_with_password("password1");
        assert_ne!(user.password, "password1");
        assert!(!user.password.contains("password1"));
        assert!(user.verify_password("password1"));
        assert!(!user.verify_password("password2"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = User::hash_password("password1", 4).unwrap();
        let b = User::hash_password("password1", 4).unwrap();
        assert_ne!(a, b, "bcrypt salt should make hashes differ");
    }

    #[test]
    fn test_verify_against_garbage_hash_is_false() {
        let mut user = user_with_password("password1");
        user.password = "not-a-bcrypt-hash".to_string();
        assert!(!user.verify_password("password1"));
    }

    #[test]
    fn test_password_never_serialized() {
        let user = user_with_password("password1");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_full_name_fallbacks() {
        let mut user = user_with_password("password1");
        assert_eq!(user.full_name(), "alice");
        user.first_name = "Alice".to_string();
        assert_eq!(user.full_name(), "Alice");
        user.last_name = "Liddell".to_string();
        assert_eq!(user.full_name(), "Alice Liddell");
    }
}
