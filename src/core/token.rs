//! TokenManager - emissione e verifica dei JWT
//!
//! Stateless: l'unico stato è il segreto (immutabile) e la durata dei token,
//! quindi un `TokenManager` si condivide tra i task senza lock.

use super::error::AuthError;
use crate::entities::User;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Identità trasportata dal token e inserita nelle extensions della richiesta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for Claims {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Payload effettivamente firmato: claims applicativi + campi temporali standard
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(flatten)]
    claims: Claims,
    sub: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// Token appena firmato con la sua scadenza assoluta (unix seconds)
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Firma un token HS256 con iat = nbf = adesso e exp = adesso + lifetime
    #[instrument(skip_all, fields(user_id = %claims.user_id))]
    pub fn issue(&self, claims: &Claims) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let lifetime = chrono::Duration::from_std(self.lifetime)
            .map_err(|e| AuthError::Internal(format!("token lifetime out of range: {e}")))?;
        let expires_at = (now + lifetime).timestamp();

        let payload = TokenPayload {
            claims: claims.clone(),
            sub: claims.username.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key).map_err(|e| {
            error!("Failed to encode JWT token: {:?}", e);
            AuthError::Internal("failed to sign token".to_string())
        })?;

        debug!("JWT token issued, expires at {}", expires_at);
        Ok(IssuedToken { token, expires_at })
    }

    /// Verifica algoritmo, firma e scadenza. Ogni fallimento è `InvalidToken`.
    #[instrument(skip_all)]
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let payload = self.decode_verified(token)?;

        if is_past(payload.exp) {
            debug!("JWT token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(payload.claims)
    }

    /// `true` se il token è scaduto oppure non verificabile
    pub fn is_expired(&self, token: &str) -> bool {
        match self.decode_verified(token) {
            Ok(payload) => is_past(payload.exp),
            Err(_) => true,
        }
    }

    /// Legge i claims SENZA verificare firma e scadenza.
    /// Solo per diagnostica: il risultato non è un'identità autenticata.
    pub fn extract_claims_unverified(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        decode::<TokenPayload>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    fn decode_verified(&self, token: &str) -> Result<TokenPayload, AuthError> {
        // Solo HS256: un header con un altro algoritmo viene rifiutato
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // exp controllato a mano in validate/is_expired (granularità al secondo, senza leeway)
        validation.validate_exp = false;

        decode::<TokenPayload>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Failed to decode JWT token: {:?}", e.kind());
                AuthError::InvalidToken
            })
    }
}

fn is_past(exp: i64) -> bool {
    exp <= Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            user_id: 7,
            username: "abc".to_string(),
            email: "a@b.co".to_string(),
            is_admin: false,
        }
    }

    fn manager(secret: &str) -> TokenManager {
        TokenManager::new(secret, Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_then_validate_returns_same_claims() {
        let tm = manager("A");
        let issued = tm.issue(&claims()).unwrap();
        assert!(!issued.token.is_empty());
        assert!(issued.expires_at > Utc::now().timestamp());
        assert_eq!(tm.validate(&issued.token).unwrap(), claims());
        assert!(!tm.is_expired(&issued.token));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issued = manager("A").issue(&claims()).unwrap();
        let other = manager("B");
        assert_eq!(other.validate(&issued.token), Err(AuthError::InvalidToken));
        assert!(other.is_expired(&issued.token));
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let now = Utc::now().timestamp();
        let payload = TokenPayload {
            claims: claims(),
            sub: "abc".to_string(),
            iat: now,
            nbf: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &payload,
            &EncodingKey::from_secret(b"A"),
        )
        .unwrap();
        assert_eq!(manager("A").validate(&token), Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_short_lived_token_expires() {
        let tm = TokenManager::new("A", Duration::from_millis(1));
        let issued = tm.issue(&claims()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(tm.validate(&issued.token), Err(AuthError::InvalidToken));
        assert!(tm.is_expired(&issued.token));
    }

    #[test]
    fn test_unverified_extract_ignores_signature() {
        let issued = manager("A").issue(&claims()).unwrap();
        let other = manager("B");
        assert!(other.validate(&issued.token).is_err());
        assert_eq!(other.extract_claims_unverified(&issued.token).unwrap(), claims());
    }

    #[test]
    fn test_malformed_tokens() {
        let tm = manager("A");
        for token in ["", "not-a-token", "a.b.c"] {
            assert_eq!(tm.validate(token), Err(AuthError::InvalidToken));
            assert!(tm.is_expired(token));
            assert!(tm.extract_claims_unverified(token).is_err());
        }
    }

    #[test]
    fn test_subject_is_username() {
        let issued = manager("A").issue(&claims()).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.sub = Some("abc".to_string());
        let decoded = decode::<TokenPayload>(&issued.token, &DecodingKey::from_secret(b"A"), &validation);
        assert!(decoded.is_ok());
    }
}
