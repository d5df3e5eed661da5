//! Authentication module: JWT issuance/verification and password digests.
//!
//! Password hashing and token mechanics are deliberately self-contained so
//! the rest of the server treats auth as an opaque capability.

mod extractor;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

pub use extractor::AuthUser;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::Claims;

/// Issues and verifies JWT access tokens.
///
/// The signing secret is wrapped in `SecretString` so it never shows up in
/// debug output and is zeroized on drop.
#[derive(Clone)]
pub struct AuthService {
    secret: SecretString,
    expiry_hours: u64,
}

impl AuthService {
    pub fn new(secret: String, expiry_hours: u64) -> Self {
        AuthService {
            secret: SecretString::from(secret),
            expiry_hours,
        }
    }

    /// Issue a signed token for the given user.
    pub fn issue_token(&self, user_id: Uuid, username: &str, role: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + (self.expiry_hours as i64) * 3600,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Unauthorized(format!("Failed to issue token: {}", e)))
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthService([REDACTED])")
    }
}

/// Hash a password with a fresh random salt. Stored as "salt$hexdigest".
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let salt_hex = hex::encode(salt);
    format!("{}${}", salt_hex, digest_with_salt(&salt_hex, password))
}

/// Verify a password against a stored "salt$hexdigest" value.
///
/// `ConstantTimeEq` compares both digests in full regardless of where they
/// first differ, so timing does not leak how close a guess was.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    let computed = digest_with_salt(salt_hex, password);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn digest_with_salt(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Ensure the admin account exists, creating it from config on first start.
pub async fn ensure_default_admin(pool: &DbPool, config: &Config) -> AppResult<()> {
    if pool.find_user_by_username("admin").await?.is_some() {
        tracing::debug!("Admin user already exists");
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password);
    pool.insert_user("admin", &password_hash, "admin").await?;
    tracing::info!("Default admin user created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("s3cret");
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("wrong", &stored));
    }

    #[test]
    fn test_distinct_salts() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_malformed_stored_hash_rejected() {
        assert!(!verify_password("anything", "no-dollar-separator"));
    }

    #[test]
    fn test_token_roundtrip() {
        let service = AuthService::new("test-secret".to_string(), 24);
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id, "admin", "admin").unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = AuthService::new("test-secret".to_string(), 24);
        let other = AuthService::new("other-secret".to_string(), 24);
        let token = other.issue_token(Uuid::new_v4(), "admin", "admin").unwrap();

        assert!(service.verify_token(&token).is_err());
    }
}
