//! Admin authentication.
//!
//! This module provides:
//! - `CredentialStore` - checks an admin username/password pair
//! - `TokenIssuer` - signs and verifies HS256 admin session tokens
//! - `AdminAuth` - extractor guarding every admin endpoint

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AdminCredentials;
use crate::error::ApiError;
use crate::state::AppState;

/// Role embedded in every issued token.
pub const ADMIN_ROLE: &str = "admin";

/// Session token validity.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Token verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("missing token")]
    MissingToken,

    /// Bad signature, expired, or not an admin token.
    #[error("invalid token")]
    InvalidToken,
}

/// Checks admin login attempts.
pub trait CredentialStore: Send + Sync {
    /// Whether `username`/`password` is the admin login.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Credential store backed by the configured admin login.
///
/// Only the SHA-256 digest of the password is held in memory.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredCredentials {
    admin: Option<AdminCredentials>,
}

impl ConfiguredCredentials {
    /// Create a store for the given admin login. `None` rejects every attempt.
    #[must_use]
    pub fn new(admin: Option<AdminCredentials>) -> Self {
        Self { admin }
    }

    /// Whether an admin login is configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.admin.is_some()
    }
}

impl CredentialStore for ConfiguredCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let Some(admin) = &self.admin else {
            return false;
        };
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        admin.username == username && admin.password_sha256 == digest
    }
}

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the admin username).
    pub sub: String,
    /// Admin username.
    pub username: String,
    /// Always `"admin"`.
    pub role: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Signs and verifies admin session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the standard 24-hour validity.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Create an issuer with a custom validity window.
    #[must_use]
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for `username`.
    ///
    /// # Errors
    ///
    /// Returns the signing error, which only occurs with a malformed key.
    pub fn issue(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            username: username.to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on a bad signature, an expired token,
    /// or a token without the admin role.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            AuthError::InvalidToken
        })?;

        if data.claims.role != ADMIN_ROLE {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

/// An authenticated admin, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// The admin username from the token.
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.verify(token)?;

        Ok(AdminAuth {
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_credentials_check_both_fields() {
        let store = ConfiguredCredentials::new(Some(AdminCredentials::from_plain("Aga", "pw")));
        assert!(store.verify("Aga", "pw"));
        assert!(!store.verify("Aga", "wrong"));
        assert!(!store.verify("aga", "pw"));
        assert!(!store.verify("", ""));
    }

    #[test]
    fn unconfigured_credentials_reject_everything() {
        let store = ConfiguredCredentials::default();
        assert!(!store.is_configured());
        assert!(!store.verify("", ""));
        assert!(!store.verify("admin", "admin"));
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new("secret");
        let token = issuer.issue("Aga").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.username, "Aga");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = TokenIssuer::new("one").issue("Aga").unwrap();
        assert_eq!(
            TokenIssuer::new("two").verify(&token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        let issuer = TokenIssuer::with_ttl("secret", Duration::hours(-2));
        let token = issuer.issue("Aga").unwrap();
        assert_eq!(issuer.verify(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn garbage_is_invalid() {
        let issuer = TokenIssuer::new("secret");
        assert_eq!(
            issuer.verify("not-a-jwt").unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
