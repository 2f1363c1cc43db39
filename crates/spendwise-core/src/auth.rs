//! Password hashing and bearer-token primitives
//!
//! Passwords are stored as Argon2id PHC strings and never leave the server.
//! API tokens are HS256 JWTs carrying the user id in `sub`, issued at
//! registration and login and verified on every authenticated request.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default token lifetime
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Hash a password for storage (Argon2id with a random salt, PHC format)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash
///
/// Returns false for wrong passwords and for unparseable hashes; callers
/// only need the yes/no answer.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// JWT claims: user id in `sub`, issued-at and expiry as unix timestamps
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens
///
/// Built once at startup from the configured secret and shared across
/// requests.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl_hours * 3600,
        }
    }

    /// Issue a token for a user
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a token and return the user id it was issued for
    ///
    /// Fails on a bad signature, an expired token, or a `sub` that is not
    /// an integer id.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())?;
        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| Error::Token(jsonwebtoken::errors::ErrorKind::InvalidSubject.into()))
    }
}
