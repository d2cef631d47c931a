//! Credential hashing and session token issuance.
//!
//! Passwords are hashed with argon2id using per-password random salts. Tokens
//! are compact two-segment strings: base64url claims followed by an
//! HMAC-SHA256 tag over the claims, keyed with the service signing key.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::ports::{AuthProvider, AuthProviderError, TokenClaims};

type HmacSha256 = Hmac<Sha256>;

/// Argon2-backed implementation of the auth provider port.
pub struct Argon2AuthProvider {
    signing_key: Vec<u8>,
}

impl Argon2AuthProvider {
    /// Build a provider that signs tokens with the given key.
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
        }
    }

    fn sign(&self, claims_segment: &str) -> Result<String, AuthProviderError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|_| AuthProviderError::internal("invalid token signing key"))?;
        mac.update(claims_segment.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

impl AuthProvider for Argon2AuthProvider {
    fn hash_password(&self, password: &str) -> Result<String, AuthProviderError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AuthProviderError::internal(format!("password hashing: {err}")))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthProviderError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|err| AuthProviderError::internal(format!("stored hash malformed: {err}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthProviderError> {
        let encoded = serde_json::to_vec(claims)
            .map_err(|err| AuthProviderError::internal(format!("claims encoding: {err}")))?;
        let claims_segment = URL_SAFE_NO_PAD.encode(encoded);
        let tag = self.sign(&claims_segment)?;
        Ok(format!("{claims_segment}.{tag}"))
    }
}
