//! Port for password hashing and session token issuance.

use uuid::Uuid;

/// Errors raised by auth provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthProviderError {
    /// Hashing or token construction failed internally.
    #[error("auth provider failure: {message}")]
    Internal { message: String },
}

impl AuthProviderError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Claims embedded in an issued session token.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenClaims {
    /// Subject: the account id.
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// Expiry as a unix timestamp, seconds.
    pub exp: i64,
}

/// Port for credential hashing and token issuance.
///
/// Hashing is deliberately synchronous: argon2 is CPU bound and callers run
/// it on a blocking thread when needed.
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash_password(&self, password: &str) -> Result<String, AuthProviderError>;

    /// Check a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthProviderError>;

    /// Issue a signed session token for the given claims.
    fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthProviderError>;
}

/// Fixture provider with transparent hashing, for service tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

impl AuthProvider for FixtureAuthProvider {
    fn hash_password(&self, password: &str) -> Result<String, AuthProviderError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthProviderError> {
        Ok(hash == format!("hashed:{password}"))
    }

    fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthProviderError> {
        Ok(format!("token:{}", claims.sub))
    }
}
