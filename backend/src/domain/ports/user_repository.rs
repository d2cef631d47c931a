//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::user::User;

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The store rejected a duplicate email address.
    #[error("email {email} is already registered")]
    DuplicateEmail { email: String },
}

impl UserRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for email uniqueness violations.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Port for storing and looking up accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a freshly registered account.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Find an account by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }
}
