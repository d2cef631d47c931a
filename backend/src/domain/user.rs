//! User accounts owning parcels.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Role assigned to freshly registered accounts.
pub const DEFAULT_ROLE: &str = "user";

/// A registered account. Passwords are stored only as hashes produced by the
/// auth provider port; the domain never sees plaintext beyond registration
/// and login inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation errors raised during account registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("full name must not be empty")]
    EmptyFullName,
    #[error("email is not a plausible address")]
    InvalidEmail,
    #[error("password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

impl User {
    /// Build a new unverified account with the default role.
    ///
    /// `password_hash` must already be hashed by the auth provider.
    pub fn new(
        email: String,
        password_hash: String,
        full_name: String,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        if full_name.trim().is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        let Some((local, domain)) = email.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            phone,
            role: DEFAULT_ROLE.to_owned(),
            verified: false,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_accounts_default_to_user_role() {
        let user = User::new(
            "ada@example.com".to_owned(),
            "$argon2id$stub".to_owned(),
            "Ada Osei".to_owned(),
            None,
            Utc::now(),
        )
        .expect("valid account");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert!(!user.verified);
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("@missing-local.com")]
    #[case("user@")]
    #[case("user@nodot")]
    fn implausible_emails_are_rejected(#[case] email: &str) {
        let err = User::new(
            email.to_owned(),
            "$argon2id$stub".to_owned(),
            "Ada Osei".to_owned(),
            None,
            Utc::now(),
        )
        .expect_err("bad email");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }

    #[rstest]
    fn blank_full_name_is_rejected() {
        let err = User::new(
            "ada@example.com".to_owned(),
            "$argon2id$stub".to_owned(),
            "  ".to_owned(),
            None,
            Utc::now(),
        )
        .expect_err("blank name");
        assert_eq!(err, UserValidationError::EmptyFullName);
    }
}
