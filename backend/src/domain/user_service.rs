//! Account domain service: registration and login.
//!
//! Lookup and password failures both collapse to the same unauthorized
//! error so login responses do not reveal whether an email is registered.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::Error;
use crate::domain::ports::{
    AuthProvider, AuthProviderError, AuthenticatedResponse, LoginRequest, RegisterUserRequest,
    TokenClaims, UserCommand, UserRepository, UserRepositoryError,
};
use crate::domain::user::{MIN_PASSWORD_LEN, User};

/// Session token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

fn map_auth_error(error: AuthProviderError) -> Error {
    let AuthProviderError::Internal { message } = error;
    Error::internal(format!("auth provider error: {message}"))
}

/// Account service implementing the user command driving port.
#[derive(Clone)]
pub struct UserCommandService<R, A> {
    user_repo: Arc<R>,
    auth: Arc<A>,
}

impl<R, A> UserCommandService<R, A> {
    /// Create a new command service with the user repository and auth
    /// provider.
    pub fn new(user_repo: Arc<R>, auth: Arc<A>) -> Self {
        Self { user_repo, auth }
    }
}

impl<R, A> UserCommandService<R, A>
where
    A: AuthProvider,
{
    fn issue_token_for(&self, user: &User) -> Result<String, Error> {
        let claims = TokenClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        self.auth.issue_token(&claims).map_err(map_auth_error)
    }
}

#[async_trait]
impl<R, A> UserCommand for UserCommandService<R, A>
where
    R: UserRepository,
    A: AuthProvider,
{
    async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<AuthenticatedResponse, Error> {
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let hash = self
            .auth
            .hash_password(&request.password)
            .map_err(map_auth_error)?;
        let user = User::new(
            request.email,
            hash,
            request.full_name,
            request.phone,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.user_repo
            .create(&user)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(user_id = %user.id, "account registered");
        let token = self.issue_token_for(&user)?;
        Ok(AuthenticatedResponse {
            user: user.into(),
            token,
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthenticatedResponse, Error> {
        let invalid = || Error::unauthorized("invalid email or password");
        let user = self
            .user_repo
            .find_by_email(&request.email)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(invalid)?;
        if !self
            .auth
            .verify_password(&request.password, &user.password_hash)
            .map_err(map_auth_error)?
        {
            return Err(invalid());
        }

        let token = self.issue_token_for(&user)?;
        Ok(AuthenticatedResponse {
            user: user.into(),
            token,
        })
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
