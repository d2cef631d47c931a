//! Driving port for account registration and login.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::User;
use crate::domain::Error;

/// Serializable account projection; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            full_name: value.full_name,
            phone: value.phone,
            role: value.role,
            verified: value.verified,
            created_at: value.created_at,
        }
    }
}

/// Request to register a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Request to authenticate an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying the account and a fresh session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedResponse {
    pub user: UserPayload,
    pub token: String,
}

/// Driving port for account write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Registers an account and returns it with a session token.
    async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<AuthenticatedResponse, Error>;

    /// Authenticates by email and password.
    async fn login(&self, request: LoginRequest) -> Result<AuthenticatedResponse, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserCommand;

#[async_trait]
impl UserCommand for FixtureUserCommand {
    async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<AuthenticatedResponse, Error> {
        let user = User::new(
            request.email,
            "fixture-hash".to_owned(),
            request.full_name,
            request.phone,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = format!("token:{}", user.id);
        Ok(AuthenticatedResponse {
            user: user.into(),
            token,
        })
    }

    async fn login(&self, _request: LoginRequest) -> Result<AuthenticatedResponse, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }
}
