//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/users/register
//! POST /api/v1/users/login
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::ports::{LoginRequest, RegisterUserRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Register an account.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = crate::domain::ports::AuthenticatedResponse),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 409, description = "Email already registered", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users/register")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let response = state.users.register_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Authenticate by email and password.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = crate::domain::ports::AuthenticatedResponse),
        (status = 401, description = "Invalid credentials", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let response = state.users.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
