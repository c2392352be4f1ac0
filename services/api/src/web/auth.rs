//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for account registration and login.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::token::issue_token;
use crate::web::{error_response, ErrorResponse};
use grocerymart_core::domain::{Role, User, UserCredentials};
use grocerymart_core::ports::{NewUser, PortError};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
        }
    }
}

impl From<&UserCredentials> for UserDto {
    fn from(creds: &UserCredentials) -> Self {
        Self {
            id: creds.id,
            name: creds.name.clone(),
            email: creds.email.clone(),
            role: creds.role.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    // 1. Reject an email that is already registered
    let existing = state.accounts.find_by_email(&req.email).await.map_err(|e| {
        error!("Failed to look up user: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
    })?;
    if existing.is_some() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "User already exists",
        ));
    }

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })?
        .to_string();

    // 3. Create the account
    let user = state
        .accounts
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                error_response(StatusCode::BAD_REQUEST, "User already exists")
            }
            e => {
                error!("Failed to create user: {:?}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
            }
        })?;

    // 4. Issue a bearer token
    let token = issue_token(&state.token_keys, user.id, user.role).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserDto::from(user),
        }),
    ))
}

/// POST /api/auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    // 1. Get the stored credentials
    let creds = state
        .accounts
        .find_by_email(&req.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
        })?
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Invalid credentials"))?;

    // 2. Verify the password
    let parsed_hash = PasswordHash::new(&creds.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid credentials",
        ));
    }

    // 3. Issue a bearer token
    let token = issue_token(&state.token_keys, creds.id, creds.role).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
    })?;

    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(&creds),
    }))
}
