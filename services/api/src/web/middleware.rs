//! services/api/src/web/middleware.rs
//!
//! Authentication middleware and authorization helpers for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::token::verify_token;
use crate::web::{error_response, ErrorResponse};
use grocerymart_core::domain::Role;

/// The verified identity attached to a request after token validation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Pulls the token out of an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware that validates the bearer token and extracts the caller.
///
/// If valid, inserts an [`AuthUser`] into request extensions for handlers to
/// use. A missing token answers 401; a malformed or badly signed one, 400.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ErrorResponse> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Access denied"))?;

    let claims = verify_token(&state.token_keys, token)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid token"))?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Handler-level gate for admin-only catalog writes: validates the bearer
/// token and requires the admin role.
pub fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ErrorResponse> {
    let token = bearer_token(headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Access denied"))?;

    let claims = verify_token(&state.token_keys, token)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid token"))?;

    if claims.role != Role::Admin {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Admin access required",
        ));
    }

    Ok(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    })
}
