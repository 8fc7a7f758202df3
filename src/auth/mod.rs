//! Password hashing, token issuance, and the `AuthUser` extractor that guards
//! per-user routes.

pub mod jwt;
pub mod password;

pub use jwt::{extract_bearer, Claims, JwtKeys};
pub use password::{hash_password_with, verify_password, DEFAULT_ITERATIONS};

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use thiserror::Error;

use crate::api::AppState;
use crate::error::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header format, expected 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = extract_bearer(header)?;
        let claims = state.jwt.verify(token)?;
        Ok(AuthUser {
            user_id: claims.user_id,
        })
    }
}
