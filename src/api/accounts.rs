use axum::{extract::State, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::ApiJson;
use super::AppState;
use crate::auth::{hash_password_with, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::store::StoreError;

const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"));

#[derive(Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct Registered {
    id: i64,
}

#[derive(Serialize)]
pub struct LoginResp {
    token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<Json<Registered>> {
    let email = normalize_email(&body.email);
    if !EMAIL_RE.is_match(&email) {
        return Err(ApiError::Validation("email is not a valid address".into()));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let iterations = state.password_iterations;
    let password = body.password;
    let hash = tokio::task::spawn_blocking(move || hash_password_with(&password, iterations))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?;

    let id = match state.store.create_user(&email, &hash).await {
        Ok(id) => id,
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::Conflict("email already registered".into()))
        }
        Err(e) => return Err(e.into()),
    };
    info!(user_id = id, "registered user");
    Ok(Json(Registered { id }))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<Json<LoginResp>> {
    let email = normalize_email(&body.email);
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        metrics::record_login(false);
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let password = body.password;
    let stored = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?;
    metrics::record_login(ok);
    if !ok {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = state.jwt.issue(user.id).map_err(|e| ApiError::Internal(e.to_string()))?;
    info!(user_id = user.id, "login");
    Ok(Json(LoginResp { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(EMAIL_RE.is_match("ash@pallet.town"));
        assert!(!EMAIL_RE.is_match("ash"));
        assert!(!EMAIL_RE.is_match("ash@pallet"));
        assert!(!EMAIL_RE.is_match("a sh@pallet.town"));
    }

    #[test]
    fn emails_are_case_folded() {
        assert_eq!(normalize_email("  Ash@Pallet.Town "), "ash@pallet.town");
    }
}
