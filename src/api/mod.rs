//! HTTP surface: shared state, router wiring, and cross-cutting layers.

mod accounts;
mod catalog;
mod decks;
mod extract;
mod inventory;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::{JwtKeys, DEFAULT_ITERATIONS};
use crate::config::AppConfig;
use crate::ratelimit::{rate_limit, RateLimiter};
use crate::store::Store;

/// Everything a handler needs, passed explicitly; no process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtKeys,
    pub limiter: Arc<RateLimiter>,
    pub cors_origin: String,
    pub password_iterations: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            store,
            jwt: JwtKeys::new(&config.jwt_secret, Duration::hours(config.jwt_ttl_hours)),
            limiter: Arc::new(
                RateLimiter::per_minute(config.rate_limit_per_minute)
                    .with_trusted_proxy_hops(config.trusted_proxy_hops),
            ),
            cors_origin: config.cors_origin.clone(),
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Lower the PBKDF2 cost (tests, local runs).
    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations.max(1);
        self
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    let api = Router::new()
        .route("/api/health", get(health))
        .route("/api/register", post(accounts::register))
        .route("/api/login", post(accounts::login))
        .route("/api/expansions", get(catalog::list_expansions))
        .route("/api/cards", get(catalog::search_cards))
        .route("/api/inventory", get(inventory::list).post(inventory::add))
        .route("/api/inventory/import-csv", post(inventory::import_csv))
        .route("/api/decks", get(decks::list).post(decks::create))
        .route("/api/decks/auto-build", post(decks::auto_build))
        .route("/api/decks/{id}", get(decks::get))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state);

    api.merge(crate::metrics::router())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return base.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(v) => base.allow_origin(v),
        Err(_) => {
            warn!(origin, "invalid CORS_ORIGIN, allowing any origin");
            base.allow_origin(Any)
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "ptcg-api",
        "time": Utc::now().to_rfc3339(),
    }))
}
