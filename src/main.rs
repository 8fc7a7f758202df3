//! Deck API: binary entrypoint
//! Boots the Axum HTTP server: config from env, storage, routes, middleware.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ptcg_deck_api::AppConfig;

/// Compact logs in development, JSON otherwise. `try_init` so a subscriber
/// already installed by the hosting runtime is left alone.
fn init_tracing() {
    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("APP_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if is_dev_env {
        registry.with(fmt::layer().compact()).try_init()
    } else {
        registry.with(fmt::layer().json().with_target(false)).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env()?;
    let router = ptcg_deck_api::app(&config).await?;

    Ok(router.into())
}
