// src/lib.rs
// Public library surface for the server binary, the importer, and integration tests.

pub mod api;
pub mod auth;
pub mod autobuild;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod model;
pub mod ratelimit;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::autobuild::auto_build;
pub use crate::config::AppConfig;

use std::sync::Arc;

use axum::Router;
use tracing::{info, warn};

use crate::store::{MemoryStore, PgStore, Store};

/// Build the application router from config: Postgres when `DATABASE_URL`
/// is set (migrating first if enabled), otherwise the in-memory store.
pub async fn app(config: &AppConfig) -> anyhow::Result<Router> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url).await?;
            if config.run_migrations {
                pg.migrate().await?;
            }
            Arc::new(pg)
        }
        None => {
            warn!("DATABASE_URL not set; running on the in-memory store (data is not persisted)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config);
    info!(
        rate_limit = config.rate_limit_per_minute,
        cors_origin = %config.cors_origin,
        "router ready"
    );
    Ok(router(state))
}
