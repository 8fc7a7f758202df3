// src/config.rs
use std::env;

use anyhow::Context;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

fn default_jwt_ttl_hours() -> i64 {
    24 * 7
}
fn default_rate_limit() -> u32 {
    100
}

/// Runtime configuration, read from the environment (and `.env` in dev).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// "*" allows any origin.
    pub cors_origin: String,
    pub rate_limit_per_minute: u32,
    /// Proxies in front of the server that append to `X-Forwarded-For`.
    pub trusted_proxy_hops: usize,
    pub run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
            cors_origin: "*".to_string(),
            rate_limit_per_minute: default_rate_limit(),
            trusted_proxy_hops: 1,
            run_migrations: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = non_empty("DATABASE_URL");

        let jwt_secret = match (non_empty("JWT_SECRET"), &database_url) {
            (Some(s), _) => s,
            (None, Some(_)) => anyhow::bail!("JWT_SECRET must be set when DATABASE_URL is configured"),
            (None, None) => {
                warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt_ttl_hours = match non_empty("JWT_TTL_HOURS") {
            Some(v) => v.parse().context("JWT_TTL_HOURS must be an integer")?,
            None => default_jwt_ttl_hours(),
        };

        let rate_limit_per_minute = match non_empty("RATE_LIMIT_PER_MINUTE") {
            Some(v) => v.parse().context("RATE_LIMIT_PER_MINUTE must be a positive integer")?,
            None => default_rate_limit(),
        };

        let trusted_proxy_hops = match non_empty("TRUSTED_PROXY_HOPS") {
            Some(v) => v.parse().context("TRUSTED_PROXY_HOPS must be a non-negative integer")?,
            None => 1,
        };

        let run_migrations = non_empty("RUN_MIGRATIONS")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_hours,
            cors_origin: non_empty("CORS_ORIGIN").unwrap_or_else(|| "*".to_string()),
            rate_limit_per_minute,
            trusted_proxy_hops,
            run_migrations,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 7] = [
        "DATABASE_URL",
        "JWT_SECRET",
        "JWT_TTL_HOURS",
        "CORS_ORIGIN",
        "RATE_LIMIT_PER_MINUTE",
        "TRUSTED_PROXY_HOPS",
        "RUN_MIGRATIONS",
    ];

    fn clear() {
        for k in KEYS {
            env::remove_var(k);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        clear();
        let cfg = AppConfig::from_env().expect("config");
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.jwt_ttl_hours, 168);
        assert_eq!(cfg.rate_limit_per_minute, 100);
        assert_eq!(cfg.cors_origin, "*");
        assert_eq!(cfg.trusted_proxy_hops, 1);
        assert!(cfg.run_migrations);
    }

    #[test]
    #[serial]
    fn database_requires_secret() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/ptcg");
        assert!(AppConfig::from_env().is_err());
        env::set_var("JWT_SECRET", "s3cret");
        let cfg = AppConfig::from_env().expect("config");
        assert_eq!(cfg.jwt_secret, "s3cret");
        clear();
    }

    #[test]
    #[serial]
    fn overrides_are_parsed() {
        clear();
        env::set_var("JWT_TTL_HOURS", "2");
        env::set_var("RATE_LIMIT_PER_MINUTE", "5");
        env::set_var("RUN_MIGRATIONS", "false");
        env::set_var("CORS_ORIGIN", "https://decks.example");
        env::set_var("TRUSTED_PROXY_HOPS", "0");
        let cfg = AppConfig::from_env().expect("config");
        assert_eq!(cfg.jwt_ttl_hours, 2);
        assert_eq!(cfg.rate_limit_per_minute, 5);
        assert!(!cfg.run_migrations);
        assert_eq!(cfg.cors_origin, "https://decks.example");
        assert_eq!(cfg.trusted_proxy_hops, 0);

        env::set_var("RATE_LIMIT_PER_MINUTE", "lots");
        assert!(AppConfig::from_env().is_err());
        clear();
    }
}
