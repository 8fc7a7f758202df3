//! Fixed-window request limiter keyed by client address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

use crate::api::AppState;
use crate::error::ApiError;

const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    proxy_hops: usize,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            proxy_hops: 1,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Number of proxies in front of the server that append to
    /// `X-Forwarded-For`. Zero ignores the header entirely.
    pub fn with_trusted_proxy_hops(mut self, hops: usize) -> Self {
        self.proxy_hops = hops;
        self
    }

    pub fn trusted_proxy_hops(&self) -> usize {
        self.proxy_hops
    }

    pub fn per_minute(max: u32) -> Self {
        Self::new(max, Duration::from_secs(60))
    }

    /// Record one hit for `key` at `now`; false once the window is exhausted.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock();

        if clients.len() > PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let w = clients.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(w.started) >= self.window {
            *w = Window {
                started: now,
                hits: 0,
            };
        }
        if w.hits >= self.max {
            return false;
        }
        w.hits += 1;
        true
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}

/// Client address as reported by the nearest trusted proxy.
///
/// Every proxy appends the address it received the request from, so the
/// entry `hops` places from the right is the first one a client cannot forge;
/// anything left of it is client-supplied and ignored. With `hops == 0`, or a
/// chain shorter than `hops`, the socket peer is used if the server was
/// started with connect info.
fn client_key(req: &Request, hops: usize) -> Option<String> {
    if hops > 0 {
        let chain: Vec<&str> = req
            .headers()
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if chain.len() >= hops {
            return Some(chain[chain.len() - hops].to_string());
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // Behind the hosting proxy every request carries X-Forwarded-For. A request
    // without any address is not pooled with others into one shared bucket.
    let Some(key) = client_key(&req, state.limiter.trusted_proxy_hops()) else {
        tracing::debug!("no client address; request not rate limited");
        return next.run(req).await;
    };
    if !state.limiter.check(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        metrics::counter!("http_rate_limited_total").increment(1);
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}
