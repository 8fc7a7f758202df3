// tests/common/mod.rs
//
// Shared fixtures: an in-memory store with a small catalog, a router over it,
// and request helpers that drive the router without opening sockets.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

use ptcg_deck_api::catalog::import_catalog;
use ptcg_deck_api::model::{NewCard, NewExpansion};
use ptcg_deck_api::store::{MemoryStore, Store};
use ptcg_deck_api::{router, AppConfig, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

pub fn test_config() -> AppConfig {
    AppConfig {
        rate_limit_per_minute: 10_000,
        ..AppConfig::default()
    }
}

pub fn app_with(store: Arc<MemoryStore>, config: &AppConfig) -> Router {
    let state = AppState::new(store, config).with_password_iterations(1_000);
    router(state)
}

pub fn app(store: Arc<MemoryStore>) -> Router {
    app_with(store, &test_config())
}

/// Catalog used across tests:
/// - P1..P6: non-basic Pokemon, Standard + Expanded
/// - T1..T9: Trainers, Standard + Expanded
/// - "Fire Energy": basic Energy, Standard + Expanded
/// - "Old Trainer": Expanded-only Trainer
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    let sets: Vec<NewExpansion> = serde_json::from_value(json!([
        { "name": "Scarlet & Violet", "series": "SV", "set_code": "SVI", "release_date": "2023-03-31" },
        { "name": "Black & White", "series": "BW", "set_code": "BLW", "release_date": "2011-04-25" }
    ]))
    .expect("sets json");

    let mut cards = Vec::new();
    for i in 1..=6 {
        cards.push(json!({
            "name": format!("P{i}"), "set_code": "SVI", "card_number": format!("{i}"),
            "card_type": "Pokemon", "legal_standard": true, "legal_expanded": true
        }));
    }
    for i in 1..=9 {
        cards.push(json!({
            "name": format!("T{i}"), "set_code": "SVI", "card_number": format!("1{i:02}"),
            "card_type": "Trainer", "legal_standard": true, "legal_expanded": true
        }));
    }
    cards.push(json!({
        "name": "Fire Energy", "set_code": "SVI", "card_number": "230",
        "card_type": "Energy", "is_basic_energy": true,
        "legal_standard": true, "legal_expanded": true
    }));
    cards.push(json!({
        "name": "Old Trainer", "set_code": "BLW", "card_number": "99",
        "card_type": "Trainer", "legal_standard": false, "legal_expanded": true
    }));
    let cards: Vec<NewCard> = serde_json::from_value(Value::Array(cards)).expect("cards json");

    import_catalog(store.as_ref(), &sets, &cards)
        .await
        .expect("seed catalog");
    store
}

pub async fn card_id(store: &MemoryStore, name: &str) -> i64 {
    store
        .search_cards(Some(name))
        .await
        .expect("search")
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("card {name} not seeded"))
        .id
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, v)
}

pub fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(body.to_string())).expect("build request")
}

pub fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::empty()).expect("build request")
}

/// Register + login; returns `(user_id, token)`.
pub async fn signup(app: &Router, email: &str) -> (i64, String) {
    let creds = json!({ "email": email, "password": "correct horse" });

    let (status, v) = send(app, json_req("POST", "/api/register", None, creds.clone())).await;
    assert_eq!(status, StatusCode::OK, "register: {v}");
    let id = v["id"].as_i64().expect("id");

    let (status, v) = send(app, json_req("POST", "/api/login", None, creds)).await;
    assert_eq!(status, StatusCode::OK, "login: {v}");
    let token = v["token"].as_str().expect("token").to_string();
    (id, token)
}
