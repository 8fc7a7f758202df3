// tests/metrics.rs
//
// /metrics exposes the Prometheus series recorded by the handlers.

mod common;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::*;

#[tokio::test]
async fn metrics_endpoint_reports_logins_and_auto_builds() {
    let app = app(seeded_store().await);
    let (_, token) = signup(&app, "ash@pallet.town").await;

    let (status, _) = send(
        &app,
        json_req("POST", "/api/decks/auto-build", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in ["logins_total", "autobuild_runs_total", "autobuild_cards_added_total"] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}

#[tokio::test]
async fn metrics_route_is_not_rate_limited_or_authenticated() {
    let app = app(seeded_store().await);
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
