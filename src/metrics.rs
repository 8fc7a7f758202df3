use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process and return its handle.
/// Routers built later (tests build many) share the same recorder.
pub fn handle() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(h) => h,
            Err(e) => {
                // Some other recorder owns the global slot; expose an empty one.
                tracing::warn!(error = %e, "prometheus recorder not installed");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let handle = handle();
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}

pub fn record_auto_build(cards_added: usize) {
    metrics::counter!("autobuild_runs_total").increment(1);
    metrics::counter!("autobuild_cards_added_total").increment(cards_added as u64);
    metrics::histogram!("autobuild_deck_size").record(cards_added as f64);
}

pub fn record_csv_import(added: u64, skipped: u64) {
    metrics::counter!("inventory_csv_rows_added_total").increment(added);
    metrics::counter!("inventory_csv_rows_skipped_total").increment(skipped);
}

pub fn record_login(ok: bool) {
    let outcome = if ok { "success" } else { "failure" };
    metrics::counter!("logins_total", "outcome" => outcome).increment(1);
}
