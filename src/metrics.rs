//! Metrics and observability
//!
//! Prometheus metrics via the metrics-rs facade, exposed on `/metrics`.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metrics prefix for all LexPlain metrics
pub const METRICS_PREFIX: &str = "lexplain";

/// Install the Prometheus recorder and return the exposition route
pub fn setup_metrics() -> anyhow::Result<Router<crate::services::AppState>> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    Ok(Router::new().route(
        "/metrics",
        get(move || std::future::ready(handle.render())),
    ))
}

/// Register all metric descriptions
fn register_metrics() {
    describe_counter!(
        format!("{}_uploads_total", METRICS_PREFIX),
        Unit::Count,
        "Documents uploaded and stored in a session"
    );

    describe_counter!(
        format!("{}_chat_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Follow-up questions answered against a stored document"
    );

    describe_counter!(
        format!("{}_sessions_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total document sessions created"
    );

    describe_counter!(
        format!("{}_sessions_expired_total", METRICS_PREFIX),
        Unit::Count,
        "Sessions removed by TTL expiry or explicit invalidation"
    );

    describe_gauge!(
        format!("{}_sessions_active", METRICS_PREFIX),
        Unit::Count,
        "Currently live document sessions"
    );

    describe_counter!(
        format!("{}_provider_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Answer provider failures that moved on to the next provider"
    );

    describe_counter!(
        format!("{}_translation_degradations_total", METRICS_PREFIX),
        Unit::Count,
        "Translation failures degraded to untranslated text"
    );
}
