pub(crate) mod cache;
pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod report;
pub(crate) mod sources;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route("/v1/sources", get(sources::list))
        .route("/v1/sources/{handle}/report", get(report::source_report))
        .route("/v1/cache", delete(cache::clear))
        .route("/v1/cache/{handle}", delete(cache::invalidate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
