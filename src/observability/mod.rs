pub(crate) mod metrics;
pub(crate) mod tracing;

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};

pub use self::metrics::Metrics;

/// Owns the metrics registry and wires up tracing.
#[derive(Debug, Clone)]
pub struct Telemetry {
    registry: Arc<Registry>,
    metrics: Arc<Metrics>,
}

impl Telemetry {
    /// Initializes tracing once per process and registers all metrics.
    ///
    /// # Errors
    /// Returns an error when the subscriber or a metric cannot be installed.
    pub fn new() -> Result<Self> {
        tracing::init()?;
        Self::metrics_only()
    }

    /// Registers metrics without touching the global subscriber.
    ///
    /// # Errors
    /// Returns an error when a metric cannot be registered.
    pub fn metrics_only() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let metrics = Arc::new(Metrics::new(Arc::clone(&registry))?);
        Ok(Self { registry, metrics })
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn record_ready_probe(&self) {
        ::tracing::info!("service ready probe recorded");
    }

    pub fn record_live_probe(&self) {
        ::tracing::debug!("service live probe");
    }

    pub fn record_cache_invalidation(&self, handle: Option<&str>) {
        ::tracing::info!(handle = handle.unwrap_or("*"), "feed table cache invalidated");
    }

    /// Renders this registry in the Prometheus text format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(error) = encoder.encode(&metric_families, &mut buffer) {
            ::tracing::warn!(error = %error, "failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_metrics_include_registered_counters() {
        let telemetry = Telemetry::metrics_only().expect("telemetry builds");
        telemetry.metrics().posts_fetched.inc_by(3.0);

        let rendered = telemetry.render_prometheus();

        assert!(rendered.contains("objectivity_posts_fetched_total 3"));
        assert!(rendered.contains("objectivity_fetch_duration_seconds"));
    }

    #[test]
    fn registries_are_independent() {
        let first = Telemetry::metrics_only().expect("telemetry builds");
        let second = Telemetry::metrics_only().expect("telemetry builds");
        first.metrics().cache_hits.inc();

        assert!(second.render_prometheus().contains("objectivity_cache_hits_total 0"));
    }
}
