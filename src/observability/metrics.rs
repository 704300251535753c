use std::sync::Arc;

use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry, register_histogram_with_registry,
};

/// Prometheus collectors for the fetch and scoring pipeline.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub posts_fetched: Counter,
    pub posts_scored: Counter,
    pub feed_failures: Counter,
    pub cache_hits: Counter,
    pub cache_misses: Counter,

    pub fetch_duration: Histogram,
    pub scoring_duration: Histogram,
}

impl Metrics {
    /// Registers every collector on `registry`.
    ///
    /// # Errors
    /// Fails when a collector with the same name is already registered.
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            posts_fetched: register_counter_with_registry!(
                "objectivity_posts_fetched_total",
                "Total number of posts received from the feed",
                registry
            )?,
            posts_scored: register_counter_with_registry!(
                "objectivity_posts_scored_total",
                "Total number of posts normalized and scored",
                registry
            )?,
            feed_failures: register_counter_with_registry!(
                "objectivity_feed_failures_total",
                "Total number of failed feed fetches",
                registry
            )?,
            cache_hits: register_counter_with_registry!(
                "objectivity_cache_hits_total",
                "Feed table lookups served from cache",
                registry
            )?,
            cache_misses: register_counter_with_registry!(
                "objectivity_cache_misses_total",
                "Feed table lookups that triggered a fetch",
                registry
            )?,
            fetch_duration: register_histogram_with_registry!(
                "objectivity_fetch_duration_seconds",
                "Duration of feed fetches",
                registry
            )?,
            scoring_duration: register_histogram_with_registry!(
                "objectivity_scoring_duration_seconds",
                "Duration of normalizing and scoring one feed table",
                registry
            )?,
        })
    }
}
