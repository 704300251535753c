use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use thiserror::Error;

use crate::{
    api,
    clients::{FeedClient, FeedError, HttpFeedClient},
    config::Config,
    domain::NewsSource,
    lexicon::LexicalResources,
    observability::Telemetry,
    pipeline::{FeedAggregator, FeedTableCache},
    report::ObjectivityReport,
};

/// Most posts the feed gateway will page back through for one handle.
pub const MAX_REPORT_LIMIT: usize = 3200;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown news source: {0}")]
    UnknownSource(String),
    #[error("limit must be between 1 and {MAX_REPORT_LIMIT}, got {0}")]
    InvalidLimit(usize),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn feed(&self) -> &Arc<dyn FeedClient> {
        self.registry.aggregator.feed()
    }

    pub(crate) fn cache(&self) -> &FeedTableCache {
        &self.registry.cache
    }
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    aggregator: FeedAggregator,
    cache: FeedTableCache,
}

impl ComponentRegistry {
    /// Initializes telemetry, loads the lexicons and builds the feed client.
    ///
    /// # Errors
    /// Fails when telemetry, the lexicons or the HTTP client cannot be set up.
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new()?;
        let feed = Arc::new(
            HttpFeedClient::new(config.feed_client_config())
                .context("failed to build feed gateway client")?,
        );
        Self::with_feed(config, telemetry, feed)
    }

    /// Builds the registry around an existing feed client.
    ///
    /// # Errors
    /// Fails when the lexicons cannot be loaded.
    pub fn with_feed(config: Config, telemetry: Telemetry, feed: Arc<dyn FeedClient>) -> Result<Self> {
        let config = Arc::new(config);
        let resources = LexicalResources::from_optional_dir(config.lexicon_dir())
            .context("failed to load lexical resources")?;
        let metrics = Arc::clone(telemetry.metrics());
        let aggregator = FeedAggregator::new(
            feed,
            resources,
            &config.report_options(),
            Arc::clone(&metrics),
        );
        let cache = FeedTableCache::new(config.report_cache_ttl(), metrics);

        Ok(Self {
            config,
            telemetry,
            aggregator,
            cache,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Builds the report for `handle`, reusing a cached feed table when one
    /// is fresh. `limit` defaults to the configured sample size.
    ///
    /// # Errors
    /// Returns [`ReportError`] for unknown handles, invalid limits and feed
    /// failures.
    pub async fn report(
        &self,
        handle: &str,
        limit: Option<usize>,
    ) -> Result<ObjectivityReport, ReportError> {
        let source: NewsSource = self
            .config
            .source_by_handle(handle)
            .cloned()
            .ok_or_else(|| ReportError::UnknownSource(handle.to_string()))?;
        let limit = limit.unwrap_or_else(|| self.aggregator.default_limit());
        if limit == 0 || limit > MAX_REPORT_LIMIT {
            return Err(ReportError::InvalidLimit(limit));
        }

        let table = self
            .cache
            .get_or_fetch(&source.handle, limit, || {
                self.aggregator.fetch_and_score(&source.handle, limit)
            })
            .await?;

        Ok(ObjectivityReport::build(
            source,
            &table,
            self.config.report_rolling_window().get(),
            self.config.report_rolling_min_periods().get(),
        ))
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}
