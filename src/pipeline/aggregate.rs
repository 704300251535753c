//! Fetch → normalize → score for one source.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::clients::{FeedClient, FeedError};
use crate::domain::{FeedRow, FeedTable, Post, ReportOptions};
use crate::lexicon::LexicalResources;
use crate::observability::Metrics;

use super::{ObjectivityScorer, TextNormalizer};

#[derive(Clone)]
pub struct FeedAggregator {
    feed: Arc<dyn FeedClient>,
    normalizer: TextNormalizer,
    scorer: ObjectivityScorer,
    options: ReportOptions,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for FeedAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedAggregator")
            .field("normalizer", &self.normalizer)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FeedAggregator {
    #[must_use]
    pub fn new(
        feed: Arc<dyn FeedClient>,
        resources: Arc<LexicalResources>,
        options: &ReportOptions,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            feed,
            normalizer: TextNormalizer::new(Arc::clone(&resources), options.remove_stopwords),
            scorer: ObjectivityScorer::new(resources),
            options: options.clone(),
            metrics,
        }
    }

    #[must_use]
    pub fn feed(&self) -> &Arc<dyn FeedClient> {
        &self.feed
    }

    /// Limit used when a report request does not name one.
    #[must_use]
    pub fn default_limit(&self) -> usize {
        self.options.sample_size
    }

    /// Fetches up to `limit` recent posts for `handle` and scores each one.
    ///
    /// Rows keep the feed's delivery order. Feed failures are returned as-is
    /// and never retried here.
    ///
    /// # Errors
    /// Returns the [`FeedError`] raised by the feed client.
    #[allow(clippy::cast_precision_loss)]
    pub async fn fetch_and_score(&self, handle: &str, limit: usize) -> Result<FeedTable, FeedError> {
        let started = Instant::now();
        let posts = match self
            .feed
            .fetch_posts(handle, limit, self.options.language_filter.as_deref())
            .await
        {
            Ok(posts) => posts,
            Err(error) => {
                self.metrics.feed_failures.inc();
                warn!(handle, limit, error = %error, "feed fetch failed");
                return Err(error);
            }
        };
        self.metrics
            .fetch_duration
            .observe(started.elapsed().as_secs_f64());
        self.metrics.posts_fetched.inc_by(posts.len() as f64);

        let scoring_started = Instant::now();
        let rows: Vec<FeedRow> = posts
            .into_iter()
            .take(limit)
            .map(|post| self.score_post(post))
            .collect();
        self.metrics
            .scoring_duration
            .observe(scoring_started.elapsed().as_secs_f64());
        self.metrics.posts_scored.inc_by(rows.len() as f64);

        info!(
            handle,
            limit,
            rows = rows.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "feed table scored"
        );

        Ok(FeedTable::new(handle, limit, Utc::now(), rows))
    }

    #[must_use]
    pub fn score_post(&self, post: Post) -> FeedRow {
        let normalized = self.normalizer.normalize(&post.text);
        let scores = self.scorer.score(&normalized);
        FeedRow {
            timestamp: post.timestamp,
            text: normalized,
            scores,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};

    use super::*;
    use crate::observability::Telemetry;

    /// In-memory feed that counts fetches.
    pub(crate) struct StaticFeed {
        pub(crate) posts: Vec<Post>,
        pub(crate) fail_with_status: Option<u16>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_language: std::sync::Mutex<Option<String>>,
    }

    impl StaticFeed {
        pub(crate) fn with_texts(texts: &[&str]) -> Self {
            let posts = texts
                .iter()
                .enumerate()
                .map(|(index, text)| Post::new(*text, timestamp(i64::try_from(index).unwrap_or(0))))
                .collect();
            Self {
                posts,
                fail_with_status: None,
                calls: AtomicUsize::new(0),
                last_language: std::sync::Mutex::new(None),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                fail_with_status: Some(status),
                ..Self::with_texts(&[])
            }
        }
    }

    pub(crate) fn timestamp(offset_minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
            + chrono::Duration::minutes(offset_minutes)
    }

    #[async_trait]
    impl FeedClient for StaticFeed {
        async fn fetch_posts(
            &self,
            _handle: &str,
            limit: usize,
            language: Option<&str>,
        ) -> Result<Vec<Post>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_language.lock().expect("language lock") = language.map(str::to_string);
            if let Some(status) = self.fail_with_status {
                return Err(FeedError::Status {
                    status,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.posts.iter().take(limit).cloned().collect())
        }

        async fn ping(&self) -> Result<(), FeedError> {
            Ok(())
        }
    }

    fn aggregator(feed: Arc<StaticFeed>, options: &ReportOptions) -> (FeedAggregator, Telemetry) {
        let telemetry = Telemetry::metrics_only().expect("telemetry builds");
        let resources = LexicalResources::embedded().expect("embedded lexicons load");
        let aggregator =
            FeedAggregator::new(feed, resources, options, Arc::clone(telemetry.metrics()));
        (aggregator, telemetry)
    }

    #[tokio::test]
    async fn rows_follow_feed_order() {
        let feed = Arc::new(StaticFeed::with_texts(&[
            "RT @nytimes: Breaking! http://example.com #news",
            "officials met tuesday",
            "very good",
        ]));
        let (aggregator, telemetry) = aggregator(Arc::clone(&feed), &ReportOptions::default());

        let table = aggregator
            .fetch_and_score("nytimes", 10)
            .await
            .expect("fetch succeeds");

        let texts: Vec<_> = table.rows().iter().map(|row| row.text.as_str()).collect();
        assert_eq!(texts, vec!["Breaking news", "official met tuesday", "very good"]);
        assert_eq!(table.source_handle(), "nytimes");
        assert_eq!(table.limit(), 10);
        assert_eq!(table.rows()[1].timestamp, timestamp(1));
        assert!((table.rows()[1].scores.average_objectivity() - 1.0).abs() < 1e-9);
        assert!(
            telemetry
                .render_prometheus()
                .contains("objectivity_posts_scored_total 3")
        );
    }

    #[tokio::test]
    async fn limit_truncates_rows() {
        let feed = Arc::new(StaticFeed::with_texts(&["one", "two", "three"]));
        let (aggregator, _telemetry) = aggregator(Arc::clone(&feed), &ReportOptions::default());

        let table = aggregator.fetch_and_score("AP", 2).await.expect("fetch succeeds");

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn default_limit_comes_from_sample_size() {
        let feed = Arc::new(StaticFeed::with_texts(&[]));
        let options = ReportOptions {
            sample_size: 50,
            ..ReportOptions::default()
        };
        let (aggregator, _telemetry) = aggregator(feed, &options);

        assert_eq!(aggregator.default_limit(), 50);
    }

    #[tokio::test]
    async fn language_filter_is_forwarded() {
        let feed = Arc::new(StaticFeed::with_texts(&["one"]));
        let options = ReportOptions {
            language_filter: Some("en".to_string()),
            ..ReportOptions::default()
        };
        let (aggregator, _telemetry) = aggregator(Arc::clone(&feed), &options);

        aggregator.fetch_and_score("AP", 5).await.expect("fetch succeeds");

        assert_eq!(
            feed.last_language.lock().expect("language lock").as_deref(),
            Some("en")
        );
    }

    #[tokio::test]
    async fn feed_errors_propagate_unchanged() {
        let feed = Arc::new(StaticFeed::failing(500));
        let (aggregator, telemetry) = aggregator(Arc::clone(&feed), &ReportOptions::default());

        let error = aggregator
            .fetch_and_score("CNN", 5)
            .await
            .expect_err("fetch fails");

        assert!(matches!(error, FeedError::Status { status: 500, .. }));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
        assert!(
            telemetry
                .render_prometheus()
                .contains("objectivity_feed_failures_total 1")
        );
    }

    #[tokio::test]
    async fn stop_word_option_reaches_the_normalizer() {
        let feed = Arc::new(StaticFeed::with_texts(&["the vote was delayed"]));
        let options = ReportOptions {
            remove_stopwords: true,
            ..ReportOptions::default()
        };
        let (aggregator, _telemetry) = aggregator(Arc::clone(&feed), &options);

        let table = aggregator.fetch_and_score("AP", 5).await.expect("fetch succeeds");

        assert_eq!(table.rows()[0].text, "vote delayed");
    }

    #[tokio::test]
    async fn empty_feed_yields_empty_table() {
        let feed = Arc::new(StaticFeed::with_texts(&[]));
        let (aggregator, _telemetry) = aggregator(Arc::clone(&feed), &ReportOptions::default());

        let table = aggregator.fetch_and_score("AP", 5).await.expect("fetch succeeds");

        assert!(table.is_empty());
    }
}
