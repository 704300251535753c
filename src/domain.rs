//! Records passed between the feed, the scoring pipeline and the report API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Post {
    #[must_use]
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}

/// Objectivity scores for one normalized text.
///
/// All three values lie in `[0, 1]` (1 = fully objective) and
/// `average_objectivity` is always the mean of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreTriple {
    lexical_objectivity: f64,
    polarity_neutrality: f64,
    average_objectivity: f64,
}

impl ScoreTriple {
    #[must_use]
    pub fn new(lexical_objectivity: f64, polarity_neutrality: f64) -> Self {
        let lexical_objectivity = clamp_unit(lexical_objectivity);
        let polarity_neutrality = clamp_unit(polarity_neutrality);
        Self {
            lexical_objectivity,
            polarity_neutrality,
            average_objectivity: (lexical_objectivity + polarity_neutrality) / 2.0,
        }
    }

    #[must_use]
    pub fn lexical_objectivity(&self) -> f64 {
        self.lexical_objectivity
    }

    #[must_use]
    pub fn polarity_neutrality(&self) -> f64 {
        self.polarity_neutrality
    }

    #[must_use]
    pub fn average_objectivity(&self) -> f64 {
        self.average_objectivity
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// One scored row of a [`FeedTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedRow {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(flatten)]
    pub scores: ScoreTriple,
}

/// Scored posts for one source, in feed delivery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedTable {
    source_handle: String,
    limit: usize,
    fetched_at: DateTime<Utc>,
    rows: Vec<FeedRow>,
}

impl FeedTable {
    #[must_use]
    pub fn new(
        source_handle: impl Into<String>,
        limit: usize,
        fetched_at: DateTime<Utc>,
        rows: Vec<FeedRow>,
    ) -> Self {
        Self {
            source_handle: source_handle.into(),
            limit,
            fetched_at,
            rows,
        }
    }

    #[must_use]
    pub fn source_handle(&self) -> &str {
        &self.source_handle
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[must_use]
    pub fn rows(&self) -> &[FeedRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A selectable news source: display name and feed handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsSource {
    pub name: String,
    pub handle: String,
}

impl NewsSource {
    #[must_use]
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
        }
    }
}

/// Sample size and text handling applied to every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub sample_size: usize,
    pub remove_stopwords: bool,
    pub language_filter: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sample_size: 500,
            remove_stopwords: false,
            language_filter: None,
        }
    }
}
