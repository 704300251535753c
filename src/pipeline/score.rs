//! Objectivity scoring from two independent lexicon models.
//!
//! Lexical objectivity is `1 - subjectivity` from the pattern model and
//! polarity neutrality is the neutral share from the valence model.

pub mod polarity;
pub mod subjectivity;

use std::sync::Arc;

use crate::domain::ScoreTriple;
use crate::lexicon::LexicalResources;

pub use polarity::{PolarityScores, polarity_scores};
pub use subjectivity::{PatternSentiment, analyze};

#[derive(Debug, Clone)]
pub struct ObjectivityScorer {
    resources: Arc<LexicalResources>,
}

impl ObjectivityScorer {
    #[must_use]
    pub fn new(resources: Arc<LexicalResources>) -> Self {
        Self { resources }
    }

    /// Scores one normalized text. Deterministic and total.
    #[must_use]
    pub fn score(&self, normalized: &str) -> ScoreTriple {
        let pattern = analyze(self.resources.subjectivity(), normalized);
        let valence = polarity_scores(self.resources.polarity(), normalized);
        ScoreTriple::new(1.0 - pattern.subjectivity, valence.neutral)
    }
}
