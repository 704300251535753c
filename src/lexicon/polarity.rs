use rustc_hash::FxHashMap;

use super::{LexiconError, POLARITY_FILE, data_lines, parse_number};

const VALENCE_RANGE: std::ops::RangeInclusive<f64> = -4.0..=4.0;

/// Word valence lexicon for the rule-based polarity model.
///
/// Keys are lowercase; valences lie in `[-4, 4]`. Columns after the valence
/// are ignored, so VADER's `vader_lexicon.txt` (mean, standard deviation and
/// raw ratings) loads unchanged.
#[derive(Debug, Clone, Default)]
pub struct PolarityLexicon {
    valences: FxHashMap<String, f64>,
}

impl PolarityLexicon {
    pub(crate) fn parse(content: &str) -> Result<Self, LexiconError> {
        let mut valences = FxHashMap::default();
        for (line, fields) in data_lines(content) {
            let [word, raw, ..] = fields.as_slice() else {
                return Err(LexiconError::Malformed {
                    file: POLARITY_FILE,
                    line,
                    reason: "expected '<word>\\t<valence>'".to_string(),
                });
            };
            let valence = parse_number(POLARITY_FILE, line, "valence", raw)?;
            if !VALENCE_RANGE.contains(&valence) {
                return Err(LexiconError::Malformed {
                    file: POLARITY_FILE,
                    line,
                    reason: format!("valence {valence} outside [-4, 4]"),
                });
            }
            valences.insert(word.to_lowercase(), valence);
        }
        if valences.is_empty() {
            return Err(LexiconError::Empty(POLARITY_FILE));
        }
        Ok(Self { valences })
    }

    #[must_use]
    pub fn valence(&self, word_lowercase: &str) -> Option<f64> {
        self.valences.get(word_lowercase).copied()
    }

    #[must_use]
    pub fn contains(&self, word_lowercase: &str) -> bool {
        self.valences.contains_key(word_lowercase)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}
