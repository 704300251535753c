use rustc_hash::FxHashSet;

use super::{LexiconError, STOPWORDS_FILE, data_lines};

/// Fixed English stop-word set. Matching is exact: tokens are not lowercased.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: FxHashSet<String>,
}

impl StopWords {
    pub(crate) fn parse(content: &str) -> Result<Self, LexiconError> {
        let mut words = FxHashSet::default();
        for (line, fields) in data_lines(content) {
            match fields.as_slice() {
                [word] if !word.contains(char::is_whitespace) => {
                    words.insert((*word).to_string());
                }
                _ => {
                    return Err(LexiconError::Malformed {
                        file: STOPWORDS_FILE,
                        line,
                        reason: "expected a single word".to_string(),
                    });
                }
            }
        }
        if words.is_empty() {
            return Err(LexiconError::Empty(STOPWORDS_FILE));
        }
        Ok(Self { words })
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
