//! Noun lemma database with WordNet-style detachment rules.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{LexiconError, NOUN_EXCEPTIONS_FILE, NOUN_LEMMAS_FILE, StopWords};

/// Suffix detachment rules for nouns, tried in order.
const NOUN_DETACHMENT_RULES: [(&str, &str); 8] = [
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

#[derive(Debug, Clone, Default)]
pub struct LemmaDatabase {
    lemmas: FxHashSet<String>,
    exceptions: FxHashMap<String, String>,
}

impl LemmaDatabase {
    /// Parses the lemma list and the exception list.
    ///
    /// Only the first whitespace-separated field of each line is read, and
    /// lines starting with whitespace are skipped, so WordNet's `index.noun`
    /// and `noun.exc` load unchanged. An exception line may list several
    /// base forms; the first one wins.
    pub(crate) fn parse(lemmas: &str, exceptions: &str) -> Result<Self, LexiconError> {
        let mut lemma_set = FxHashSet::default();
        for (_, fields) in entry_lines(lemmas) {
            if let Some(lemma) = fields.first() {
                lemma_set.insert((*lemma).to_string());
            }
        }
        if lemma_set.is_empty() {
            return Err(LexiconError::Empty(NOUN_LEMMAS_FILE));
        }

        let mut exception_map = FxHashMap::default();
        for (line, fields) in entry_lines(exceptions) {
            match fields.as_slice() {
                [inflected, base, ..] if is_plain_word(inflected) && is_plain_word(base) => {
                    lemma_set.insert((*base).to_string());
                    exception_map
                        .entry((*inflected).to_string())
                        .or_insert_with(|| (*base).to_string());
                }
                _ => {
                    return Err(LexiconError::Malformed {
                        file: NOUN_EXCEPTIONS_FILE,
                        line,
                        reason: "expected '<inflected> <base>'".to_string(),
                    });
                }
            }
        }

        Ok(Self {
            lemmas: lemma_set,
            exceptions: exception_map,
        })
    }

    /// Drops every base form that is also a stop word, so lemmatizing never
    /// produces a token the stop-word filter would have removed.
    #[must_use]
    pub(crate) fn without(mut self, stop_words: &StopWords) -> Self {
        self.lemmas.retain(|lemma| !stop_words.contains(lemma));
        self.exceptions.retain(|_, base| !stop_words.contains(base));
        self
    }

    /// Reduces `token` to its shortest known base form. The token itself
    /// counts as a candidate when it is a lemma, so "talks" becomes "talk"
    /// even when "talks" is listed too. Unknown tokens pass through and
    /// lookup is case-sensitive.
    ///
    /// The reduction is repeated until it settles, which keeps the result a
    /// fixed point: lemmatizing a lemma never changes it.
    #[must_use]
    pub fn lemmatize<'a>(&self, token: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(token);
        // A known form only ever moves to a strictly shorter one.
        while let Some(base) = self.base_form(&current) {
            current = Cow::Owned(base);
        }
        current
    }

    /// One reduction step: the shortest of `form` (when known) and its
    /// known candidates, or `None` when `form` is already that shortest one.
    fn base_form(&self, form: &str) -> Option<String> {
        let candidates: Vec<String> = match self.exceptions.get(form) {
            Some(base) => vec![base.clone()],
            None => NOUN_DETACHMENT_RULES
                .iter()
                .filter_map(|&(suffix, replacement)| {
                    form.strip_suffix(suffix)
                        .map(|stem| format!("{stem}{replacement}"))
                })
                .collect(),
        };
        let best = candidates
            .into_iter()
            .filter(|candidate| candidate != form && self.lemmas.contains(candidate))
            .min_by_key(String::len)?;

        if self.lemmas.contains(form) && best.len() >= form.len() {
            None
        } else {
            Some(best)
        }
    }

    #[must_use]
    pub fn contains(&self, lemma: &str) -> bool {
        self.lemmas.contains(lemma)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

/// Yields `(line_number, whitespace-separated fields)`, skipping blank
/// lines, `#` comments and lines that start with whitespace.
fn entry_lines(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content.lines().enumerate().filter_map(|(index, line)| {
        if line.is_empty() || line.starts_with(char::is_whitespace) || line.starts_with('#') {
            return None;
        }
        Some((index + 1, line.split_whitespace().collect()))
    })
}

fn is_plain_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_alphanumeric() || c == '_')
}
