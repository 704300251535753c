//! Post text cleanup ahead of scoring.
//!
//! Mentions, retweet markers, punctuation, hashtag markers and `http` tokens
//! are removed, stop words are optionally dropped, and the remaining tokens
//! are reduced to their noun base form.
//!
//! The URL pattern only removes `http` plus one run of word characters. A URL
//! is removed whole only because punctuation is stripped first and collapses
//! it into a single word; a URL broken up by whitespace keeps its tail.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::lexicon::LexicalResources;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("compile mention pattern"));
static RETWEET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RT\s+").expect("compile retweet pattern"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("compile punctuation pattern"));
static HASHTAG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("#").expect("compile hashtag pattern"));
static URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\w+").expect("compile url pattern"));

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    resources: Arc<LexicalResources>,
    remove_stopwords: bool,
}

impl TextNormalizer {
    #[must_use]
    pub fn new(resources: Arc<LexicalResources>, remove_stopwords: bool) -> Self {
        Self {
            resources,
            remove_stopwords,
        }
    }

    #[must_use]
    pub fn removes_stopwords(&self) -> bool {
        self.remove_stopwords
    }

    /// Cleans one raw post. Never fails; may return an empty string.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let stripped = strip_boilerplate(raw);
        let stop_words = self.resources.stop_words();
        let lemmas = self.resources.lemmas();

        stripped
            .split_whitespace()
            .filter(|token| !(self.remove_stopwords && stop_words.contains(token)))
            .map(|token| lemmas.lemmatize(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Applies the removal patterns until the text stops changing.
///
/// One pass is not enough for input like `"RT. foo"`, where dropping the dot
/// exposes a fresh `"RT "`. Every pass only deletes characters, so the loop
/// terminates.
fn strip_boilerplate(raw: &str) -> String {
    let mut current = strip_once(raw);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let text = MENTION.replace_all(text, "");
    let text = RETWEET_MARKER.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, "");
    let text = HASHTAG_MARKER.replace_all(&text, "");
    let text = URL_PREFIX.replace_all(&text, "");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn normalizer(remove_stopwords: bool) -> TextNormalizer {
        let resources = LexicalResources::embedded().expect("embedded lexicons load");
        TextNormalizer::new(resources, remove_stopwords)
    }

    #[test]
    fn strips_retweet_mention_url_and_hashtag() {
        let normalized =
            normalizer(false).normalize("RT @nytimes: Breaking! http://example.com #news");
        assert_eq!(normalized, "Breaking news");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalizer(false).normalize(""), "");
        assert_eq!(normalizer(true).normalize("   "), "");
    }

    #[rstest]
    #[case("Hello, world!", "Hello world")]
    #[case("fire-fighters   arrive", "firefighters arrive")]
    #[case("#Election2024 results", "Election2024 result")]
    #[case("@AP @Reuters", "")]
    #[case("Read more: https://t.co/abc123", "Read more")]
    fn removes_boilerplate(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalizer(false).normalize(raw), expected);
    }

    #[test]
    fn url_split_by_whitespace_keeps_its_tail() {
        assert_eq!(
            normalizer(false).normalize("see https ://example.com"),
            "see examplecom"
        );
        assert_eq!(normalizer(false).normalize("see http: example"), "see http example");
    }

    #[test]
    fn retweet_marker_is_removed_even_inside_words() {
        assert_eq!(normalizer(false).normalize("ART show"), "Ashow");
    }

    #[test]
    fn retweet_marker_exposed_by_punctuation_is_removed() {
        assert_eq!(normalizer(false).normalize("RT. officials"), "official");
    }

    #[test]
    fn plural_nouns_are_lemmatized() {
        let normalized = normalizer(false).normalize("Reporters covered the protests in three cities");
        assert_eq!(normalized, "Reporters covered the protest in three city");
    }

    #[test]
    fn stop_words_are_removed_case_sensitively() {
        let normalized = normalizer(true).normalize("The president says the vote was delayed");
        assert_eq!(normalized, "The president says vote delayed");
    }

    #[test]
    fn stop_words_are_kept_when_disabled() {
        let normalized = normalizer(false).normalize("the vote was delayed");
        assert_eq!(normalized, "the vote was delayed");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            raw in "(RT|RT |@[a-zA-Z]{1,6}|#[a-z]{1,6}|http[a-z:/.]{0,12}|[a-zA-Z]{1,8}|[ .,!?:'-]){0,24}",
            remove_stopwords in any::<bool>(),
        ) {
            let normalizer = normalizer(remove_stopwords);
            let once = normalizer.normalize(&raw);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }

        #[test]
        fn normalization_is_total_over_arbitrary_text(raw in "\\PC{0,64}") {
            let normalized = normalizer(false).normalize(&raw);
            prop_assert!(!normalized.starts_with(' ') && !normalized.ends_with(' '));
        }
    }
}
