//! Rule-based valence model over the polarity lexicon.
//!
//! Each token gets a valence from the lexicon, adjusted for preceding
//! boosters, negations, capitalization, "least" and a contrastive "but".
//! The valences are then sifted into positive, negative and neutral mass.

use crate::lexicon::PolarityLexicon;

const BOOST_INCREMENT: f64 = 0.293;
const BOOST_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZATION_ALPHA: f64 = 15.0;

const BOOSTERS_UP: &[&str] = &[
    "absolutely",
    "amazingly",
    "awfully",
    "completely",
    "considerable",
    "considerably",
    "decidedly",
    "deeply",
    "enormous",
    "enormously",
    "entirely",
    "especially",
    "exceptional",
    "exceptionally",
    "extreme",
    "extremely",
    "fabulously",
    "fully",
    "greatly",
    "highly",
    "hugely",
    "incredible",
    "incredibly",
    "intensely",
    "major",
    "majorly",
    "more",
    "most",
    "particularly",
    "purely",
    "quite",
    "really",
    "remarkably",
    "so",
    "substantially",
    "thoroughly",
    "total",
    "totally",
    "tremendous",
    "tremendously",
    "uber",
    "unbelievably",
    "unusually",
    "utter",
    "utterly",
    "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost",
    "barely",
    "hardly",
    "kinda",
    "kindof",
    "kind-of",
    "less",
    "little",
    "marginal",
    "marginally",
    "occasional",
    "occasionally",
    "partly",
    "scarce",
    "scarcely",
    "slight",
    "slightly",
    "somewhat",
    "sorta",
    "sortof",
    "sort-of",
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent",
    "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't",
    "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing",
    "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't", "shan't",
    "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't", "wouldn't",
    "rarely", "seldom", "despite",
];

/// Share of positive, neutral and negative mass plus a normalized compound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub compound: f64,
}

/// Scores `text`. Text without scorable tokens yields all zeros.
#[must_use]
pub fn polarity_scores(lexicon: &PolarityLexicon, text: &str) -> PolarityScores {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return PolarityScores::default();
    }
    let lowered: Vec<String> = tokens.iter().map(|token| token.to_lowercase()).collect();
    let sentence = Sentence {
        lexicon,
        tokens: &tokens,
        lowered: &lowered,
        caps_differential: is_caps_differential(&tokens),
    };

    let mut valences = Vec::with_capacity(tokens.len());
    for index in 0..tokens.len() {
        let word = lowered[index].as_str();
        let is_booster = booster_scalar(word).is_some();
        let is_kind_of = word == "kind" && lowered.get(index + 1).is_some_and(|next| next == "of");
        if is_booster || is_kind_of {
            valences.push(0.0);
            continue;
        }
        valences.push(sentence.valence_at(index));
    }
    apply_but_rule(&lowered, &mut valences);

    score_valences(&valences, text)
}

struct Sentence<'a> {
    lexicon: &'a PolarityLexicon,
    tokens: &'a [&'a str],
    lowered: &'a [String],
    caps_differential: bool,
}

impl Sentence<'_> {
    fn word(&self, index: usize) -> &str {
        &self.lowered[index]
    }

    fn known(&self, index: usize) -> bool {
        self.lexicon.contains(self.word(index))
    }

    fn valence_at(&self, index: usize) -> f64 {
        let Some(base) = self.lexicon.valence(self.word(index)) else {
            return 0.0;
        };
        let mut valence = base;

        if self.word(index) == "no" && index + 1 < self.tokens.len() && self.known(index + 1) {
            valence = 0.0;
        }
        let preceded_by_no = (index > 0 && self.word(index - 1) == "no")
            || (index > 1 && self.word(index - 2) == "no")
            || (index > 2
                && self.word(index - 3) == "no"
                && matches!(self.word(index - 1), "or" | "nor"));
        if preceded_by_no {
            valence = base * NEGATION_SCALAR;
        }

        if self.caps_differential && is_shouting(self.tokens[index]) {
            if valence > 0.0 {
                valence += CAPS_INCREMENT;
            } else {
                valence -= CAPS_INCREMENT;
            }
        }

        for distance in 1..=3 {
            if index < distance || self.known(index - distance) {
                continue;
            }
            let mut scalar = self.booster_effect(index - distance, valence);
            if scalar != 0.0 {
                scalar *= match distance {
                    2 => 0.95,
                    3 => 0.9,
                    _ => 1.0,
                };
            }
            valence += scalar;
            valence = self.negation_effect(valence, index, distance);
        }

        self.least_effect(valence, index)
    }

    fn booster_effect(&self, booster_index: usize, valence: f64) -> f64 {
        let Some(mut scalar) = booster_scalar(self.word(booster_index)) else {
            return 0.0;
        };
        if valence < 0.0 {
            scalar = -scalar;
        }
        if self.caps_differential && is_shouting(self.tokens[booster_index]) {
            if valence > 0.0 {
                scalar += CAPS_INCREMENT;
            } else {
                scalar -= CAPS_INCREMENT;
            }
        }
        scalar
    }

    fn negation_effect(&self, valence: f64, index: usize, distance: usize) -> f64 {
        let back = |offset: usize| self.word(index - offset);
        let so_or_this = |word: &str| matches!(word, "so" | "this");
        match distance {
            1 if is_negation(back(1)) => valence * NEGATION_SCALAR,
            2 if back(2) == "never" && so_or_this(back(1)) => valence * 1.25,
            2 if back(2) == "without" && back(1) == "doubt" => valence,
            2 if is_negation(back(2)) => valence * NEGATION_SCALAR,
            3 if back(3) == "never" && (so_or_this(back(2)) || so_or_this(back(1))) => {
                valence * 1.25
            }
            3 if back(3) == "without" && (back(2) == "doubt" || back(1) == "doubt") => valence,
            3 if is_negation(back(3)) => valence * NEGATION_SCALAR,
            _ => valence,
        }
    }

    fn least_effect(&self, valence: f64, index: usize) -> f64 {
        if index == 0 || self.word(index - 1) != "least" || self.known(index - 1) {
            return valence;
        }
        if index > 1 && matches!(self.word(index - 2), "at" | "very") {
            return valence;
        }
        valence * NEGATION_SCALAR
    }
}

/// Splits on whitespace, strips surrounding punctuation unless that would
/// leave two characters or fewer, and drops single-character tokens.
fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|token| {
            let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
            if stripped.chars().count() <= 2 {
                token
            } else {
                stripped
            }
        })
        .filter(|token| token.chars().count() > 1)
        .collect()
}

fn is_shouting(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_lowercase)
}

/// Shouting counts only when some, but not all, tokens are upper case.
fn is_caps_differential(tokens: &[&str]) -> bool {
    let shouting = tokens.iter().filter(|token| is_shouting(token)).count();
    shouting > 0 && shouting < tokens.len()
}

fn booster_scalar(word: &str) -> Option<f64> {
    if BOOSTERS_UP.contains(&word) {
        Some(BOOST_INCREMENT)
    } else if BOOSTERS_DOWN.contains(&word) {
        Some(BOOST_DECREMENT)
    } else {
        None
    }
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.contains("n't")
}

/// Words before the first "but" are damped, words after it amplified.
fn apply_but_rule(lowered: &[String], valences: &mut [f64]) {
    let Some(pivot) = lowered.iter().position(|word| word == "but") else {
        return;
    };
    for (index, valence) in valences.iter_mut().enumerate() {
        if index < pivot {
            *valence *= 0.5;
        } else if index > pivot {
            *valence *= 1.5;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4);
    let questions = text.matches('?').count();
    let question_boost = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * 0.18,
        _ => 0.96,
    };
    exclamations as f64 * 0.292 + question_boost
}

fn score_valences(valences: &[f64], text: &str) -> PolarityScores {
    let emphasis = punctuation_emphasis(text);

    let mut total: f64 = valences.iter().sum();
    if total > 0.0 {
        total += emphasis;
    } else if total < 0.0 {
        total -= emphasis;
    }
    let compound = (total / (total * total + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0);

    let mut positive = 0.0;
    let mut negative = 0.0;
    let mut neutral = 0.0;
    for &valence in valences {
        if valence > 0.0 {
            positive += valence + 1.0;
        } else if valence < 0.0 {
            negative += valence - 1.0;
        } else {
            neutral += 1.0;
        }
    }
    if positive > negative.abs() {
        positive += emphasis;
    } else if positive < negative.abs() {
        negative -= emphasis;
    }

    let mass = positive + negative.abs() + neutral;
    if mass <= 0.0 {
        return PolarityScores::default();
    }
    PolarityScores {
        positive: round_to(positive / mass, 1_000.0),
        neutral: round_to(neutral / mass, 1_000.0),
        negative: round_to(negative.abs() / mass, 1_000.0),
        compound: round_to(compound, 10_000.0),
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexicalResources;
    use rstest::rstest;

    fn scores(text: &str) -> PolarityScores {
        let resources = LexicalResources::embedded().expect("embedded lexicons load");
        polarity_scores(resources.polarity(), text)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(scores(""), PolarityScores::default());
        assert_eq!(scores("a ! ?"), PolarityScores::default());
    }

    #[test]
    fn text_without_lexicon_words_is_fully_neutral() {
        let result = scores("officials met tuesday");
        assert_close(result.neutral, 1.0);
        assert_close(result.compound, 0.0);
    }

    #[test]
    fn one_positive_word_among_neutral_words() {
        let result = scores("the vote was good");
        assert_close(result.neutral, 0.508);
        assert_close(result.positive, 0.492);
        assert_close(result.negative, 0.0);
    }

    #[test]
    fn negation_flips_valence() {
        let result = scores("not good");
        assert_close(result.negative, 0.706);
        assert_close(result.neutral, 0.294);
        assert!(result.compound < 0.0);
    }

    #[test]
    fn booster_amplifies_the_next_word() {
        let result = scores("very good");
        assert_close(result.neutral, 0.238);
        assert_close(result.positive, 0.762);
    }

    #[test]
    fn clause_after_but_dominates() {
        let result = scores("good but bad");
        assert!(result.negative > result.positive);
        assert!(result.compound < 0.0);
    }

    #[test]
    fn exclamation_marks_push_compound_further() {
        assert!(scores("good!!!").compound > scores("good").compound);
    }

    #[test]
    fn shouting_one_word_amplifies_it() {
        assert!(scores("the vote was GOOD").positive > scores("the vote was good").positive);
    }

    #[rstest]
    #[case("without doubt good")]
    #[case("never so good")]
    fn idiomatic_prefixes_do_not_negate(#[case] text: &str) {
        assert!(scores(text).compound > 0.0);
    }

    #[test]
    fn tokenizer_keeps_short_punctuated_tokens() {
        assert_eq!(tokenize("good! :) a ok."), vec!["good", ":)", "ok."]);
    }

    #[test]
    fn but_rule_scales_by_position() {
        let lowered: Vec<String> = ["good", "but", "bad"].map(String::from).to_vec();
        let mut valences = vec![2.0, 0.0, -2.0];
        apply_but_rule(&lowered, &mut valences);
        assert_eq!(valences, vec![1.0, 0.0, -3.0]);
    }
}
