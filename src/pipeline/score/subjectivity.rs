//! Pattern-lexicon subjectivity model.
//!
//! Known words become assessments. A modifier ("very") folds into the next
//! known word and scales it, a negation inverts the intensity of the next
//! assessment and halves its polarity with the opposite sign.

use crate::lexicon::SubjectivityLexicon;

const NEGATIONS: [&str; 4] = ["no", "not", "never", "n't"];

/// Mean polarity and subjectivity over every assessment in a text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatternSentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

#[derive(Debug, Clone, Copy)]
struct Assessment {
    polarity: f64,
    subjectivity: f64,
    intensity: f64,
    negated: bool,
}

/// Scores `text`. A text without known words is fully objective.
#[must_use]
pub fn analyze(lexicon: &SubjectivityLexicon, text: &str) -> PatternSentiment {
    let mut assessments: Vec<Assessment> = Vec::new();
    let mut modifier_pending = false;
    let mut negation_pending = false;

    for word in text.split_whitespace().map(clean_token).filter(|word| !word.is_empty()) {
        let Some(entry) = lexicon.get(&word) else {
            if is_negation(&word) {
                negation_pending = true;
            } else if negation_pending && word.trim_matches('\'').chars().count() > 1 {
                negation_pending = false;
            }
            if negation_pending && modifier_pending {
                if let Some(last) = assessments.last_mut() {
                    last.negated = true;
                }
                negation_pending = false;
            } else if modifier_pending && word.chars().count() > 2 {
                modifier_pending = false;
            }
            continue;
        };

        match assessments.last_mut() {
            Some(last) if modifier_pending => {
                last.polarity = (entry.polarity * last.intensity).clamp(-1.0, 1.0);
                last.subjectivity = (entry.subjectivity * last.intensity).clamp(-1.0, 1.0);
                last.intensity = entry.intensity;
            }
            _ => assessments.push(Assessment {
                polarity: entry.polarity,
                subjectivity: entry.subjectivity,
                intensity: entry.intensity,
                negated: false,
            }),
        }

        if negation_pending {
            if let Some(last) = assessments.last_mut() {
                if last.intensity != 0.0 {
                    last.intensity = 1.0 / last.intensity;
                }
                last.negated = true;
            }
        }

        modifier_pending = entry.modifier;
        negation_pending = is_negation(&word);
    }

    if assessments.is_empty() {
        return PatternSentiment::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let count = assessments.len() as f64;
    let polarity = assessments
        .iter()
        .map(|a| if a.negated { a.polarity * -0.5 } else { a.polarity })
        .sum::<f64>()
        / count;
    let subjectivity = assessments.iter().map(|a| a.subjectivity).sum::<f64>() / count;

    PatternSentiment {
        polarity,
        subjectivity,
    }
}

/// Contractions such as "didn't" count as negations.
fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn clean_token(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'');
    if trimmed == "n't" {
        return trimmed.to_string();
    }
    trimmed.trim_matches('\'').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> SubjectivityLexicon {
        SubjectivityLexicon::parse(
            "good\t0.7\t0.6\t1.0\t0\n\
             bad\t-0.7\t0.667\t1.0\t0\n\
             very\t0.2\t0.3\t1.3\t1\n\
             new\t0.136\t0.455\t1.0\t0\n",
        )
        .expect("lexicon parses")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn unknown_words_are_objective() {
        assert_eq!(analyze(&lexicon(), "officials met tuesday"), PatternSentiment::default());
        assert_eq!(analyze(&lexicon(), ""), PatternSentiment::default());
    }

    #[test]
    fn single_known_word() {
        let result = analyze(&lexicon(), "a good plan");
        assert_close(result.polarity, 0.7);
        assert_close(result.subjectivity, 0.6);
    }

    #[test]
    fn modifier_scales_the_next_known_word() {
        let result = analyze(&lexicon(), "very good");
        assert_close(result.polarity, 0.91);
        assert_close(result.subjectivity, 0.78);
    }

    #[test]
    fn modifier_survives_short_words() {
        let result = analyze(&lexicon(), "very, a good");
        assert_close(result.subjectivity, 0.78);
    }

    #[test]
    fn negation_halves_and_flips_polarity() {
        let result = analyze(&lexicon(), "not good");
        assert_close(result.polarity, -0.35);
        assert_close(result.subjectivity, 0.6);
    }

    #[test]
    fn negation_inverts_modifier_intensity() {
        let result = analyze(&lexicon(), "not very good");
        assert_close(result.polarity, 0.7 / 1.3 * -0.5);
        assert_close(result.subjectivity, 0.6 / 1.3);
    }

    #[test]
    fn negation_is_dropped_after_a_longer_unknown_word() {
        let result = analyze(&lexicon(), "not surprisingly good");
        assert_close(result.polarity, 0.7);
    }

    #[test]
    fn contraction_negates() {
        let result = analyze(&lexicon(), "it isn't good");
        assert_close(result.polarity, -0.35);
    }

    #[test]
    fn subjectivity_is_mean_over_assessments() {
        let result = analyze(&lexicon(), "good news and bad news");
        assert_close(result.subjectivity, (0.6 + 0.667) / 2.0);
        assert_close(result.polarity, 0.0);
    }
}
