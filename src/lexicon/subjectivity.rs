use rustc_hash::FxHashMap;

use super::{LexiconError, SUBJECTIVITY_FILE, data_lines, parse_number};

/// One pattern-lexicon entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectivityEntry {
    /// `[-1, 1]`, negative to positive.
    pub polarity: f64,
    /// `[0, 1]`, objective to subjective.
    pub subjectivity: f64,
    /// Multiplier applied to the following word when this word is a modifier.
    pub intensity: f64,
    /// Adverbs such as "very" that modify the next known word.
    pub modifier: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectivityLexicon {
    entries: FxHashMap<String, SubjectivityEntry>,
}

impl SubjectivityLexicon {
    pub(crate) fn parse(content: &str) -> Result<Self, LexiconError> {
        let mut entries = FxHashMap::default();
        for (line, fields) in data_lines(content) {
            let [word, polarity, subjectivity, intensity, modifier] = fields.as_slice() else {
                return Err(LexiconError::Malformed {
                    file: SUBJECTIVITY_FILE,
                    line,
                    reason: "expected 5 tab-separated fields".to_string(),
                });
            };
            let polarity = parse_number(SUBJECTIVITY_FILE, line, "polarity", polarity)?;
            let subjectivity = parse_number(SUBJECTIVITY_FILE, line, "subjectivity", subjectivity)?;
            let intensity = parse_number(SUBJECTIVITY_FILE, line, "intensity", intensity)?;
            if !(-1.0..=1.0).contains(&polarity) || !(0.0..=1.0).contains(&subjectivity) {
                return Err(LexiconError::Malformed {
                    file: SUBJECTIVITY_FILE,
                    line,
                    reason: "polarity must be in [-1, 1] and subjectivity in [0, 1]".to_string(),
                });
            }
            let modifier = match *modifier {
                "1" | "true" => true,
                "0" | "false" => false,
                other => {
                    return Err(LexiconError::Malformed {
                        file: SUBJECTIVITY_FILE,
                        line,
                        reason: format!("invalid modifier flag '{other}'"),
                    });
                }
            };
            entries.insert(
                word.to_lowercase(),
                SubjectivityEntry {
                    polarity,
                    subjectivity,
                    intensity,
                    modifier,
                },
            );
        }
        if entries.is_empty() {
            return Err(LexiconError::Empty(SUBJECTIVITY_FILE));
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, word_lowercase: &str) -> Option<&SubjectivityEntry> {
        self.entries.get(word_lowercase)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifier_entries() {
        let lexicon = SubjectivityLexicon::parse("very\t0.2\t0.3\t1.3\t1\ngood\t0.7\t0.6\t1.0\t0\n")
            .expect("parses");

        let very = lexicon.get("very").expect("very present");
        assert!(very.modifier);
        assert!((very.intensity - 1.3).abs() < f64::EPSILON);
        assert!(!lexicon.get("good").expect("good present").modifier);
    }

    #[test]
    fn subjectivity_out_of_range_is_rejected() {
        let error = SubjectivityLexicon::parse("odd\t0.1\t1.5\t1.0\t0\n").expect_err("should fail");
        assert!(matches!(error, LexiconError::Malformed { line: 1, .. }));
    }

    #[test]
    fn unknown_modifier_flag_is_rejected() {
        let error = SubjectivityLexicon::parse("odd\t0.1\t0.5\t1.0\tmaybe\n").expect_err("should fail");
        assert!(matches!(error, LexiconError::Malformed { line: 1, .. }));
    }
}
