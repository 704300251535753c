//! Read-only lexical resources shared by the normalizer and the scorers.
//!
//! Everything here is loaded once at startup and never mutated afterwards.
//! A loading failure aborts startup: the pipeline cannot score without it.

pub mod lemma;
pub mod polarity;
pub mod stopwords;
pub mod subjectivity;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub use lemma::LemmaDatabase;
pub use polarity::PolarityLexicon;
pub use stopwords::StopWords;
pub use subjectivity::{SubjectivityEntry, SubjectivityLexicon};

pub(crate) const STOPWORDS_FILE: &str = "stopwords_en.txt";
pub(crate) const NOUN_LEMMAS_FILE: &str = "noun_lemmas.txt";
pub(crate) const NOUN_EXCEPTIONS_FILE: &str = "noun_exceptions.tsv";
pub(crate) const POLARITY_FILE: &str = "polarity_lexicon.tsv";
pub(crate) const SUBJECTIVITY_FILE: &str = "subjectivity_lexicon.tsv";

const EMBEDDED: [(&str, &str); 5] = [
    (STOPWORDS_FILE, include_str!("../data/stopwords_en.txt")),
    (NOUN_LEMMAS_FILE, include_str!("../data/noun_lemmas.txt")),
    (NOUN_EXCEPTIONS_FILE, include_str!("../data/noun_exceptions.tsv")),
    (POLARITY_FILE, include_str!("../data/polarity_lexicon.tsv")),
    (SUBJECTIVITY_FILE, include_str!("../data/subjectivity_lexicon.tsv")),
];

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}: {reason}")]
    Malformed {
        file: &'static str,
        line: usize,
        reason: String,
    },
    #[error("lexicon file {0} has no entries")]
    Empty(&'static str),
}

/// Where lexicon files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconSource {
    /// Files compiled into the binary from `data/`.
    Embedded,
    /// A directory holding files with the same names as `data/`.
    Directory(PathBuf),
}

impl LexiconSource {
    fn read(&self, file: &'static str) -> Result<String, LexiconError> {
        match self {
            Self::Embedded => Ok(EMBEDDED
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, content)| (*content).to_string())
                .unwrap_or_default()),
            Self::Directory(dir) => {
                let path = dir.join(file);
                std::fs::read_to_string(&path).map_err(|source| LexiconError::Read { path, source })
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Embedded => "embedded".to_string(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// Immutable handle to every lexical resource the pipeline needs.
#[derive(Debug)]
pub struct LexicalResources {
    stop_words: StopWords,
    lemmas: LemmaDatabase,
    polarity: PolarityLexicon,
    subjectivity: SubjectivityLexicon,
}

impl LexicalResources {
    /// Loads and validates all lexicon files from `source`.
    ///
    /// # Errors
    /// Returns [`LexiconError`] when a file is missing, empty or malformed.
    pub fn load(source: &LexiconSource) -> Result<Arc<Self>, LexiconError> {
        let stop_words = StopWords::parse(&source.read(STOPWORDS_FILE)?)?;
        let lemmas = LemmaDatabase::parse(
            &source.read(NOUN_LEMMAS_FILE)?,
            &source.read(NOUN_EXCEPTIONS_FILE)?,
        )?
        .without(&stop_words);
        let polarity = PolarityLexicon::parse(&source.read(POLARITY_FILE)?)?;
        let subjectivity = SubjectivityLexicon::parse(&source.read(SUBJECTIVITY_FILE)?)?;

        info!(
            source = %source.describe(),
            stop_words = stop_words.len(),
            lemmas = lemmas.len(),
            polarity_entries = polarity.len(),
            subjectivity_entries = subjectivity.len(),
            "lexical resources loaded"
        );

        Ok(Arc::new(Self {
            stop_words,
            lemmas,
            polarity,
            subjectivity,
        }))
    }

    /// Convenience for [`LexiconSource::Embedded`].
    ///
    /// # Errors
    /// Returns [`LexiconError`] if the embedded data is malformed.
    pub fn embedded() -> Result<Arc<Self>, LexiconError> {
        Self::load(&LexiconSource::Embedded)
    }

    /// Loads from `dir` when given, otherwise the embedded data.
    ///
    /// # Errors
    /// Returns [`LexiconError`] when loading fails.
    pub fn from_optional_dir(dir: Option<&Path>) -> Result<Arc<Self>, LexiconError> {
        match dir {
            Some(dir) => Self::load(&LexiconSource::Directory(dir.to_path_buf())),
            None => Self::embedded(),
        }
    }

    #[must_use]
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    #[must_use]
    pub fn lemmas(&self) -> &LemmaDatabase {
        &self.lemmas
    }

    #[must_use]
    pub fn polarity(&self) -> &PolarityLexicon {
        &self.polarity
    }

    #[must_use]
    pub fn subjectivity(&self) -> &SubjectivityLexicon {
        &self.subjectivity
    }
}

/// Yields `(line_number, tab-separated fields)` for every data line.
///
/// Blank lines and lines starting with `#` are skipped.
pub(crate) fn data_lines(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content.lines().enumerate().filter_map(|(index, line)| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        Some((index + 1, trimmed.split('\t').map(str::trim).collect()))
    })
}

pub(crate) fn parse_number(
    file: &'static str,
    line: usize,
    field: &str,
    raw: &str,
) -> Result<f64, LexiconError> {
    let value = raw.parse::<f64>().map_err(|error| LexiconError::Malformed {
        file,
        line,
        reason: format!("invalid {field} '{raw}': {error}"),
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LexiconError::Malformed {
            file,
            line,
            reason: format!("{field} must be finite"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path, overrides: &[(&str, &str)]) {
        for (name, content) in EMBEDDED {
            let content = overrides
                .iter()
                .find(|(file, _)| *file == name)
                .map_or(content, |(_, replacement)| *replacement);
            std::fs::write(dir.join(name), content).expect("fixture writes");
        }
    }

    #[test]
    fn embedded_resources_load() {
        let resources = LexicalResources::embedded().expect("embedded lexicons load");

        assert!(resources.stop_words().contains("the"));
        assert!(resources.lemmas().len() > 100);
        assert!(resources.polarity().valence("good").is_some());
        assert!(resources.subjectivity().get("good").is_some());
    }

    #[test]
    fn lemma_entries_never_include_stop_words() {
        let resources = LexicalResources::embedded().expect("embedded lexicons load");
        for word in ["the", "can", "will", "won"] {
            assert!(!resources.lemmas().contains(word), "{word} should be excluded");
        }
    }

    #[test]
    fn directory_source_reads_all_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture(dir.path(), &[(POLARITY_FILE, "calm\t1.5\n")]);

        let resources = LexicalResources::from_optional_dir(Some(dir.path()))
            .expect("directory lexicons load");

        assert_eq!(resources.polarity().len(), 1);
        assert_eq!(resources.polarity().valence("calm"), Some(1.5));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture(dir.path(), &[]);
        std::fs::remove_file(dir.path().join(SUBJECTIVITY_FILE)).expect("remove fixture");

        let error = LexicalResources::from_optional_dir(Some(dir.path()))
            .expect_err("missing file should fail");

        assert!(matches!(error, LexiconError::Read { .. }));
    }

    #[test]
    fn malformed_line_reports_file_and_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture(dir.path(), &[(POLARITY_FILE, "# header\ncalm\t1.5\nangry\tlots\n")]);

        let error = LexicalResources::from_optional_dir(Some(dir.path()))
            .expect_err("malformed valence should fail");

        assert!(matches!(
            error,
            LexiconError::Malformed {
                file: POLARITY_FILE,
                line: 3,
                ..
            }
        ));
    }

    #[test]
    fn data_lines_skip_comments_and_blanks() {
        let lines: Vec<_> = data_lines("# comment\n\nword\t1.0\n  \nother\t2.0\n").collect();
        assert_eq!(lines, vec![(3, vec!["word", "1.0"]), (5, vec!["other", "2.0"])]);
    }
}
