use std::collections::HashSet;
use std::fs;

use tracing::debug;

use crate::config::StopwordSource;
use crate::error::TextplotError;

/// Bundled English and German stopword list.
pub const DEFAULT_STOPWORDS: &str = include_str!("../data/stopwords.txt");

/// Exact, case-sensitive set of stopwords and stop-phrases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// A set that matches nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn load(source: &StopwordSource) -> Result<Self, TextplotError> {
        let stopwords = match source {
            StopwordSource::Default => Self::parse(DEFAULT_STOPWORDS),
            StopwordSource::Disabled => Self::disabled(),
            StopwordSource::File(path) => {
                let raw = fs::read_to_string(path).map_err(|source| {
                    TextplotError::StopwordFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                Self::parse(&raw)
            }
        };
        debug!("loaded {} stopwords from {:?}", stopwords.len(), source);
        Ok(stopwords)
    }

    /// One exact entry per line; a trailing `\r` is dropped and empty lines
    /// are skipped.
    pub fn parse(raw: &str) -> Self {
        let words = raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
