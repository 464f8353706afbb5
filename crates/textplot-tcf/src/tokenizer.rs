use serde::Serialize;
use tcf_types::AnnotatedToken;
use tracing::debug;

use crate::config::TokenizerConfig;
use crate::error::TextplotError;
use crate::filter::{DiscardReason, TokenFilter};
use crate::token::{TermTable, TokenSlot, TokenStream, normalize};

/// Per-document counters collected while tokenizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TokenizeStats {
    pub total: usize,
    pub retained: usize,
    pub stopword_discards: usize,
    pub pos_discards: usize,
}

/// Token stream and term table of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: TokenStream,
    pub terms: TermTable,
    pub stats: TokenizeStats,
}

/// Drives normalization and filtering over a corpus in a single pass.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    filter: TokenFilter,
    disambiguate: bool,
}

impl Tokenizer {
    pub fn new(filter: TokenFilter, disambiguate: bool) -> Self {
        Self {
            filter,
            disambiguate,
        }
    }

    pub fn from_config(config: &TokenizerConfig) -> Result<Self, TextplotError> {
        Ok(Self::new(
            TokenFilter::from_config(config)?,
            config.disambiguate,
        ))
    }

    pub fn filter(&self) -> &TokenFilter {
        &self.filter
    }

    pub fn disambiguate(&self) -> bool {
        self.disambiguate
    }

    /// Every input position yields exactly one slot. Retained offsets are
    /// appended to the term table under their stemmed key; discarded ones
    /// leave it untouched.
    pub fn tokenize(&self, tokens: &[AnnotatedToken]) -> Tokenized {
        let mut stream = TokenStream::with_capacity(tokens.len());
        let mut terms = TermTable::default();
        let mut stats = TokenizeStats {
            total: tokens.len(),
            ..TokenizeStats::default()
        };

        for (offset, raw) in tokens.iter().enumerate() {
            let record = normalize(raw, offset, self.disambiguate);
            match self.filter.discard_reason(&record, raw) {
                Some(reason) => {
                    match reason {
                        DiscardReason::Stopword => stats.stopword_discards += 1,
                        DiscardReason::PartOfSpeech => stats.pos_discards += 1,
                    }
                    stream.push(TokenSlot::Discarded);
                }
                None => {
                    terms.push(&record.stemmed, offset);
                    stats.retained += 1;
                    stream.push(TokenSlot::Retained(record));
                }
            }
        }

        debug!(
            "tokenized {} positions: {} retained, {} stopwords, {} pos, {} terms",
            stats.total,
            stats.retained,
            stats.stopword_discards,
            stats.pos_discards,
            terms.len()
        );
        Tokenized {
            tokens: stream,
            terms,
            stats,
        }
    }
}
