use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use tcf_corpus::TextCorpus;
use tcf_types::{AnnotatedToken, Layer};
use tracing::info;

use crate::config::TokenizerConfig;
use crate::error::TextplotError;
use crate::token::{TermTable, TokenRecord, TokenStream};
use crate::tokenizer::{TokenizeStats, Tokenized, Tokenizer};

/// A tokenized document that a graph builder can index.
///
/// Implementations decide how text is read and split into terms; the
/// frequency helpers are shared.
pub trait DocumentSource {
    type Config;

    fn load(path: &Path, config: &Self::Config) -> Result<Self, TextplotError>
    where
        Self: Sized;

    /// Raw document text.
    fn text(&self) -> &str;

    fn tokens(&self) -> &TokenStream;

    fn terms(&self) -> &TermTable;

    /// Display form of a term key.
    fn unstem<'a>(&self, term: &'a str) -> Cow<'a, str>;

    /// Terms with occurrence counts, most frequent first. Ties keep
    /// first-seen order.
    fn term_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .terms()
            .iter()
            .map(|(term, offsets)| (term, offsets.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Terms grouped by occurrence count.
    fn term_count_buckets(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut buckets: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (term, count) in self.term_counts() {
            buckets.entry(count).or_default().push(term);
        }
        buckets
    }

    /// The `depth` most frequent terms, extended by every other term that
    /// shares the count of the last one taken.
    fn most_frequent_terms(&self, depth: usize) -> Vec<&str> {
        let counts = self.term_counts();
        let Some(&(_, end_count)) = counts.iter().take(depth).last() else {
            return Vec::new();
        };
        counts
            .into_iter()
            .enumerate()
            .filter(|(i, (_, count))| *i < depth || *count == end_count)
            .map(|(_, (term, _))| term)
            .collect()
    }
}

/// Document read from a TCF corpus, keyed by lemma.
#[derive(Clone, Debug)]
pub struct TcfText {
    corpus: TextCorpus,
    tokenized: Tokenized,
}

impl TcfText {
    /// Load and tokenize a TCF file.
    ///
    /// The configuration is validated and stopwords are loaded before the
    /// corpus file is opened.
    pub fn from_file(
        path: impl AsRef<Path>,
        config: &TokenizerConfig,
    ) -> Result<Self, TextplotError> {
        let tokenizer = Tokenizer::from_config(config)?;
        let corpus = TextCorpus::load_with_mode(path, config.layers(), config.load_mode)?;
        Self::with_tokenizer(corpus, &tokenizer)
    }

    /// Tokenize an in-memory TCF document.
    pub fn from_bytes(bytes: &[u8], config: &TokenizerConfig) -> Result<Self, TextplotError> {
        let tokenizer = Tokenizer::from_config(config)?;
        let corpus = TextCorpus::from_bytes(bytes, config.layers())?;
        Self::with_tokenizer(corpus, &tokenizer)
    }

    /// Tokenize an already parsed corpus.
    pub fn from_corpus(
        corpus: TextCorpus,
        config: &TokenizerConfig,
    ) -> Result<Self, TextplotError> {
        let tokenizer = Tokenizer::from_config(config)?;
        Self::with_tokenizer(corpus, &tokenizer)
    }

    fn with_tokenizer(corpus: TextCorpus, tokenizer: &Tokenizer) -> Result<Self, TextplotError> {
        if tokenizer.filter().pos().is_enabled() {
            require_layer(&corpus, Layer::PosTags, "POS filtering")?;
        }
        if tokenizer.disambiguate() {
            require_layer(&corpus, Layer::WordSenses, "disambiguation")?;
        }

        let tokenized = tokenizer.tokenize(corpus.tokens());
        info!(
            "indexed {} of {} tokens into {} terms",
            tokenized.stats.retained,
            tokenized.stats.total,
            tokenized.terms.len()
        );
        Ok(Self { corpus, tokenized })
    }

    pub fn corpus(&self) -> &TextCorpus {
        &self.corpus
    }

    pub fn stats(&self) -> TokenizeStats {
        self.tokenized.stats
    }

    /// Annotated token a record was built from.
    pub fn raw_token(&self, record: &TokenRecord) -> Option<&AnnotatedToken> {
        self.corpus.tokens().get(record.raw_index)
    }
}

fn require_layer(corpus: &TextCorpus, layer: Layer, feature: &str) -> Result<(), TextplotError> {
    if !corpus.has_layer(layer) {
        return Err(TextplotError::Configuration(format!(
            "{feature} requested but the corpus has no {} layer",
            layer.element_name()
        )));
    }
    if !corpus.layers().contains(layer) {
        return Err(TextplotError::Configuration(format!(
            "{feature} requested but the {} layer was not loaded",
            layer.element_name()
        )));
    }
    Ok(())
}

impl DocumentSource for TcfText {
    type Config = TokenizerConfig;

    fn load(path: &Path, config: &TokenizerConfig) -> Result<Self, TextplotError> {
        Self::from_file(path, config)
    }

    fn text(&self) -> &str {
        self.corpus.text()
    }

    fn tokens(&self) -> &TokenStream {
        &self.tokenized.tokens
    }

    fn terms(&self) -> &TermTable {
        &self.tokenized.terms
    }

    /// Keys are lemmas already, so they are their own display form.
    fn unstem<'a>(&self, term: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(term)
    }
}
