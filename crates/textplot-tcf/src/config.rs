use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tcf_corpus::LoadMode;
use tcf_tagset::Tagset;
use tcf_types::{Layer, LayerSet};

use crate::error::TextplotError;

pub const DEFAULT_TERM_DEPTH: usize = 500;
pub const DEFAULT_SKIM_DEPTH: usize = 10;

/// Where stopwords come from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StopwordSource {
    /// The list bundled with this crate.
    #[default]
    Default,
    /// No stopword filtering at all.
    Disabled,
    /// One stopword per line, read from a file.
    File(PathBuf),
}

impl StopwordSource {
    /// Resolve a `stopwordfile` setting: unset selects the bundled list and an
    /// empty value disables filtering.
    pub fn from_option(raw: Option<&str>) -> Self {
        match raw {
            None => StopwordSource::Default,
            Some("") => StopwordSource::Disabled,
            Some(path) => StopwordSource::File(PathBuf::from(path)),
        }
    }
}

/// Load a custom tagset for POS filtering.
pub fn load_tagset(path: impl AsRef<Path>) -> Result<Arc<Tagset>, TextplotError> {
    Tagset::load(path)
        .map(Arc::new)
        .map_err(|err| TextplotError::Configuration(format!("{err:#}")))
}

/// Settings consumed by tokenization.
#[derive(Clone, Debug)]
pub struct TokenizerConfig {
    pub stopwords: StopwordSource,
    /// POS allow-list. `None` and an empty list both disable POS filtering.
    pub postags: Option<Vec<String>>,
    pub disambiguate: bool,
    pub tagset: Arc<Tagset>,
    pub load_mode: LoadMode,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            stopwords: StopwordSource::Default,
            postags: None,
            disambiguate: false,
            tagset: Tagset::builtin(),
            load_mode: LoadMode::Mmap,
        }
    }
}

impl TokenizerConfig {
    pub fn pos_filter_enabled(&self) -> bool {
        self.postags.as_ref().is_some_and(|tags| !tags.is_empty())
    }

    /// Corpus layers this configuration needs.
    pub fn layers(&self) -> LayerSet {
        let mut layers = LayerSet::required();
        if self.pos_filter_enabled() {
            layers.insert(Layer::PosTags);
        }
        if self.disambiguate {
            layers.insert(Layer::WordSenses);
        }
        layers
    }
}

/// Settings passed through to the graph builder untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub term_depth: usize,
    pub skim_depth: usize,
    pub d_weights: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            term_depth: DEFAULT_TERM_DEPTH,
            skim_depth: DEFAULT_SKIM_DEPTH,
            d_weights: false,
        }
    }
}
