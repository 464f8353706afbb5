//! Shared types that mirror the annotation layers of a TCF `TextCorpus`.
//!
//! A TCF document stores each kind of annotation in its own layer element
//! (`tokens`, `lemmas`, `POStags`, ...). Annotations point back at tokens by
//! ID; readers resolve those references and hand out one [`AnnotatedToken`]
//! per token with every requested layer folded in.
//!
//! Use [`Layer`] and [`LayerSet`] to tell a reader which layers to parse.
//!
//! ```rust
//! use tcf_types::{Layer, LayerSet};
//!
//! let layers = LayerSet::required().with(Layer::PosTags);
//! assert!(layers.contains(Layer::Lemmas));
//! assert!(!layers.contains(Layer::WordSenses));
//! assert_eq!(Layer::from_element_name("POStags"), Some(Layer::PosTags));
//! ```

use std::fmt;

/// Annotation layer of a TCF `TextCorpus`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Text,
    Tokens,
    Lemmas,
    PosTags,
    WordSenses,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Text,
        Layer::Tokens,
        Layer::Lemmas,
        Layer::PosTags,
        Layer::WordSenses,
    ];

    /// Match the local name of a layer element.
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Layer::Text),
            "tokens" => Some(Layer::Tokens),
            "lemmas" => Some(Layer::Lemmas),
            "POStags" => Some(Layer::PosTags),
            "WordSenses" => Some(Layer::WordSenses),
            _ => None,
        }
    }

    /// Local name of the layer element as written in TCF.
    pub fn element_name(self) -> &'static str {
        match self {
            Layer::Text => "text",
            Layer::Tokens => "tokens",
            Layer::Lemmas => "lemmas",
            Layer::PosTags => "POStags",
            Layer::WordSenses => "WordSenses",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layer::Text => "text",
            Layer::Tokens => "tokens",
            Layer::Lemmas => "lemmas",
            Layer::PosTags => "pos tags",
            Layer::WordSenses => "word senses",
        })
    }
}

/// Small copyable set of [`Layer`]s.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct LayerSet(u8);

impl LayerSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Text, tokens and lemmas: the layers every tokenization needs.
    pub fn required() -> Self {
        Self::empty()
            .with(Layer::Text)
            .with(Layer::Tokens)
            .with(Layer::Lemmas)
    }

    #[must_use]
    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer.bit())
    }

    pub fn insert(&mut self, layer: Layer) {
        self.0 |= layer.bit();
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl fmt::Debug for LayerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Layer> for LayerSet {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), LayerSet::with)
    }
}

/// One token of a corpus with the annotations of every parsed layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnnotatedToken {
    /// Zero-based position in the corpus token sequence.
    pub index: usize,
    /// Token `ID` attribute, as referenced by `tokenIDs` in other layers.
    pub id: String,
    pub text: String,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    /// Sense identifiers in the order the corpus lists them.
    pub wordsenses: Vec<String>,
}

impl AnnotatedToken {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            id: format!("t_{index}"),
            text: text.into(),
            lemma: None,
            pos: None,
            wordsenses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    #[must_use]
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    #[must_use]
    pub fn with_wordsenses<I, S>(mut self, senses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wordsenses = senses.into_iter().map(Into::into).collect();
        self
    }

    /// Lemma if annotated, otherwise the surface form.
    pub fn lemma_or_text(&self) -> &str {
        self.lemma.as_deref().unwrap_or(&self.text)
    }
}
