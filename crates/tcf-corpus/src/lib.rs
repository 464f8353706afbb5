//! Load TCF (Text Corpus Format) documents into owned, resolved tokens.
//!
//! A TCF `TextCorpus` keeps every annotation in its own layer and links
//! annotations to tokens through `tokenIDs` attributes. This crate reads the
//! whole file (memory-mapped or into an owned buffer, see [`LoadMode`]),
//! parses only the layers the caller asks for and folds lemmas, POS tags and
//! word senses into one [`AnnotatedToken`] per token. The file buffer is
//! released before the loader returns.
//!
//! Layers that were not requested are still walked for well-formedness, and
//! their presence is recorded so callers can tell "not parsed" apart from
//! "not in the document" via [`TextCorpus::has_layer`].
//!
//! # Example
//! ```no_run
//! use tcf_corpus::{LoadMode, TextCorpus};
//! use tcf_types::{Layer, LayerSet};
//!
//! # fn main() -> Result<(), tcf_corpus::CorpusError> {
//! let layers = LayerSet::required().with(Layer::PosTags);
//! let corpus = TextCorpus::load_with_mode("document.xml", layers, LoadMode::Mmap)?;
//! for token in corpus.tokens() {
//!     println!("{} {:?} {:?}", token.text, token.lemma, token.pos);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p tcf-corpus --example stats -- <file>`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tcf_types::{AnnotatedToken, Layer, LayerSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Strategy for reading the corpus file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum LoadMode {
    /// Memory-map the file for the duration of the parse.
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("invalid UTF-8 in character data: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("document has no TextCorpus element")]
    MissingCorpus,
    #[error("document ends inside the TextCorpus element")]
    Truncated,
    #[error("document has no {0} layer")]
    MissingLayer(Layer),
    #[error("token {index} has no ID attribute")]
    MissingTokenId { index: usize },
    #[error("{layer} annotation refers to unknown token {id:?}")]
    UnknownToken { layer: Layer, id: String },
}

/// Parsed TCF `TextCorpus` with annotations resolved onto tokens.
#[derive(Clone, Debug)]
pub struct TextCorpus {
    text: String,
    tokens: Vec<AnnotatedToken>,
    lang: Option<String>,
    pos_tagset: Option<String>,
    present: LayerSet,
    parsed: LayerSet,
}

impl TextCorpus {
    /// Load a TCF file, memory-mapping it while parsing.
    pub fn load(path: impl AsRef<Path>, layers: LayerSet) -> Result<Self, CorpusError> {
        Self::load_with_mode(path, layers, LoadMode::Mmap)
    }

    /// Load a TCF file choosing between mmap and owned buffers at runtime.
    pub fn load_with_mode(
        path: impl AsRef<Path>,
        layers: LayerSet,
        mode: LoadMode,
    ) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        let corpus = Self::from_bytes(buffer.as_slice(), layers)?;
        drop(buffer);
        info!(
            "loaded {} tokens from {} (layers: {:?})",
            corpus.tokens.len(),
            path.display(),
            corpus.parsed
        );
        Ok(corpus)
    }

    /// Parse an in-memory TCF document.
    pub fn from_bytes(bytes: &[u8], layers: LayerSet) -> Result<Self, CorpusError> {
        let mut requested = layers;
        if [Layer::Lemmas, Layer::PosTags, Layer::WordSenses]
            .into_iter()
            .any(|l| requested.contains(l))
        {
            requested.insert(Layer::Tokens);
        }

        let mut parser = Parser::new(requested);
        let mut reader = Reader::from_reader(bytes);
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(CorpusError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    });
                }
            };
            let position = reader.buffer_position() as u64;
            let xml_err = |source: quick_xml::Error| CorpusError::Xml { position, source };
            match event {
                Event::Start(e) => parser.open(&e).map_err(xml_err)?,
                Event::Empty(e) => {
                    parser.open(&e).map_err(xml_err)?;
                    parser.close()?;
                }
                Event::End(_) => parser.close()?,
                Event::Text(e) => {
                    if parser.capturing {
                        let text = e.unescape().map_err(xml_err)?;
                        parser.content.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if parser.capturing {
                        let raw = e.into_inner();
                        parser.content.push_str(std::str::from_utf8(&raw)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        parser.finish()
    }

    /// Raw text of the `text` layer, or an empty string if absent.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[AnnotatedToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `lang` attribute of the `TextCorpus` element.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// `tagset` attribute of the `POStags` layer, if that layer was parsed.
    pub fn pos_tagset(&self) -> Option<&str> {
        self.pos_tagset.as_deref()
    }

    /// Whether the document contains the layer, parsed or not.
    pub fn has_layer(&self, layer: Layer) -> bool {
        self.present.contains(layer)
    }

    /// Layers that were both requested and present.
    pub fn layers(&self) -> LayerSet {
        self.parsed
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer, CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    match mode {
        LoadMode::Mmap => unsafe { Mmap::map(&file) }
            .map(Buffer::Mmap)
            .map_err(io_err),
        LoadMode::Owned => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(io_err)?;
            Ok(Buffer::Owned(buf))
        }
    }
}

enum Item {
    Text,
    Token { id: Option<String> },
    Lemma { refs: String },
    Tag { refs: String },
    Sense { refs: String, lexunits: String },
}

struct Annotation {
    layer: Layer,
    refs: String,
    values: Vec<String>,
}

struct Parser {
    requested: LayerSet,
    present: LayerSet,
    seen_corpus: bool,
    finished: bool,
    // open elements inside TextCorpus, TextCorpus itself counts as 1
    depth: usize,
    layer: Option<Layer>,
    item: Option<Item>,
    capturing: bool,
    content: String,
    text: Option<String>,
    lang: Option<String>,
    pos_tagset: Option<String>,
    tokens: Vec<AnnotatedToken>,
    annotations: Vec<Annotation>,
}

impl Parser {
    fn new(requested: LayerSet) -> Self {
        Self {
            requested,
            present: LayerSet::empty(),
            seen_corpus: false,
            finished: false,
            depth: 0,
            layer: None,
            item: None,
            capturing: false,
            content: String::new(),
            text: None,
            lang: None,
            pos_tagset: None,
            tokens: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) -> quick_xml::Result<()> {
        let name = e.local_name();
        let name = name.as_ref();
        if self.depth == 0 {
            if name == b"TextCorpus" && !self.finished {
                self.depth = 1;
                self.seen_corpus = true;
                self.lang = attribute(e, b"lang")?;
            }
            return Ok(());
        }

        self.depth += 1;
        match self.depth {
            2 => {
                self.layer = std::str::from_utf8(name)
                    .ok()
                    .and_then(Layer::from_element_name);
                let Some(layer) = self.layer else {
                    return Ok(());
                };
                self.present.insert(layer);
                if !self.requested.contains(layer) {
                    return Ok(());
                }
                match layer {
                    Layer::Text => self.begin(Item::Text),
                    Layer::PosTags => self.pos_tagset = attribute(e, b"tagset")?,
                    _ => {}
                }
            }
            3 => {
                let Some(layer) = self.layer.filter(|l| self.requested.contains(*l)) else {
                    return Ok(());
                };
                let item = match (layer, name) {
                    (Layer::Tokens, b"token") => Item::Token {
                        id: attribute(e, b"ID")?,
                    },
                    (Layer::Lemmas, b"lemma") => Item::Lemma {
                        refs: attribute(e, b"tokenIDs")?.unwrap_or_default(),
                    },
                    (Layer::PosTags, b"tag") => Item::Tag {
                        refs: attribute(e, b"tokenIDs")?.unwrap_or_default(),
                    },
                    (Layer::WordSenses, b"ws") => Item::Sense {
                        refs: attribute(e, b"tokenIDs")?.unwrap_or_default(),
                        lexunits: attribute(e, b"lexunits")?.unwrap_or_default(),
                    },
                    _ => return Ok(()),
                };
                self.begin(item);
            }
            _ => {}
        }
        Ok(())
    }

    fn begin(&mut self, item: Item) {
        self.item = Some(item);
        self.capturing = true;
        self.content.clear();
    }

    fn close(&mut self) -> Result<(), CorpusError> {
        match self.depth {
            0 => return Ok(()),
            1 => self.finished = true,
            2 => {
                if matches!(self.item, Some(Item::Text)) {
                    self.end_item()?;
                }
                self.layer = None;
            }
            3 => self.end_item()?,
            _ => {}
        }
        self.depth -= 1;
        Ok(())
    }

    fn end_item(&mut self) -> Result<(), CorpusError> {
        self.capturing = false;
        let Some(item) = self.item.take() else {
            return Ok(());
        };
        let content = std::mem::take(&mut self.content);
        match item {
            Item::Text => self.text = Some(content),
            Item::Token { id } => {
                let index = self.tokens.len();
                let id = id.ok_or(CorpusError::MissingTokenId { index })?;
                let mut token = AnnotatedToken::new(index, content.trim());
                token.id = id;
                self.tokens.push(token);
            }
            Item::Lemma { refs } => self.annotations.push(Annotation {
                layer: Layer::Lemmas,
                refs,
                values: vec![content.trim().to_string()],
            }),
            Item::Tag { refs } => self.annotations.push(Annotation {
                layer: Layer::PosTags,
                refs,
                values: vec![content.trim().to_string()],
            }),
            Item::Sense { refs, lexunits } => {
                let source = if lexunits.trim().is_empty() {
                    content.as_str()
                } else {
                    lexunits.as_str()
                };
                self.annotations.push(Annotation {
                    layer: Layer::WordSenses,
                    refs,
                    values: source.split_whitespace().map(str::to_string).collect(),
                });
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TextCorpus, CorpusError> {
        if !self.seen_corpus {
            return Err(CorpusError::MissingCorpus);
        }
        if self.depth != 0 {
            return Err(CorpusError::Truncated);
        }
        for layer in [Layer::Tokens, Layer::Lemmas] {
            if self.requested.contains(layer) && !self.present.contains(layer) {
                return Err(CorpusError::MissingLayer(layer));
            }
        }

        let mut ids: HashMap<&str, usize> = HashMap::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if ids.insert(token.id.as_str(), token.index).is_some() {
                warn!("duplicate token ID {:?}; later token wins", token.id);
            }
        }

        let mut resolved = Vec::new();
        for annotation in self.annotations.iter() {
            for id in annotation.refs.split_whitespace() {
                let index = *ids.get(id).ok_or_else(|| CorpusError::UnknownToken {
                    layer: annotation.layer,
                    id: id.to_string(),
                })?;
                resolved.push((index, annotation));
            }
        }
        let annotation_count = resolved.len();
        for (index, annotation) in resolved {
            let token = &mut self.tokens[index];
            match annotation.layer {
                Layer::Lemmas => {
                    if token.lemma.is_none() {
                        token.lemma = annotation.values.first().cloned();
                    }
                }
                Layer::PosTags => {
                    if token.pos.is_none() {
                        token.pos = annotation.values.first().cloned();
                    }
                }
                Layer::WordSenses => token.wordsenses.extend(annotation.values.iter().cloned()),
                Layer::Text | Layer::Tokens => {}
            }
        }
        debug!(
            "resolved {} annotations onto {} tokens",
            annotation_count,
            self.tokens.len()
        );

        let parsed = self
            .present
            .iter()
            .filter(|l| self.requested.contains(*l))
            .collect();
        Ok(TextCorpus {
            text: self.text.unwrap_or_default(),
            tokens: self.tokens,
            lang: self.lang,
            pos_tagset: self.pos_tagset,
            present: self.present,
            parsed,
        })
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<D-Spin xmlns="http://www.dspin.de/data" version="0.4">
  <MetaData xmlns="http://www.dspin.de/data/metadata"/>
  <tc:TextCorpus xmlns:tc="http://www.dspin.de/data/textcorpus" lang="en">
    <tc:text>The cat sat.</tc:text>
    <tc:tokens>
      <tc:token ID="t1">The</tc:token>
      <tc:token ID="t2">cat</tc:token>
      <tc:token ID="t3">sat</tc:token>
      <tc:token ID="t4">.</tc:token>
    </tc:tokens>
    <tc:lemmas>
      <tc:lemma tokenIDs="t1">the</tc:lemma>
      <tc:lemma tokenIDs="t2">cat</tc:lemma>
      <tc:lemma tokenIDs="t3">sit</tc:lemma>
      <tc:lemma tokenIDs="t4">.</tc:lemma>
    </tc:lemmas>
    <tc:POStags tagset="penn">
      <tc:tag tokenIDs="t1">DT</tc:tag>
      <tc:tag tokenIDs="t2">NN</tc:tag>
      <tc:tag tokenIDs="t3">VBD</tc:tag>
      <tc:tag tokenIDs="t4">.</tc:tag>
    </tc:POStags>
  </tc:TextCorpus>
</D-Spin>"#;

    #[test]
    fn parses_requested_layers_only() {
        let corpus = TextCorpus::from_bytes(SAMPLE.as_bytes(), LayerSet::required()).unwrap();
        assert_eq!(corpus.text(), "The cat sat.");
        assert_eq!(corpus.lang(), Some("en"));
        assert_eq!(corpus.len(), 4);
        assert_eq!(corpus.tokens()[2].text, "sat");
        assert_eq!(corpus.tokens()[2].lemma.as_deref(), Some("sit"));
        assert_eq!(corpus.tokens()[2].pos, None);
        assert!(corpus.has_layer(Layer::PosTags));
        assert!(!corpus.layers().contains(Layer::PosTags));
        assert_eq!(corpus.pos_tagset(), None);
    }

    #[test]
    fn folds_pos_tags_when_requested() {
        let layers = LayerSet::required().with(Layer::PosTags);
        let corpus = TextCorpus::from_bytes(SAMPLE.as_bytes(), layers).unwrap();
        let tags: Vec<_> = corpus
            .tokens()
            .iter()
            .map(|t| t.pos.as_deref().unwrap())
            .collect();
        assert_eq!(tags, vec!["DT", "NN", "VBD", "."]);
        assert_eq!(corpus.pos_tagset(), Some("penn"));
        assert!(corpus.layers().contains(Layer::PosTags));
        assert!(!corpus.has_layer(Layer::WordSenses));
    }

    #[test]
    fn positions_follow_document_order() {
        let corpus = TextCorpus::from_bytes(SAMPLE.as_bytes(), LayerSet::required()).unwrap();
        for (i, token) in corpus.tokens().iter().enumerate() {
            assert_eq!(token.index, i);
        }
        assert_eq!(corpus.tokens()[0].id, "t1");
    }

    #[test]
    fn rejects_plain_text() {
        let err = TextCorpus::from_bytes(b"just some words", LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::MissingCorpus));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let doc = br#"<TextCorpus><tokens><token ID="a">x</tokens></TextCorpus>"#;
        let err = TextCorpus::from_bytes(doc, LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::Xml { .. }));
    }

    #[test]
    fn rejects_truncated_document() {
        let doc = br#"<TextCorpus><tokens><token ID="a">x</token></tokens>"#;
        let err = TextCorpus::from_bytes(doc, LayerSet::required()).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::Truncated | CorpusError::Xml { .. }
        ));
    }

    #[test]
    fn requires_lemma_layer() {
        let doc = br#"<TextCorpus><tokens><token ID="a">x</token></tokens></TextCorpus>"#;
        let err = TextCorpus::from_bytes(doc, LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::MissingLayer(Layer::Lemmas)));
    }

    #[test]
    fn reports_unknown_token_reference() {
        let doc = br#"<TextCorpus><tokens><token ID="a">x</token></tokens>
            <lemmas><lemma tokenIDs="b">x</lemma></lemmas></TextCorpus>"#;
        let err = TextCorpus::from_bytes(doc, LayerSet::required()).unwrap_err();
        match err {
            CorpusError::UnknownToken { layer, id } => {
                assert_eq!(layer, Layer::Lemmas);
                assert_eq!(id, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_token_without_id() {
        let doc = br#"<TextCorpus><tokens><token>x</token></tokens><lemmas/></TextCorpus>"#;
        let err = TextCorpus::from_bytes(doc, LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::MissingTokenId { index: 0 }));
    }

    #[test]
    fn rejects_invalid_utf8_in_text() {
        let mut doc = br#"<TextCorpus><tokens><token ID="a">"#.to_vec();
        doc.extend_from_slice(&[0xff, 0xfe]);
        doc.extend_from_slice(br#"</token></tokens><lemmas/></TextCorpus>"#);
        let err = TextCorpus::from_bytes(&doc, LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::Xml { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_invalid_utf8_in_cdata() {
        let mut doc = br#"<TextCorpus><tokens><token ID="a"><![CDATA["#.to_vec();
        doc.push(0xff);
        doc.extend_from_slice(br#"]]></token></tokens><lemmas/></TextCorpus>"#);
        let err = TextCorpus::from_bytes(&doc, LayerSet::required()).unwrap_err();
        assert!(matches!(err, CorpusError::Utf8(_)), "got {err:?}");
    }
}
