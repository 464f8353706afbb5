use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{GraphOptions, TokenizerConfig};
use crate::error::TextplotError;
use crate::text::{DocumentSource, TcfText};

/// Seam to a co-occurrence graph implementation.
///
/// `index` receives the document and the terms selected for the graph;
/// `build` turns whatever was indexed into the final graph.
pub trait GraphBuilder {
    type Graph;
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    fn index<D: DocumentSource>(&mut self, source: &D, terms: &[&str]) -> Result<(), Self::Error>;

    fn build(&mut self, skim_depth: usize, d_weights: bool) -> Result<Self::Graph, Self::Error>;
}

/// Load a TCF file and build a graph over its most frequent terms.
pub fn frequent<B: GraphBuilder>(
    path: impl AsRef<Path>,
    config: &TokenizerConfig,
    options: &GraphOptions,
    builder: B,
) -> Result<B::Graph, TextplotError> {
    let text = TcfText::from_file(path, config)?;
    build_graph(&text, options, builder)
}

/// Build a graph over the `term_depth` most frequent terms of `source`.
pub fn build_graph<D: DocumentSource, B: GraphBuilder>(
    source: &D,
    options: &GraphOptions,
    mut builder: B,
) -> Result<B::Graph, TextplotError> {
    info!("Indexing terms:");
    let terms = source.most_frequent_terms(options.term_depth);
    builder
        .index(source, &terms)
        .map_err(|e| TextplotError::Graph(e.into()))?;

    info!("Generating graph:");
    builder
        .build(options.skim_depth, options.d_weights)
        .map_err(|e| TextplotError::Graph(e.into()))
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("term {0:?} is not in the document's term table")]
    UnknownTerm(String),
    #[error("build called before index")]
    NotIndexed,
}

/// One selected term with the offsets it occurs at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportedTerm {
    pub term: String,
    pub display: String,
    pub offsets: Vec<usize>,
}

/// Term offsets and pass-through settings handed to an external grapher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphInput {
    pub token_count: usize,
    pub skim_depth: usize,
    pub d_weights: bool,
    pub terms: Vec<ExportedTerm>,
}

/// Builder that exports the indexed offsets instead of weighting them.
#[derive(Debug, Default)]
pub struct OffsetExport {
    indexed: Option<(usize, Vec<ExportedTerm>)>,
}

impl OffsetExport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphBuilder for OffsetExport {
    type Graph = GraphInput;
    type Error = ExportError;

    fn index<D: DocumentSource>(&mut self, source: &D, terms: &[&str]) -> Result<(), ExportError> {
        let exported = terms
            .iter()
            .map(|term| {
                let offsets = source
                    .terms()
                    .get(term)
                    .ok_or_else(|| ExportError::UnknownTerm(term.to_string()))?;
                Ok(ExportedTerm {
                    term: term.to_string(),
                    display: source.unstem(term).into_owned(),
                    offsets: offsets.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;
        self.indexed = Some((source.tokens().len(), exported));
        Ok(())
    }

    fn build(&mut self, skim_depth: usize, d_weights: bool) -> Result<GraphInput, ExportError> {
        let (token_count, terms) = self.indexed.take().ok_or(ExportError::NotIndexed)?;
        Ok(GraphInput {
            token_count,
            skim_depth,
            d_weights,
            terms,
        })
    }
}
