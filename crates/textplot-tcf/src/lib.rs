pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod stopwords;
pub mod text;
pub mod token;
pub mod tokenizer;

pub use config::{
    DEFAULT_SKIM_DEPTH, DEFAULT_TERM_DEPTH, GraphOptions, StopwordSource, TokenizerConfig,
    load_tagset,
};
pub use error::TextplotError;
pub use filter::{DiscardReason, PosFilter, TokenFilter};
pub use graph::{ExportedTerm, GraphBuilder, GraphInput, OffsetExport, build_graph, frequent};
pub use stopwords::Stopwords;
pub use text::{DocumentSource, TcfText};
pub use token::{TermTable, TokenRecord, TokenSlot, TokenStream, normalize};
pub use tokenizer::{TokenizeStats, Tokenized, Tokenizer};
