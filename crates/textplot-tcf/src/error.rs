use std::path::PathBuf;

use tcf_corpus::CorpusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextplotError {
    #[error("failed to parse corpus: {0}")]
    CorpusParse(#[from] CorpusError),
    #[error("failed to read stopword file {}: {source}", .path.display())]
    StopwordFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("graph builder failed: {0}")]
    Graph(#[source] Box<dyn std::error::Error + Send + Sync>),
}
