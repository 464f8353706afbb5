use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tcf_corpus::{LoadMode, TextCorpus};
use tcf_types::{Layer, LayerSet};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p tcf-corpus --example stats -- <path-to-tcf-file>")?;

    let layers: LayerSet = Layer::ALL.into_iter().collect();
    let corpus = TextCorpus::load_with_mode(&path, layers, LoadMode::Mmap)
        .with_context(|| format!("loading TCF corpus from {}", path.display()))?;

    let lemmatized = corpus.tokens().iter().filter(|t| t.lemma.is_some()).count();
    let tagged = corpus.tokens().iter().filter(|t| t.pos.is_some()).count();
    let sense_count: usize = corpus.tokens().iter().map(|t| t.wordsenses.len()).sum();

    println!("Corpus       : {}", path.display());
    println!("Language     : {}", corpus.lang().unwrap_or("-"));
    println!("Text length  : {} bytes", corpus.text().len());
    println!("Tokens       : {}", corpus.len());
    println!("Lemmatized   : {}", lemmatized);
    println!(
        "POS tagged   : {} (tagset {})",
        tagged,
        corpus.pos_tagset().unwrap_or("-")
    );
    println!("Word senses  : {}", sense_count);
    for layer in Layer::ALL {
        println!("Layer {:<11}: {}", layer.element_name(), corpus.has_layer(layer));
    }

    Ok(())
}
