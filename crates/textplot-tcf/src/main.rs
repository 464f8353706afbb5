use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tcf_corpus::LoadMode;
use tcf_tagset::Tagset;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use textplot_tcf::{
    DEFAULT_SKIM_DEPTH, DEFAULT_TERM_DEPTH, DocumentSource, GraphOptions, OffsetExport,
    StopwordSource, TcfText, TokenRecord, TokenizerConfig, frequent, load_tagset,
};

const DEFAULT_TERMS_LIMIT: usize = 20;

#[derive(Parser)]
#[command(name = "textplot-tcf")]
#[command(about = "Index lemmatized TCF corpora for term co-occurrence graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the most frequent terms and export their offsets as JSON.
    Graph {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, env = "TEXTPLOT_TERM_DEPTH", default_value_t = DEFAULT_TERM_DEPTH)]
        term_depth: usize,
        #[arg(long, env = "TEXTPLOT_SKIM_DEPTH", default_value_t = DEFAULT_SKIM_DEPTH)]
        skim_depth: usize,
        #[arg(long, env = "TEXTPLOT_D_WEIGHTS", default_value_t = false)]
        d_weights: bool,
        /// Write JSON here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the most frequent terms with their counts.
    Terms {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = DEFAULT_TERMS_LIMIT)]
        limit: usize,
    },
    /// Dump the token stream as JSON lines, `null` for discarded positions.
    Tokens {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// TCF corpus file.
    path: PathBuf,
    /// Stopword file; an empty value disables stopword filtering.
    #[arg(long, env = "TEXTPLOT_STOPWORDS")]
    stopwords: Option<String>,
    /// Comma-separated POS allow-list.
    #[arg(long, env = "TEXTPLOT_POSTAGS", value_delimiter = ',')]
    postags: Vec<String>,
    /// Qualify lemmas with their word senses.
    #[arg(long, env = "TEXTPLOT_DISAMBIGUATE", default_value_t = false)]
    disambiguate: bool,
    /// Custom tagset file instead of the bundled one.
    #[arg(long, env = "TEXTPLOT_TAGSET")]
    tagset: Option<PathBuf>,
    #[arg(long, env = "TEXTPLOT_LOAD_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    load_mode: LoadMode,
}

impl Commands {
    /// Whether the command's result is written to stdout.
    fn writes_stdout(&self) -> bool {
        !matches!(self, Commands::Graph { output: Some(_), .. })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(!cli.command.writes_stdout());

    match cli.command {
        Commands::Graph {
            input,
            term_depth,
            skim_depth,
            d_weights,
            output,
        } => {
            let config = load_config(&input)?;
            let options = GraphOptions {
                term_depth,
                skim_depth,
                d_weights,
            };
            let start = Instant::now();
            let graph = frequent(&input.path, &config, &options, OffsetExport::new())
                .with_context(|| format!("building graph input from {}", input.path.display()))?;
            info!(
                "selected {} terms in {} ms",
                graph.terms.len(),
                start.elapsed().as_millis()
            );
            write_json(output.as_ref(), &graph)?;
        }
        Commands::Terms { input, limit } => {
            let text = load_text(&input)?;
            let counts = text.term_counts();
            let selected = text.most_frequent_terms(limit);
            let mut out = io::stdout().lock();
            for (term, count) in counts.iter().filter(|(t, _)| selected.contains(t)) {
                writeln!(out, "{}\t{}", text.unstem(term), count)?;
            }
        }
        Commands::Tokens { input } => {
            let text = load_text(&input)?;
            let mut out = BufWriter::new(io::stdout().lock());
            for slot in text.tokens() {
                let record: Option<&TokenRecord> = slot.record();
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
            out.flush()?;
        }
    }

    Ok(())
}

fn load_config(input: &InputArgs) -> Result<TokenizerConfig> {
    let tagset = match &input.tagset {
        Some(path) => load_tagset(path)?,
        None => Tagset::builtin(),
    };
    let postags = (!input.postags.is_empty()).then(|| input.postags.clone());
    let config = TokenizerConfig {
        stopwords: StopwordSource::from_option(input.stopwords.as_deref()),
        postags,
        disambiguate: input.disambiguate,
        tagset,
        load_mode: input.load_mode,
    };
    info!(
        "reading {} (stopwords: {:?}, postags: {:?}, disambiguate: {}, mode: {:?})",
        input.path.display(),
        config.stopwords,
        config.postags,
        config.disambiguate,
        config.load_mode
    );
    Ok(config)
}

fn load_text(input: &InputArgs) -> Result<TcfText> {
    let config = load_config(input)?;
    TcfText::from_file(&input.path, &config)
        .with_context(|| format!("loading {}", input.path.display()))
}

fn write_json<T: Serialize>(output: Option<&PathBuf>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
            writer.flush()?;
            info!("wrote {}", path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        other => Err(format!("unknown load mode {other:?} (expected mmap or owned)")),
    }
}

/// Log to stdout only when stdout carries no command output.
fn init_tracing(log_to_stdout: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level);
    if log_to_stdout {
        builder.with_ansi(io::stdout().is_terminal()).init();
    } else {
        builder
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .init();
    }
}
