//! Hierarchical part-of-speech tagsets.
//!
//! A tagset is a DAG of tag names. Each tag lists zero or more parents, and a
//! tag "is-a" every tag reachable through its parents. Fine-grained corpus
//! tags (`NN`, `VVFIN`, `common-noun-singular`) can therefore be matched
//! against coarse categories (`noun`, `verb`) without the caller knowing the
//! concrete tagset a corpus was annotated with.
//!
//! The bundled tagset ([`Tagset::builtin`]) covers coarse categories, a layer
//! of descriptive labels and the STTS and Penn Treebank tags. Custom tagsets
//! use the same text format, one tag per line:
//!
//! ```text
//! # comment
//! noun
//! common-noun noun
//! NN common-noun
//! ```
//!
//! # Example
//! ```rust
//! use tcf_tagset::Tagset;
//!
//! let tagset = Tagset::builtin();
//! assert!(tagset.is_a("NN", "noun"));
//! assert!(tagset.is_a("common-noun-singular", "noun"));
//! assert!(!tagset.is_a("VVFIN", "noun"));
//! ```
//!
//! For a runnable demo, see `cargo run -p tcf-tagset --example is_a -- <tag> <tag>`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};

const BUILTIN: &str = include_str!("../data/default.tagset");

/// Immutable tag hierarchy with ancestor queries.
#[derive(Clone, Debug, Default)]
pub struct Tagset {
    parents: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl Tagset {
    /// Process-wide shared instance of the bundled tagset.
    pub fn builtin() -> Arc<Tagset> {
        static BUILTIN_TAGSET: OnceLock<Arc<Tagset>> = OnceLock::new();
        Arc::clone(BUILTIN_TAGSET.get_or_init(|| {
            Arc::new(Tagset::parse(BUILTIN).expect("bundled tagset is valid"))
        }))
    }

    /// Load a tagset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("open tagset file {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("parse tagset file {}", path.display()))
    }

    /// Parse the `tag [parent...]` line format.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();
        let mut order = Vec::new();
        let mut declared_on: HashMap<String, usize> = HashMap::new();

        for (lineno, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(tag) = parts.next() else {
                continue;
            };
            if let Some(first) = declared_on.insert(tag.to_string(), lineno + 1) {
                anyhow::bail!(
                    "line {}: tag {tag:?} already declared on line {first}",
                    lineno + 1
                );
            }
            order.push(tag.to_string());
            parents.insert(tag.to_string(), parts.map(str::to_string).collect());
        }

        for tag in &order {
            for parent in &parents[tag] {
                if !parents.contains_key(parent) {
                    anyhow::bail!(
                        "line {}: tag {tag:?} has undeclared parent {parent:?}",
                        declared_on[tag]
                    );
                }
            }
        }

        Ok(Self { parents, order })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.parents.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Direct parents of a tag, or an empty slice for unknown tags.
    pub fn parents(&self, tag: &str) -> &[String] {
        self.parents.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All ancestors of `tag`, nearest first. The tag itself is not included.
    pub fn ancestors<'a>(&'a self, tag: &str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = self.parents(tag).iter().map(String::as_str).collect();
        while let Some(next) = queue.pop_front() {
            if next == tag || !seen.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.parents(next).iter().map(String::as_str));
        }
        out
    }

    /// Whether `candidate` equals `allowed` or is a refinement of it.
    pub fn is_a(&self, candidate: &str, allowed: &str) -> bool {
        if candidate == allowed {
            return true;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> =
            self.parents(candidate).iter().map(String::as_str).collect();
        while let Some(next) = queue.pop_front() {
            if next == allowed {
                return true;
            }
            if seen.insert(next) {
                queue.extend(self.parents(next).iter().map(String::as_str));
            }
        }
        false
    }
}
