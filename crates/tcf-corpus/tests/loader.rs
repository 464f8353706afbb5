use std::path::PathBuf;

use tcf_corpus::{CorpusError, LoadMode, TextCorpus};
use tcf_types::{Layer, LayerSet};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn all_layers() -> LayerSet {
    LayerSet::required()
        .with(Layer::PosTags)
        .with(Layer::WordSenses)
}

#[test]
fn loads_every_layer_from_fixture() {
    let corpus = TextCorpus::load(fixture("bank.xml"), all_layers()).expect("load fixture");
    assert_eq!(corpus.text(), "The bank & the river bank.");
    assert_eq!(corpus.len(), 7);

    let bank = &corpus.tokens()[1];
    assert_eq!(bank.id, "t_1");
    assert_eq!(bank.text, "bank");
    assert_eq!(bank.lemma.as_deref(), Some("bank"));
    assert_eq!(bank.pos.as_deref(), Some("NN"));
    assert_eq!(bank.wordsenses, vec!["financial", "river"]);

    let amp = &corpus.tokens()[2];
    assert_eq!(amp.text, "&");
    assert!(amp.wordsenses.is_empty());
    assert_eq!(corpus.pos_tagset(), Some("penn"));
}

#[test]
fn owned_and_mmap_modes_agree() {
    let mapped = TextCorpus::load_with_mode(fixture("bank.xml"), all_layers(), LoadMode::Mmap)
        .expect("mmap load");
    let owned = TextCorpus::load_with_mode(fixture("bank.xml"), all_layers(), LoadMode::Owned)
        .expect("owned load");
    assert_eq!(mapped.tokens(), owned.tokens());
    assert_eq!(mapped.text(), owned.text());
}

#[test]
fn skipped_layers_are_still_reported_present() {
    let corpus = TextCorpus::load(fixture("bank.xml"), LayerSet::required()).expect("load");
    assert!(corpus.has_layer(Layer::WordSenses));
    assert!(!corpus.layers().contains(Layer::WordSenses));
    assert!(corpus.tokens().iter().all(|t| t.wordsenses.is_empty()));
    assert!(corpus.tokens().iter().all(|t| t.pos.is_none()));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = TextCorpus::load(fixture("does-not-exist.xml"), LayerSet::required()).unwrap_err();
    assert!(matches!(err, CorpusError::Io { .. }));
    assert!(err.to_string().contains("does-not-exist.xml"));
}

#[test]
fn empty_layers_yield_empty_corpus() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.xml");
    std::fs::write(
        &path,
        r#"<D-Spin><TextCorpus lang="de"><text/><tokens/><lemmas/></TextCorpus></D-Spin>"#,
    )?;
    let corpus = TextCorpus::load_with_mode(&path, LayerSet::required(), LoadMode::Owned)?;
    assert!(corpus.is_empty());
    assert_eq!(corpus.text(), "");
    assert_eq!(corpus.lang(), Some("de"));
    Ok(())
}
