use std::collections::BTreeSet;

use proptest::prelude::*;
use tcf_tagset::Tagset;
use tcf_types::AnnotatedToken;
use textplot_tcf::{
    PosFilter, StopwordSource, Stopwords, TokenFilter, Tokenized, Tokenizer, TokenizerConfig,
};

const VOCAB: &[(&str, &str, &str)] = &[
    ("the", "the", "DT"),
    ("The", "the", "DT"),
    ("cat", "cat", "NN"),
    ("cats", "cat", "NNS"),
    ("sat", "sit", "VBD"),
    ("and", "and", "CC"),
    ("Haus", "Haus", "NN"),
    ("und", "und", "KON"),
    ("bank", "bank", "NN"),
    ("ran", "run", "VBD"),
    (".", ".", "."),
];

fn corpus() -> impl Strategy<Value = Vec<AnnotatedToken>> {
    prop::collection::vec(
        (prop::sample::select(VOCAB.to_vec()), any::<bool>()),
        0..64,
    )
    .prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, ((text, lemma, pos), tagged))| {
                let token = AnnotatedToken::new(i, text).with_lemma(lemma);
                if tagged { token.with_pos(pos) } else { token }
            })
            .collect()
    })
}

fn tokenizer(stopwords: StopwordSource, postags: Option<Vec<String>>) -> Tokenizer {
    Tokenizer::from_config(&TokenizerConfig {
        stopwords,
        postags,
        ..TokenizerConfig::default()
    })
    .expect("valid config")
}

fn retained_positions(out: &Tokenized) -> BTreeSet<usize> {
    out.tokens
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.is_discarded())
        .map(|(i, _)| i)
        .collect()
}

proptest! {
    #[test]
    fn every_position_has_a_slot(tokens in corpus()) {
        let out = tokenizer(StopwordSource::Default, None).tokenize(&tokens);
        prop_assert_eq!(out.tokens.len(), tokens.len());
        prop_assert_eq!(out.stats.total, tokens.len());
    }

    #[test]
    fn offsets_are_original_positions(tokens in corpus()) {
        let out = tokenizer(StopwordSource::Default, Some(vec!["noun".into()])).tokenize(&tokens);
        for (i, slot) in out.tokens.iter().enumerate() {
            if let Some(record) = slot.record() {
                prop_assert_eq!(record.offset, i);
                prop_assert_eq!(&record.unstemmed, &tokens[i].text);
            }
        }
    }

    #[test]
    fn term_offsets_match_retained_slots(tokens in corpus()) {
        let out = tokenizer(StopwordSource::Default, None).tokenize(&tokens);
        let mut from_terms = BTreeSet::new();
        let mut total = 0usize;
        for (term, offsets) in out.terms.iter() {
            for &offset in offsets {
                let record = out.tokens.get(offset).and_then(|s| s.record());
                prop_assert_eq!(record.map(|r| r.stemmed.as_str()), Some(term));
                from_terms.insert(offset);
                total += 1;
            }
            prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        }
        prop_assert_eq!(total, from_terms.len());
        prop_assert_eq!(from_terms, retained_positions(&out));
    }

    #[test]
    fn tokenization_is_deterministic(tokens in corpus()) {
        let allowed = Some(vec!["noun".into(), "verb".into()]);
        let tokenizer = tokenizer(StopwordSource::Default, allowed);
        prop_assert_eq!(tokenizer.tokenize(&tokens), tokenizer.tokenize(&tokens));
    }

    #[test]
    fn disabling_stopwords_never_drops_more(tokens in corpus()) {
        let filtered = tokenizer(StopwordSource::Default, None).tokenize(&tokens);
        let unfiltered = tokenizer(StopwordSource::Disabled, None).tokenize(&tokens);
        prop_assert!(unfiltered.stats.retained >= filtered.stats.retained);
        prop_assert_eq!(unfiltered.stats.retained, tokens.len());
    }

    #[test]
    fn stats_add_up(tokens in corpus()) {
        let pos = PosFilter::new(Some(&["noun".to_string()][..]), Tagset::builtin()).unwrap();
        let filter = TokenFilter::new(Stopwords::parse("the\nund"), pos);
        let out = Tokenizer::new(filter, false).tokenize(&tokens);
        let stats = out.stats;
        prop_assert_eq!(stats.retained + stats.stopword_discards + stats.pos_discards, stats.total);
        prop_assert_eq!(stats.retained, out.tokens.retained_count());
    }
}
