use std::sync::Arc;

use tcf_tagset::Tagset;
use tcf_types::AnnotatedToken;

use crate::config::TokenizerConfig;
use crate::error::TextplotError;
use crate::stopwords::Stopwords;
use crate::token::TokenRecord;

/// Why a position was dropped from the term index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DiscardReason {
    Stopword,
    PartOfSpeech,
}

/// POS allow-list matched through the tagset's is-a relation.
#[derive(Clone, Debug)]
pub struct PosFilter {
    allowed: Option<Vec<String>>,
    tagset: Arc<Tagset>,
}

impl PosFilter {
    /// Filter that lets every token through.
    pub fn disabled() -> Self {
        Self {
            allowed: None,
            tagset: Tagset::builtin(),
        }
    }

    /// Every allowed tag must be declared in `tagset`. An empty list is the
    /// same as no list.
    pub fn new(allowed: Option<&[String]>, tagset: Arc<Tagset>) -> Result<Self, TextplotError> {
        let allowed = match allowed {
            Some(tags) if !tags.is_empty() => tags.to_vec(),
            _ => return Ok(Self { allowed: None, tagset }),
        };
        let unknown: Vec<&str> = allowed
            .iter()
            .map(String::as_str)
            .filter(|tag| !tagset.contains(tag))
            .collect();
        if !unknown.is_empty() {
            return Err(TextplotError::Configuration(format!(
                "POS tags not in tagset: {}",
                unknown.join(", ")
            )));
        }
        Ok(Self {
            allowed: Some(allowed),
            tagset,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.allowed.is_some()
    }

    /// Untagged tokens fail an enabled filter.
    pub fn test(&self, token: &AnnotatedToken) -> bool {
        let Some(allowed) = &self.allowed else {
            return true;
        };
        let Some(pos) = token.pos.as_deref() else {
            return false;
        };
        allowed.iter().any(|tag| self.tagset.is_a(pos, tag))
    }
}

/// Stopword and POS checks applied to every normalized token.
#[derive(Clone, Debug)]
pub struct TokenFilter {
    stopwords: Stopwords,
    pos: PosFilter,
}

impl TokenFilter {
    pub fn new(stopwords: Stopwords, pos: PosFilter) -> Self {
        Self { stopwords, pos }
    }

    /// Validate the POS allow-list, then load stopwords.
    pub fn from_config(config: &TokenizerConfig) -> Result<Self, TextplotError> {
        let pos = PosFilter::new(config.postags.as_deref(), Arc::clone(&config.tagset))?;
        let stopwords = Stopwords::load(&config.stopwords)?;
        Ok(Self::new(stopwords, pos))
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    pub fn pos(&self) -> &PosFilter {
        &self.pos
    }

    pub fn discard_reason(
        &self,
        record: &TokenRecord,
        raw: &AnnotatedToken,
    ) -> Option<DiscardReason> {
        if self.stopwords.contains(&record.unstemmed) || self.stopwords.contains(&record.stemmed) {
            Some(DiscardReason::Stopword)
        } else if !self.pos.test(raw) {
            Some(DiscardReason::PartOfSpeech)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::normalize;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn refinements_pass_the_allow_list() {
        let allowed = tags(&["noun"]);
        let filter = PosFilter::new(Some(allowed.as_slice()), Tagset::builtin()).unwrap();
        let noun = AnnotatedToken::new(0, "cat").with_pos("common-noun-singular");
        let verb = AnnotatedToken::new(1, "sat").with_pos("verb");
        let stts = AnnotatedToken::new(2, "Haus").with_pos("NN");
        assert!(filter.test(&noun));
        assert!(!filter.test(&verb));
        assert!(filter.test(&stts));
    }

    #[test]
    fn untagged_tokens_fail_enabled_filter() {
        let allowed = tags(&["noun"]);
        let filter = PosFilter::new(Some(allowed.as_slice()), Tagset::builtin()).unwrap();
        assert!(!filter.test(&AnnotatedToken::new(0, "cat")));
        assert!(PosFilter::disabled().test(&AnnotatedToken::new(0, "cat")));
    }

    #[test]
    fn empty_allow_list_is_disabled() {
        let filter = PosFilter::new(Some(&[] as &[String]), Tagset::builtin()).unwrap();
        assert!(!filter.is_enabled());
        assert!(filter.test(&AnnotatedToken::new(0, "sat").with_pos("verb")));
    }

    #[test]
    fn unknown_allowed_tags_are_configuration_errors() {
        let allowed = tags(&["noun", "nuon", "verbb"]);
        let err = PosFilter::new(Some(allowed.as_slice()), Tagset::builtin()).unwrap_err();
        match err {
            TextplotError::Configuration(msg) => {
                assert!(msg.contains("nuon"));
                assert!(msg.contains("verbb"));
                assert!(!msg.contains("noun,"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn either_form_triggers_stopword_discard() {
        let filter = TokenFilter::new(Stopwords::parse("the\nbe"), PosFilter::disabled());
        let surface = AnnotatedToken::new(0, "the").with_lemma("THE");
        let lemma = AnnotatedToken::new(1, "was").with_lemma("be");
        let kept = AnnotatedToken::new(2, "cat").with_lemma("cat");
        for (raw, expected) in [
            (&surface, Some(DiscardReason::Stopword)),
            (&lemma, Some(DiscardReason::Stopword)),
            (&kept, None),
        ] {
            let record = normalize(raw, raw.index, false);
            assert_eq!(filter.discard_reason(&record, raw), expected);
        }
    }

    #[test]
    fn pos_discard_after_stopword_check() {
        let allowed = tags(&["noun"]);
        let pos = PosFilter::new(Some(allowed.as_slice()), Tagset::builtin()).unwrap();
        let filter = TokenFilter::new(Stopwords::parse("the"), pos);
        let article = AnnotatedToken::new(0, "the").with_lemma("the").with_pos("DT");
        let verb = AnnotatedToken::new(1, "sat").with_lemma("sit").with_pos("VBD");
        let record = normalize(&article, 0, false);
        assert_eq!(
            filter.discard_reason(&record, &article),
            Some(DiscardReason::Stopword)
        );
        let record = normalize(&verb, 1, false);
        assert_eq!(
            filter.discard_reason(&record, &verb),
            Some(DiscardReason::PartOfSpeech)
        );
    }
}
