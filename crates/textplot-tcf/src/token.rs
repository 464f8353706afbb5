use std::collections::HashMap;

use serde::Serialize;
use tcf_types::AnnotatedToken;

/// Canonical form of one retained corpus position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    /// Term key: the lemma, optionally qualified with word senses.
    pub stemmed: String,
    /// Surface form as written in the corpus.
    pub unstemmed: String,
    /// Position in the full, unfiltered token sequence.
    pub offset: usize,
    /// Index of the source [`AnnotatedToken`] in the tokenized slice.
    #[serde(skip)]
    pub raw_index: usize,
}

/// Build the record for the token at `offset`.
///
/// With `disambiguate` set, the key becomes `lemma (sense1, sense2)` using the
/// senses in corpus order. Tokens without senses keep the bare lemma, and
/// tokens without a lemma fall back to their surface form.
pub fn normalize(raw: &AnnotatedToken, offset: usize, disambiguate: bool) -> TokenRecord {
    let lemma = raw.lemma_or_text();
    let stemmed = if disambiguate && !raw.wordsenses.is_empty() {
        format!("{lemma} ({})", raw.wordsenses.join(", "))
    } else {
        lemma.to_string()
    };
    TokenRecord {
        stemmed,
        unstemmed: raw.text.clone(),
        offset,
        raw_index: offset,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenSlot {
    Discarded,
    Retained(TokenRecord),
}

impl TokenSlot {
    pub fn record(&self) -> Option<&TokenRecord> {
        match self {
            TokenSlot::Retained(record) => Some(record),
            TokenSlot::Discarded => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, TokenSlot::Discarded)
    }
}

/// One slot per corpus position; discarded positions keep their place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    slots: Vec<TokenSlot>,
}

impl TokenStream {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, slot: TokenSlot) {
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&TokenSlot> {
        self.slots.get(offset)
    }

    pub fn slots(&self) -> &[TokenSlot] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenSlot> {
        self.slots.iter()
    }

    /// Retained records in stream order.
    pub fn records(&self) -> impl Iterator<Item = &TokenRecord> + '_ {
        self.slots.iter().filter_map(TokenSlot::record)
    }

    pub fn retained_count(&self) -> usize {
        self.records().count()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a TokenSlot;
    type IntoIter = std::slice::Iter<'a, TokenSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

/// Stemmed key to occurrence offsets, keys in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermTable {
    entries: Vec<(String, Vec<usize>)>,
    lookup: HashMap<String, usize>,
}

impl TermTable {
    pub(crate) fn push(&mut self, term: &str, offset: usize) {
        match self.lookup.get(term) {
            Some(&slot) => self.entries[slot].1.push(offset),
            None => {
                self.lookup.insert(term.to_string(), self.entries.len());
                self.entries.push((term.to_string(), vec![offset]));
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&[usize]> {
        self.lookup
            .get(term)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.lookup.contains_key(term)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(term, _)| term.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.entries
            .iter()
            .map(|(term, offsets)| (term.as_str(), offsets.as_slice()))
    }
}
