//! Term -> frequency dictionaries and the character counts a codec is built from.

use crate::codec::HuffmanCodec;
use crate::config::CodecConfig;
use crate::error::Result;
use crate::huffman::FrequencyTable;
use std::collections::HashMap;

/// Ordered (term, frequency) pairs with map semantics.
///
/// Entries iterate in insertion order. Inserting a term again replaces its
/// frequency and keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct FrequencyDictionary {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a term. Returns the previous frequency, if any.
    pub fn insert(&mut self, term: impl Into<String>, frequency: u64) -> Option<u64> {
        let term = term.into();
        match self.index.get(&term) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, frequency)),
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, frequency));
                None
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<u64> {
        self.index.get(term).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries
            .iter()
            .map(|(term, frequency)| (term.as_str(), *frequency))
    }

    /// Same terms with the same frequencies, regardless of order.
    pub fn same_entries(&self, other: &FrequencyDictionary) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(term, frequency)| other.get(term) == Some(frequency))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyDictionary {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut dict = FrequencyDictionary::new();
        for (term, frequency) in iter {
            dict.insert(term, frequency);
        }
        dict
    }
}

/// Accumulates character counts for building a [`HuffmanCodec`].
#[derive(Debug, Clone, Default)]
pub struct FrequencyBuilder {
    frequencies: FrequencyTable,
}

impl FrequencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every character of every term in `dict`.
    pub fn from_dictionary(dict: &FrequencyDictionary) -> Self {
        let mut builder = Self::new();
        dict.iter().for_each(|(term, _)| {
            builder.add_str(term);
        });
        builder
    }

    /// Count each character of `text` once.
    pub fn add_str(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            let count = self.frequencies.entry(c).or_insert(0);
            *count = count.saturating_add(1);
        }
        self
    }

    /// Set the count of `symbol` explicitly.
    pub fn insert(&mut self, symbol: char, frequency: u64) -> &mut Self {
        self.frequencies.insert(symbol, frequency);
        self
    }

    /// Number of distinct characters seen.
    pub fn num_characters(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn build(&self, config: CodecConfig) -> Result<HuffmanCodec> {
        HuffmanCodec::from_frequencies(&self.frequencies, config)
    }
}
