//! Ways of storing a frequency dictionary, compared by size and load time.
//!
//! The Huffman container is measured against the plain word list and two
//! deflate-based baselines. Deflate itself comes from `miniz_oxide`.

use crate::config::CodecConfig;
use crate::container::{pack, unpack};
use crate::dictionary::FrequencyDictionary;
use crate::error::{FdicError, Result};
use crate::varint::{decode_varint, write_varint};
use crate::word_list::{format_word_list, parse_word_list};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Compression level used for the deflate baselines.
const DEFLATE_LEVEL: u8 = 6;

/// Ends a term in the deflated-records layout.
const NUL: u8 = 0;

/// A way of turning a dictionary into bytes and back.
pub trait Strategy {
    /// Short name used in reports.
    fn name(&self) -> &'static str;
    fn store(&self, dict: &FrequencyDictionary) -> Result<Vec<u8>>;
    fn load(&self, data: &[u8]) -> Result<FrequencyDictionary>;
}

/// The word list as text.
pub struct PlainText;

impl Strategy for PlainText {
    fn name(&self) -> &'static str {
        "txt"
    }

    fn store(&self, dict: &FrequencyDictionary) -> Result<Vec<u8>> {
        Ok(format_word_list(dict).into_bytes())
    }

    fn load(&self, data: &[u8]) -> Result<FrequencyDictionary> {
        let text = std::str::from_utf8(data)
            .map_err(|e| FdicError::InvalidTerm(format!("word list is not UTF-8: {}", e)))?;
        parse_word_list(text)
    }
}

/// The word list text, deflated with a zlib wrapper.
pub struct DeflatedText;

impl Strategy for DeflatedText {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn store(&self, dict: &FrequencyDictionary) -> Result<Vec<u8>> {
        Ok(deflate(&PlainText.store(dict)?))
    }

    fn load(&self, data: &[u8]) -> Result<FrequencyDictionary> {
        PlainText.load(&inflate(data)?)
    }
}

/// The Huffman dictionary container.
pub struct HuffmanContainer {
    pub config: CodecConfig,
}

impl Strategy for HuffmanContainer {
    fn name(&self) -> &'static str {
        "fdic"
    }

    fn store(&self, dict: &FrequencyDictionary) -> Result<Vec<u8>> {
        pack(dict, self.config)
    }

    fn load(&self, data: &[u8]) -> Result<FrequencyDictionary> {
        unpack(data, self.config)
    }
}

/// `[varint frequency][UTF-8 term][0x00]` records, deflated as a whole.
pub struct DeflatedRecords;

impl Strategy for DeflatedRecords {
    fn name(&self) -> &'static str {
        "fdic2"
    }

    fn store(&self, dict: &FrequencyDictionary) -> Result<Vec<u8>> {
        let mut raw = Vec::new();
        for (term, frequency) in dict.iter() {
            if term.as_bytes().contains(&NUL) {
                return Err(FdicError::InvalidTerm(format!(
                    "{:?} contains a NUL byte",
                    term
                )));
            }
            write_varint(&mut raw, frequency)?;
            raw.extend_from_slice(term.as_bytes());
            raw.push(NUL);
        }
        Ok(deflate(&raw))
    }

    fn load(&self, data: &[u8]) -> Result<FrequencyDictionary> {
        let raw = inflate(data)?;
        let mut dict = FrequencyDictionary::new();
        let mut pos = 0;
        while pos < raw.len() {
            let frequency = decode_varint(&raw, &mut pos)?;
            let len = raw[pos..]
                .iter()
                .position(|&b| b == NUL)
                .ok_or_else(|| FdicError::Truncated(format!("term at offset {} has no NUL", pos)))?;
            let term = std::str::from_utf8(&raw[pos..pos + len])
                .map_err(|e| FdicError::InvalidTerm(e.to_string()))?;
            dict.insert(term, frequency);
            pos += len + 1;
        }
        Ok(dict)
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, DEFLATE_LEVEL)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib(data).map_err(|e| {
        FdicError::MalformedEncoding(format!("deflate stream: {:?}", e.status))
    })
}

/// Every strategy, the plain text first since the others are measured against it.
pub fn all_strategies(config: CodecConfig) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(PlainText),
        Box::new(DeflatedText),
        Box::new(HuffmanContainer { config }),
        Box::new(DeflatedRecords),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyReport {
    pub name: &'static str,
    pub size_bytes: usize,
    pub store_nanos: u64,
    pub load_nanos: u64,
    /// The loaded dictionary has exactly the stored terms and frequencies.
    pub valid: bool,
}

impl StrategyReport {
    /// Size relative to `baseline`, 1.0 meaning equal.
    pub fn size_ratio(&self, baseline: &StrategyReport) -> f64 {
        self.size_bytes as f64 / baseline.size_bytes.max(1) as f64
    }

    /// Load time relative to `baseline`, 1.0 meaning equal.
    pub fn load_ratio(&self, baseline: &StrategyReport) -> f64 {
        self.load_nanos as f64 / baseline.load_nanos.max(1) as f64
    }
}

/// Store `dict` with each strategy, then time loading it back and check it.
///
/// A strategy that fails to store or load `dict` is reported as invalid
/// with zero size; the other strategies are still measured.
pub fn compare(
    dict: &FrequencyDictionary,
    strategies: &[Box<dyn Strategy>],
) -> Vec<StrategyReport> {
    strategies
        .iter()
        .map(|strategy| {
            let report = measure(strategy.as_ref(), dict).unwrap_or_else(|e| {
                warn!(strategy = strategy.name(), error = %e, "strategy failed");
                StrategyReport {
                    name: strategy.name(),
                    size_bytes: 0,
                    store_nanos: 0,
                    load_nanos: 0,
                    valid: false,
                }
            });
            debug!(
                strategy = report.name,
                size_bytes = report.size_bytes,
                load_nanos = report.load_nanos,
                valid = report.valid,
                "compared strategy"
            );
            report
        })
        .collect()
}

fn measure(strategy: &dyn Strategy, dict: &FrequencyDictionary) -> Result<StrategyReport> {
    let started = Instant::now();
    let data = strategy.store(dict)?;
    let store_nanos = started.elapsed().as_nanos() as u64;

    let started = Instant::now();
    let loaded = strategy.load(&data)?;
    let load_nanos = started.elapsed().as_nanos() as u64;

    Ok(StrategyReport {
        name: strategy.name(),
        size_bytes: data.len(),
        store_nanos,
        load_nanos,
        valid: loaded.same_entries(dict),
    })
}
