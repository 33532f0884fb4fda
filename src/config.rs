//! Codec configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Symbol that ends every encoded term unless configured otherwise.
pub const DEFAULT_TERMINATOR: char = '\n';

/// Maximum number of symbols a streaming decode will produce for one term.
pub const DEFAULT_DECODE_CAPACITY: usize = 64;

/// Settings shared by tree construction, the codec and the container reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Reserved symbol marking the end of an encoded term.
    /// It must never appear inside a term.
    pub terminator: char,
    /// Upper bound on decoded symbols per term when reading from a stream.
    pub decode_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            terminator: DEFAULT_TERMINATOR,
            decode_capacity: DEFAULT_DECODE_CAPACITY,
        }
    }
}

impl CodecConfig {
    pub fn with_terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn with_decode_capacity(mut self, decode_capacity: usize) -> Self {
        self.decode_capacity = decode_capacity;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
