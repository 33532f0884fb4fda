//! Error type shared by every stage of the dictionary codec.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FdicError {
    #[error("symbol {symbol:?} has no Huffman code")]
    UnknownSymbol { symbol: char },

    #[error("terminator found at position {position}, before the end of the term")]
    EmbeddedTerminator { position: usize },

    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("truncated input: {0}")]
    Truncated(String),

    #[error("decoded term exceeds the capacity of {capacity} symbols")]
    CapacityExceeded { capacity: usize },

    #[error("corrupt code table: {0}")]
    CorruptTable(String),

    #[error("frequency table has no data symbols")]
    EmptyAlphabet,

    #[error("varint does not fit in 64 bits")]
    VarintOverflow,

    #[error("invalid term: {0}")]
    InvalidTerm(String),

    #[error("word list line {line}: {reason}")]
    WordList { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FdicError>;
