//! # Huffman-compressed frequency dictionaries
//! This crate stores term -> frequency dictionaries (word lists) in a compact binary container.
//! Terms are compressed with a per-character Huffman code whose table is stored in the file,
//! and frequencies are written as LEB128 varints.
//!
//! Records carry no length fields: every encoded term ends with a reserved terminator symbol,
//! and the reader decodes each term up to that symbol.
//!
//! ```
//! use fdic::{pack, unpack, CodecConfig, FrequencyDictionary};
//!
//! let dict: FrequencyDictionary = [("the", 23135851162u64), ("of", 13151942776)]
//!     .into_iter()
//!     .collect();
//! let bytes = pack(&dict, CodecConfig::default())?;
//! let read = unpack(&bytes, CodecConfig::default())?;
//! assert!(read.same_entries(&dict));
//! # Ok::<(), fdic::FdicError>(())
//! ```
pub mod bit_stream;

pub mod varint;

pub mod huffman;

pub mod codec;

pub mod container;

pub mod dictionary;

pub mod word_list;

pub mod strategies;

pub mod config;

pub mod error;

pub use codec::HuffmanCodec;
pub use config::CodecConfig;
pub use container::{pack, read_container, unpack, write_container};
pub use dictionary::{FrequencyBuilder, FrequencyDictionary};
pub use error::{FdicError, Result};
pub use huffman::HuffmanTree;
