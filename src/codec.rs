//! Encode and decode terms with a per-character Huffman code.
//!
//! Every encoded term ends with the terminator symbol, so terms can be stored
//! back to back without length prefixes: the decoder stops as soon as it
//! produces the terminator. Encoded terms are padded to a whole byte.

use crate::bit_stream::{BitBuffer, BitSource, SliceBits, StreamBits};
use crate::config::CodecConfig;
use crate::error::{FdicError, Result};
use crate::huffman::{CodeTable, FrequencyTable, HuffmanNode, HuffmanTree};
use std::io::Read;
use tracing::debug;

/// Separates entries of an exported code table.
const ENTRY_SEPARATOR: char = ';';
/// Separates a symbol from its path inside an entry.
const PATH_SEPARATOR: char = ':';

/// A Huffman code over characters: the tree for decoding and the table for encoding.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    tree: HuffmanTree,
    table: CodeTable,
    config: CodecConfig,
}

impl HuffmanCodec {
    /// Build a codec from character frequencies. See [`HuffmanTree::from_frequencies`].
    pub fn from_frequencies(frequencies: &FrequencyTable, config: CodecConfig) -> Result<Self> {
        let tree = HuffmanTree::from_frequencies(frequencies, config.terminator)?;
        let table = tree.code_table();
        Ok(Self {
            tree,
            table,
            config,
        })
    }

    /// Build a codec from a code table alone. See [`HuffmanTree::from_code_table`].
    pub fn from_code_table(table: CodeTable, config: CodecConfig) -> Result<Self> {
        let tree = HuffmanTree::from_code_table(&table, config.terminator)?;
        Ok(Self {
            tree,
            table,
            config,
        })
    }

    /// Rebuild a codec from the output of [`HuffmanCodec::export_table`].
    pub fn import_table(bytes: &[u8], config: CodecConfig) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| FdicError::CorruptTable(format!("invalid UTF-8: {}", e)))?;
        let table = parse_table(text)?;
        debug!(symbols = table.len(), bytes = bytes.len(), "imported code table");
        Self::from_code_table(table, config)
    }

    /// Serialize the code table as UTF-8 `<char>:<bits>` entries joined by `;`,
    /// in ascending symbol order.
    pub fn export_table(&self) -> Vec<u8> {
        let mut text = String::new();
        for (i, (symbol, path)) in self.table.iter().enumerate() {
            if i > 0 {
                text.push(ENTRY_SEPARATOR);
            }
            text.push(*symbol);
            text.push(PATH_SEPARATOR);
            text.push_str(&path.to_string());
        }
        text.into_bytes()
    }

    /// Symbol -> path table used for encoding.
    pub fn code_table(&self) -> &CodeTable {
        &self.table
    }

    /// The decode tree, built from or matching [`HuffmanCodec::code_table`].
    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    /// The configuration the codec was built with. The container writer and
    /// reader take the decode capacity from here.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Shorthand for `config().terminator`.
    pub fn terminator(&self) -> char {
        self.config.terminator
    }

    /// Encode `text` followed by one terminator into packed bits.
    ///
    /// A terminator already at the end of `text` is not doubled. A terminator
    /// anywhere else is rejected, since decoding would stop there.
    pub fn encode_bits(&self, text: &str) -> Result<BitBuffer> {
        let terminator = self.terminator();
        let body = text.strip_suffix(terminator).unwrap_or(text);
        let body_len = body.chars().count();
        let mut bits = BitBuffer::new();
        for (position, symbol) in body.chars().chain(std::iter::once(terminator)).enumerate() {
            if symbol == terminator && position < body_len {
                return Err(FdicError::EmbeddedTerminator { position });
            }
            let code = self
                .table
                .get(&symbol)
                .ok_or(FdicError::UnknownSymbol { symbol })?;
            bits.extend_from(code);
        }
        Ok(bits)
    }

    /// Encode `text` into bytes. See [`HuffmanCodec::encode_bits`].
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.encode_bits(text)?.into_bytes())
    }

    /// Decode one term from a complete buffer. Bits after the terminator are ignored.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.decode_from(&mut SliceBits::new(bytes), None)
    }

    /// Decode one term from a stream, reading no byte past the one holding
    /// the terminator's last bit. Fails once more than `capacity` symbols
    /// would be produced.
    pub fn decode_stream<R: Read>(&self, reader: &mut R, capacity: usize) -> Result<String> {
        self.decode_from(&mut StreamBits::new(reader), Some(capacity))
    }

    /// Walk the tree bit by bit, emitting a symbol and restarting at the root
    /// on every leaf, until the terminator is reached. The terminator is not
    /// part of the result.
    pub fn decode_from<S: BitSource>(&self, bits: &mut S, capacity: Option<usize>) -> Result<String> {
        let root = self.tree.root();
        let mut output = String::new();
        let mut decoded = 0usize;
        let mut bits_read = 0usize;
        let mut node = root;
        loop {
            let bit = bits.next_bit()?.ok_or_else(|| missing_terminator(decoded))?;
            bits_read += 1;
            node = self
                .tree
                .child(node, bit)
                .ok_or_else(|| missing_child(bits_read))?;

            if let Some(HuffmanNode::Leaf(symbol)) = self.tree.node(node) {
                if symbol == self.terminator() {
                    return Ok(output);
                }
                if let Some(capacity) = capacity {
                    if decoded >= capacity {
                        return Err(FdicError::CapacityExceeded { capacity });
                    }
                }
                output.push(symbol);
                decoded += 1;
                node = root;
            }
        }
    }
}

/// Input ended before the terminator was decoded.
fn missing_terminator(decoded: usize) -> FdicError {
    FdicError::Truncated(format!(
        "input ended after {} symbol(s) without a terminator",
        decoded
    ))
}

/// A bit led to a child the tree does not have.
fn missing_child(bits_read: usize) -> FdicError {
    FdicError::MalformedEncoding(format!("no tree node for bit {} of the term", bits_read))
}

/// Parse an exported code table.
///
/// Entries are read positionally (one symbol, `:`, a run of `0`/`1`, then
/// `;` or the end) so `:` and `;` may themselves be symbols.
fn parse_table(text: &str) -> Result<CodeTable> {
    let mut table = CodeTable::new();
    let mut chars = text.chars().peekable();
    let mut entry = 0usize;
    loop {
        let symbol = chars
            .next()
            .ok_or_else(|| FdicError::CorruptTable(format!("entry {} has no symbol", entry)))?;
        match chars.next() {
            Some(PATH_SEPARATOR) => {}
            other => {
                return Err(FdicError::CorruptTable(format!(
                    "entry {} ({:?}): expected {:?}, found {:?}",
                    entry, symbol, PATH_SEPARATOR, other
                )))
            }
        }

        let mut path = BitBuffer::new();
        while let Some(&c) = chars.peek() {
            match c {
                '0' => path.push(false),
                '1' => path.push(true),
                _ => break,
            }
            chars.next();
        }
        if table.insert(symbol, path).is_some() {
            return Err(FdicError::CorruptTable(format!(
                "symbol {:?} appears more than once",
                symbol
            )));
        }

        match chars.next() {
            None => return Ok(table),
            Some(ENTRY_SEPARATOR) => entry += 1,
            Some(other) => {
                return Err(FdicError::CorruptTable(format!(
                    "entry {} ({:?}): unexpected {:?} after the path",
                    entry, symbol, other
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn codec(pairs: &[(char, u64)]) -> HuffmanCodec {
        let frequencies: FrequencyTable = pairs.iter().copied().collect();
        HuffmanCodec::from_frequencies(&frequencies, CodecConfig::default()).unwrap()
    }

    fn abcdef() -> HuffmanCodec {
        codec(&[('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)])
    }

    #[test]
    fn test_encode_decode_consistency() {
        let codec = abcdef();
        for input in ["abcdef", "abcdeffedcba", "f", "aaaaaa", ""] {
            let encoded = codec.encode(input).unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn test_encode_empty_string() {
        let codec = codec(&[('a', 1), ('b', 1)]);
        let encoded = codec.encode("").unwrap();
        // Only the terminator, padded to a byte.
        assert_eq!(encoded.len(), 1);
        assert_eq!(codec.decode(&encoded).unwrap(), "");
    }

    #[test]
    fn test_single_character_repeated() {
        let codec = codec(&[('a', 10), ('b', 5)]);
        let encoded = codec.encode("aaaaaa").unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), "aaaaaa");
    }

    #[test]
    fn test_terminator_not_doubled() {
        let codec = abcdef();
        let plain = codec.encode_bits("abc").unwrap();
        let terminated = codec.encode_bits("abc\n").unwrap();
        assert_eq!(plain, terminated);
        assert_eq!(codec.decode(&terminated.into_bytes()).unwrap(), "abc");
    }

    #[test]
    fn test_embedded_terminator_rejected() {
        let codec = abcdef();
        assert!(matches!(
            codec.encode("ab\ncd"),
            Err(FdicError::EmbeddedTerminator { position: 2 })
        ));
    }

    #[test]
    fn test_unknown_symbol() {
        let codec = abcdef();
        assert!(matches!(
            codec.encode("abz"),
            Err(FdicError::UnknownSymbol { symbol: 'z' })
        ));
    }

    #[test]
    fn test_encoded_string_is_smaller() {
        let codec = codec(&[('a', 45), ('b', 13), ('c', 12), ('d', 16), ('e', 9), ('f', 5)]);
        let input = "aaaabbbcccddeeeffff";
        let encoded = codec.encode(input).unwrap();
        assert!(encoded.len() < input.len());
    }

    #[test]
    fn test_decode_truncated() {
        let codec = abcdef();
        let encoded = codec.encode("fffff").unwrap();
        // 'f' has a 2-bit code, so the first byte holds four 'f's and no terminator.
        assert!(matches!(
            codec.decode(&encoded[..1]),
            Err(FdicError::Truncated(_))
        ));
        assert!(matches!(codec.decode(&[]), Err(FdicError::Truncated(_))));
    }

    #[test]
    fn test_decode_missing_child() {
        let table: CodeTable = [('a', "00"), ('\n', "1")]
            .into_iter()
            .map(|(symbol, path)| (symbol, BitBuffer::from_path(path).unwrap()))
            .collect();
        let codec = HuffmanCodec::from_code_table(table, CodecConfig::default()).unwrap();
        assert_eq!(codec.decode(&[0b0010_0000]).unwrap(), "a");
        assert!(matches!(
            codec.decode(&[0b0100_0000]),
            Err(FdicError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_stream() {
        let codec = codec(&[
            ('a', 5),
            ('b', 9),
            ('c', 12),
            ('d', 13),
            ('e', 16),
            ('f', 45),
            ('\n', 1),
        ]);
        let mut bytes = codec.encode("abcdeffedcba").unwrap();
        bytes.extend(codec.encode("cafe").unwrap());
        let mut cursor = Cursor::new(bytes);
        assert_eq!(codec.decode_stream(&mut cursor, 64).unwrap(), "abcdeffedcba");
        assert_eq!(codec.decode_stream(&mut cursor, 64).unwrap(), "cafe");
        assert!(matches!(
            codec.decode_stream(&mut cursor, 64),
            Err(FdicError::Truncated(_))
        ));
    }

    #[test]
    fn test_decode_stream_capacity() {
        let codec = abcdef();
        let encoded = codec.encode("abcdef").unwrap();
        assert_eq!(
            codec.decode_stream(&mut Cursor::new(&encoded), 6).unwrap(),
            "abcdef"
        );
        assert!(matches!(
            codec.decode_stream(&mut Cursor::new(&encoded), 5),
            Err(FdicError::CapacityExceeded { capacity: 5 })
        ));
    }

    #[test]
    fn test_export_format() {
        let codec = codec(&[('a', 1)]);
        assert_eq!(codec.export_table(), b"\n:0;a:1".to_vec());
    }

    #[test]
    fn test_export_matches_code_table() {
        let codec = codec(&[('a', 10), ('b', 15), ('\n', 1)]);
        let expected = codec
            .code_table()
            .iter()
            .map(|(symbol, path)| format!("{}:{}", symbol, path))
            .collect::<Vec<_>>()
            .join(";");
        assert_eq!(codec.export_table(), expected.into_bytes());
    }

    #[test]
    fn test_export_import_table() {
        let codec = codec(&[('x', 1), ('y', 3), ('z', 5), ('\n', 1)]);
        let imported =
            HuffmanCodec::import_table(&codec.export_table(), CodecConfig::default()).unwrap();
        assert_eq!(imported.code_table(), codec.code_table());

        let encoded = codec.encode("xyzzy").unwrap();
        assert_eq!(imported.decode(&encoded).unwrap(), "xyzzy");
    }

    #[test]
    fn test_separator_symbols_round_trip() {
        let codec = codec(&[(':', 4), (';', 3), ('0', 2), ('1', 2), ('a', 1)]);
        let imported =
            HuffmanCodec::import_table(&codec.export_table(), CodecConfig::default()).unwrap();
        assert_eq!(imported.code_table(), codec.code_table());

        let encoded = codec.encode("a:1;0").unwrap();
        assert_eq!(imported.decode(&encoded).unwrap(), "a:1;0");
    }

    #[test]
    fn test_import_corrupt_tables() {
        let config = CodecConfig::default();
        let tables: [&[u8]; 9] = [
            b"",
            b"a",
            b"a0;\n:1",
            b"a:0;a:1;\n:11",
            b"a:0;\n:1;",
            b"a:0x;\n:1",
            b"a:0;b:0;\n:1",
            b"a:0;b:1",
            &[0xFF, b':', b'0'],
        ];
        for table in tables {
            assert!(
                matches!(
                    HuffmanCodec::import_table(table, config),
                    Err(FdicError::CorruptTable(_))
                ),
                "table {:?}",
                table
            );
        }
    }

    #[test]
    fn test_alternate_terminator() {
        let frequencies: FrequencyTable = [('a', 3), ('b', 2), ('\n', 1)].into_iter().collect();
        let config = CodecConfig::default().with_terminator('$');
        let codec = HuffmanCodec::from_frequencies(&frequencies, config).unwrap();
        assert!(codec.code_table().contains_key(&'$'));

        // The default terminator is an ordinary symbol here.
        let encoded = codec.encode("a\nb").unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), "a\nb");
        assert!(matches!(
            codec.encode("a$b"),
            Err(FdicError::EmbeddedTerminator { position: 1 })
        ));
    }
}
