//! Bit-level storage and bit sources.
//!
//! [`BitBuffer`] is the append-only, MSB-first bit sequence that Huffman codes
//! and encoded terms are built in. [`BitSource`] is the single "next bit"
//! capability the decoder walks the tree with; it is implemented for byte
//! slices ([`SliceBits`]) and for live byte streams ([`StreamBits`]).
use crate::error::Result;
use std::fmt;
use std::io::{self, Read};

/// The number of bits in a byte.
const BITS_PER_BYTE: usize = 8;

/// Mask selecting bit `index` of a byte, counting from the most significant bit.
fn msb_mask(index: usize) -> u8 {
    0x80 >> index
}

/// An append-only sequence of bits packed MSB-first into bytes.
///
/// Bits past `len` in the last byte are padding and always zero, so comparing
/// the backing bytes together with `len` compares the logical bit sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of valid bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit, growing the storage by a byte on every byte boundary.
    pub fn push(&mut self, bit: bool) {
        let byte_index = self.len / BITS_PER_BYTE;
        if byte_index >= self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_index] |= msb_mask(self.len % BITS_PER_BYTE);
        }
        self.len += 1;
    }

    /// Append every bit of `other`, in order.
    pub fn extend_from(&mut self, other: &BitBuffer) {
        other.iter().for_each(|bit| self.push(bit));
    }

    /// Get bit `index`, or `None` when `index >= len`.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let byte = self.bytes[index / BITS_PER_BYTE];
        Some(byte & msb_mask(index % BITS_PER_BYTE) != 0)
    }

    /// Iterate over the valid bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// The packed bytes: exactly `ceil(len / 8)` of them, zero padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A copy of the packed bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Consume the buffer, returning the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Parse a path written as a string of `'0'` and `'1'` characters.
    pub fn from_path(path: &str) -> Option<Self> {
        path.chars()
            .map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buffer = BitBuffer::new();
        iter.into_iter().for_each(|bit| buffer.push(bit));
        buffer
    }
}

impl fmt::Display for BitBuffer {
    /// Renders the bits as `'0'`/`'1'` characters, the form used by code tables.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter()
            .try_for_each(|bit| f.write_str(if bit { "1" } else { "0" }))
    }
}

/// Something the Huffman decoder can pull bits from, one at a time.
pub trait BitSource {
    /// The next bit, or `None` once the source is exhausted.
    fn next_bit(&mut self) -> Result<Option<bool>>;
}

/// A struct representing the position of a bit in a byte array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct BitPosition {
    byte_index: usize,
    bit_index: usize,
}

impl BitPosition {
    /// Move to the next bit, carrying into the next byte.
    fn advance(&mut self) {
        self.bit_index += 1;
        if self.bit_index == BITS_PER_BYTE {
            self.bit_index = 0;
            self.byte_index += 1;
        }
    }
}

/// Reads bits MSB-first from a byte slice.
#[derive(Debug)]
pub struct SliceBits<'a> {
    data: &'a [u8],
    position: BitPosition,
}

impl<'a> SliceBits<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: BitPosition::default(),
        }
    }

    /// Check if the reader has consumed every bit of the data.
    pub fn eof(&self) -> bool {
        self.position.byte_index >= self.data.len()
    }

    /// Number of bits consumed so far.
    pub fn bits_read(&self) -> usize {
        self.position.byte_index * BITS_PER_BYTE + self.position.bit_index
    }
}

impl BitSource for SliceBits<'_> {
    fn next_bit(&mut self) -> Result<Option<bool>> {
        let Some(&byte) = self.data.get(self.position.byte_index) else {
            return Ok(None);
        };
        let bit = byte & msb_mask(self.position.bit_index) != 0;
        self.position.advance();
        Ok(Some(bit))
    }
}

/// Reads bits MSB-first from a byte stream.
///
/// A byte is pulled from the reader only when the previous one is used up,
/// so a decoder that stops mid-byte leaves the reader positioned right after
/// the byte it stopped in.
#[derive(Debug)]
pub struct StreamBits<'r, R: Read> {
    reader: &'r mut R,
    current: u8,
    remaining: usize,
}

impl<'r, R: Read> StreamBits<'r, R> {
    /// Create a reader that pulls bytes from `reader` as bits are needed.
    pub fn new(reader: &'r mut R) -> Self {
        Self {
            reader,
            current: 0,
            remaining: 0,
        }
    }
}

impl<R: Read> BitSource for StreamBits<'_, R> {
    fn next_bit(&mut self) -> Result<Option<bool>> {
        if self.remaining == 0 {
            match read_byte(&mut *self.reader)? {
                Some(byte) => {
                    self.current = byte;
                    self.remaining = BITS_PER_BYTE;
                }
                None => return Ok(None),
            }
        }
        let bit = self.current & msb_mask(BITS_PER_BYTE - self.remaining) != 0;
        self.remaining -= 1;
        Ok(Some(bit))
    }
}

/// Read a single byte, returning `None` at end of input.
pub(crate) fn read_byte<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
