//! LEB128-style unsigned varints.
//!
//! A value is written as 7-bit groups, least significant group first. The top
//! bit of every byte is a continuation flag: set when more bytes follow.
use crate::bit_stream::read_byte;
use crate::error::{FdicError, Result};
use std::io::{Read, Write};

const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// Longest encoding of a `u64`: ceil(64 / 7) bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` into `buf`. Returns the number of bytes appended.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) -> usize {
    let start = buf.len();
    loop {
        let mut byte = (value as u8) & PAYLOAD_MASK;
        value >>= 7;
        if value != 0 {
            byte |= CONTINUATION;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
    buf.len() - start
}

/// Write `value` as a varint. Returns the number of bytes written.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<usize> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    let len = encode_varint(value, &mut buf);
    writer.write_all(&buf)?;
    Ok(len)
}

/// Fold one more byte into a partially decoded value.
/// Returns `true` when `byte` was the last one.
fn accumulate(value: &mut u64, shift: &mut u32, byte: u8) -> Result<bool> {
    let payload = (byte & PAYLOAD_MASK) as u64;
    // The tenth byte may only carry the single remaining bit.
    if *shift >= 64 || (*shift == 63 && payload > 1) {
        return Err(FdicError::VarintOverflow);
    }
    *value |= payload << *shift;
    *shift += 7;
    Ok(byte & CONTINUATION == 0)
}

/// Read one varint, consuming exactly its bytes.
///
/// A source that ends before a byte without the continuation flag is a
/// truncation, never a partial value.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> Result<u64> {
    let mut value = 0;
    let mut shift = 0;
    let mut consumed = 0usize;
    loop {
        let byte = read_byte(reader)?.ok_or_else(|| {
            FdicError::Truncated(format!(
                "varint ended after {} byte(s) without a terminating byte",
                consumed
            ))
        })?;
        consumed += 1;
        if accumulate(&mut value, &mut shift, byte)? {
            return Ok(value);
        }
    }
}

/// Decode one varint from `buf` starting at `*pos`, advancing `*pos` past it.
pub fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value = 0;
    let mut shift = 0;
    let start = *pos;
    loop {
        let byte = *buf.get(*pos).ok_or_else(|| {
            FdicError::Truncated(format!(
                "varint at offset {} ended after {} byte(s) without a terminating byte",
                start,
                *pos - start
            ))
        })?;
        *pos += 1;
        if accumulate(&mut value, &mut shift, byte)? {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLES: [u64; 10] = [
        0,
        1,
        127,
        128,
        300,
        16384,
        2097151,
        123456789,
        i64::MAX as u64,
        u64::MAX,
    ];

    #[test]
    fn test_round_trip_samples() {
        for value in SAMPLES {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            assert!(buf.len() <= MAX_VARINT_LEN);

            let mut pos = 0;
            assert_eq!(decode_varint(&buf, &mut pos).unwrap(), value, "value {}", value);
            assert_eq!(pos, buf.len());

            let mut cursor = Cursor::new(&buf);
            assert_eq!(read_varint(&mut cursor).unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_zero_is_one_byte() {
        let mut buf = Vec::new();
        assert_eq!(encode_varint(0, &mut buf), 1);
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn test_encoded_lengths() {
        let mut buf = Vec::new();
        assert_eq!(encode_varint(127, &mut buf), 1);
        buf.clear();
        assert_eq!(encode_varint(128, &mut buf), 2);
        assert_eq!(buf, vec![0x80, 0x01]);
        buf.clear();
        assert_eq!(encode_varint(300, &mut buf), 2);
        assert_eq!(buf, vec![0xAC, 0x02]);
        buf.clear();
        assert_eq!(encode_varint(u64::MAX, &mut buf), MAX_VARINT_LEN);
    }

    #[test]
    fn test_lone_continuation_byte_is_truncated() {
        let mut cursor = Cursor::new(vec![0x80]);
        assert!(matches!(
            read_varint(&mut cursor),
            Err(FdicError::Truncated(_))
        ));

        let mut pos = 0;
        assert!(matches!(
            decode_varint(&[0x80], &mut pos),
            Err(FdicError::Truncated(_))
        ));
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(matches!(
            read_varint(&mut cursor),
            Err(FdicError::Truncated(_))
        ));
    }

    #[test]
    fn test_overflow_rejected() {
        let mut buf = vec![0xFF; 9];
        buf.push(0x02);
        let mut pos = 0;
        assert!(matches!(
            decode_varint(&buf, &mut pos),
            Err(FdicError::VarintOverflow)
        ));

        let too_long = vec![0x80; 11];
        let mut cursor = Cursor::new(too_long);
        assert!(matches!(
            read_varint(&mut cursor),
            Err(FdicError::VarintOverflow)
        ));
    }

    #[test]
    fn test_multiple_in_stream() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 100).unwrap();
        write_varint(&mut buf, 76520).unwrap();
        write_varint(&mut buf, 0).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_varint(&mut cursor).unwrap(), 100);
        assert_eq!(read_varint(&mut cursor).unwrap(), 76520);
        assert_eq!(read_varint(&mut cursor).unwrap(), 0);
        assert!(read_varint(&mut cursor).is_err());
    }
}
