//! The dictionary container format.
//!
//! ```text
//! tableLength: varint
//! table:       tableLength bytes, "<char>:<bits>;<char>:<bits>;..."
//! records, repeated until end of input:
//!   frequency: varint
//!   term:      Huffman-encoded bytes, ending with the terminator symbol
//! ```
//!
//! There is no record count and no term length. The reader finds the end of a
//! term by decoding up to the terminator, and the end of the records by
//! running out of input.

use crate::codec::HuffmanCodec;
use crate::config::CodecConfig;
use crate::dictionary::{FrequencyBuilder, FrequencyDictionary};
use crate::error::{FdicError, Result};
use crate::varint::{read_varint, write_varint};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Write `dict` with `codec`. Returns the number of bytes written.
///
/// Terms longer than the codec's `decode_capacity` are rejected with
/// [`FdicError::CapacityExceeded`], since a reader with the same config could
/// not read them back.
pub fn write_container<W: Write>(
    writer: &mut W,
    codec: &HuffmanCodec,
    dict: &FrequencyDictionary,
) -> Result<usize> {
    let capacity = codec.config().decode_capacity;
    let terminator = codec.terminator();
    if let Some((term, _)) = dict.iter().find(|&(term, _)| {
        let body = term.strip_suffix(terminator).unwrap_or(term);
        body.chars().count() > capacity
    }) {
        debug!(term, capacity, "term exceeds decode capacity");
        return Err(FdicError::CapacityExceeded { capacity });
    }

    let table = codec.export_table();
    let mut written = write_varint(writer, table.len() as u64)?;
    writer.write_all(&table)?;
    written += table.len();

    for (term, frequency) in dict.iter() {
        written += write_varint(writer, frequency)?;
        let encoded = codec.encode(term)?;
        writer.write_all(&encoded)?;
        written += encoded.len();
    }

    debug!(
        entries = dict.len(),
        table_bytes = table.len(),
        bytes = written,
        "wrote dictionary container"
    );
    Ok(written)
}

/// Read a container, rebuilding its codec from the stored table.
///
/// Records are read while the source has bytes left. A source that ends
/// inside a record is an error; no partial record is returned.
pub fn read_container<R: BufRead>(
    reader: &mut R,
    config: CodecConfig,
) -> Result<(HuffmanCodec, FrequencyDictionary)> {
    let table_len = read_varint(reader)?;
    let mut table = Vec::new();
    reader.by_ref().take(table_len).read_to_end(&mut table)?;
    if table.len() as u64 != table_len {
        return Err(FdicError::Truncated(format!(
            "code table: expected {} bytes, found {}",
            table_len,
            table.len()
        )));
    }
    let codec = HuffmanCodec::import_table(&table, config)?;

    let mut dict = FrequencyDictionary::new();
    let mut record = 0usize;
    while has_remaining(reader)? {
        let frequency = read_varint(reader).map_err(|e| in_record(e, record))?;
        let term = codec
            .decode_stream(reader, config.decode_capacity)
            .map_err(|e| in_record(e, record))?;
        dict.insert(term, frequency);
        record += 1;
    }

    debug!(
        records = record,
        entries = dict.len(),
        table_bytes = table.len(),
        "read dictionary container"
    );
    Ok((codec, dict))
}

/// Build a codec from the characters of `dict` and write both into a buffer.
pub fn pack(dict: &FrequencyDictionary, config: CodecConfig) -> Result<Vec<u8>> {
    let codec = FrequencyBuilder::from_dictionary(dict).build(config)?;
    let mut bytes = Vec::new();
    write_container(&mut bytes, &codec, dict)?;
    Ok(bytes)
}

/// Read the dictionary stored in `bytes`.
pub fn unpack(bytes: &[u8], config: CodecConfig) -> Result<FrequencyDictionary> {
    let mut reader = bytes;
    let (_, dict) = read_container(&mut reader, config)?;
    Ok(dict)
}

/// Write a container to the file at `path`, creating or truncating it.
///
/// # Arguments
///
/// * `path` - destination file
/// * `codec` - codec whose table is stored and whose config bounds term length
/// * `dict` - entries to write, in iteration order
pub fn write_container_file<P: AsRef<Path>>(
    path: P,
    codec: &HuffmanCodec,
    dict: &FrequencyDictionary,
) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_container(&mut writer, codec, dict)?;
    writer.flush()?;
    Ok(written)
}

/// Read a container from the file at `path`. See [`read_container`].
pub fn read_container_file<P: AsRef<Path>>(
    path: P,
    config: CodecConfig,
) -> Result<(HuffmanCodec, FrequencyDictionary)> {
    let mut reader = BufReader::new(File::open(path)?);
    read_container(&mut reader, config)
}

fn has_remaining<R: BufRead>(reader: &mut R) -> Result<bool> {
    Ok(!reader.fill_buf()?.is_empty())
}

/// Tag a truncation with the record it happened in.
fn in_record(error: FdicError, record: usize) -> FdicError {
    match error {
        FdicError::Truncated(reason) => FdicError::Truncated(format!("record {}: {}", record, reason)),
        other => other,
    }
}
