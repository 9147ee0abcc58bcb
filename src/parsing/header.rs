//! Header section parser.
//!
//! A header section is a 16-byte preamble, an index block of 16-byte
//! records, and a variable-length value store. Parsing is two-pass: read
//! every index record, buffer the full store, then decode each entry at
//! its declared offset (see [`crate::parsing::entry`]).
//!
//! The signature header is followed by pad bytes that realign the stream
//! to an 8-byte boundary; the payload header is not padded.

use std::io::Read;

use crate::counting_reader::CountingReader;
use crate::error::{Result, RpmError};
use crate::parsing::entry::{decode_value, HeaderEntry, Value, ValueType};
use crate::tags::{RpmSignatureTag, RpmTag};

/// Preamble: magic(3) + version(1) + reserved(4) + index count(4) + store size(4).
const PREAMBLE_SIZE: usize = 16;
/// One index record: tag, type, offset, count - each a big-endian i32.
const INDEX_RECORD_SIZE: usize = 16;

/// A provisional index record, before its value is decoded from the store.
#[derive(Debug, Clone, Copy)]
struct IndexRecord {
    tag: i32,
    type_code: i32,
    offset: i32,
    count: i32,
}

/// A parsed header section with its consumed byte range.
#[derive(Debug, Clone)]
pub struct RawHeader {
    entries: Vec<HeaderEntry>,
    start: u64,
    length: u64,
}

impl RawHeader {
    pub(crate) fn new(entries: Vec<HeaderEntry>, start: u64, length: u64) -> Self {
        Self {
            entries,
            start,
            length,
        }
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// Byte offset of this header section in the stream.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of bytes the section consumed, padding included.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Look up a tag's decoded value.
    pub fn get(&self, tag: impl Into<i32>) -> Option<&Value> {
        let tag = tag.into();
        self.entries.iter().find(|e| e.tag == tag).map(|e| &e.value)
    }

    /// Look up a tag that holds a single string.
    pub fn get_string(&self, tag: impl Into<i32>) -> Option<&str> {
        self.get(tag).and_then(Value::as_str)
    }
}

/// The padded first header section, indexed by [`RpmSignatureTag`].
#[derive(Debug, Clone)]
pub struct SignatureHeader(pub(crate) RawHeader);

impl SignatureHeader {
    pub fn get(&self, tag: RpmSignatureTag) -> Option<&Value> {
        self.0.get(tag)
    }

    pub fn get_string(&self, tag: RpmSignatureTag) -> Option<&str> {
        self.0.get_string(tag)
    }

    /// The underlying tag store, for raw `i32` lookups.
    pub fn raw(&self) -> &RawHeader {
        &self.0
    }
}

/// The unpadded second header section, indexed by [`RpmTag`].
#[derive(Debug, Clone)]
pub struct PayloadHeader(pub(crate) RawHeader);

impl PayloadHeader {
    pub fn get(&self, tag: RpmTag) -> Option<&Value> {
        self.0.get(tag)
    }

    pub fn get_string(&self, tag: RpmTag) -> Option<&str> {
        self.0.get_string(tag)
    }

    /// The underlying tag store, for raw `i32` lookups.
    pub fn raw(&self) -> &RawHeader {
        &self.0
    }
}

pub struct HeaderParser;

impl HeaderParser {
    /// Header section magic bytes.
    pub const MAGIC: [u8; 3] = [0x8E, 0xAD, 0xE8];
    /// The only header version ever issued.
    pub const VERSION: u8 = 1;

    /// Read one header section from the current stream position.
    ///
    /// `padded` is true for the signature header only: its store is padded
    /// so that the next section starts on an 8-byte boundary.
    pub fn read<R: Read>(source: &mut CountingReader<R>, padded: bool) -> Result<RawHeader> {
        let start = source.bytes_read();

        let preamble = source.read_exact_buf(PREAMBLE_SIZE)?;
        let (index_count, store_size) = Self::parse_preamble(&preamble)?;

        let index_bytes = index_count
            .checked_mul(INDEX_RECORD_SIZE)
            .ok_or(RpmError::InvalidIndexCount(index_count as i32))?;
        let index_buf = source.read_exact_buf(index_bytes)?;
        let records: Vec<IndexRecord> = index_buf
            .chunks_exact(INDEX_RECORD_SIZE)
            .map(Self::parse_index_record)
            .collect();

        let store = source.read_exact_buf(store_size)?;

        let entries = records
            .iter()
            .map(|record| Self::decode_record(record, &store))
            .collect::<Result<Vec<_>>>()?;

        if padded {
            let pad = (8 - store_size % 8) % 8;
            if pad > 0 {
                log::debug!("skipping {pad} pad bytes");
                source.skip_fully(pad)?;
            }
        }

        let end = source.bytes_read();
        Ok(RawHeader::new(entries, start, end - start))
    }

    fn parse_preamble(buffer: &[u8]) -> Result<(usize, usize)> {
        if buffer[..3] != Self::MAGIC {
            let mut actual = [0u8; 3];
            actual.copy_from_slice(&buffer[..3]);
            return Err(RpmError::InvalidHeaderMagic { actual });
        }

        let version = buffer[3];
        if version != Self::VERSION {
            return Err(RpmError::InvalidHeaderVersion(version));
        }

        // 4 reserved bytes, then index count and store size.
        let index_count = i32::from_be_bytes([buffer[8], buffer[9], buffer[10], buffer[11]]);
        if index_count < 0 {
            return Err(RpmError::InvalidIndexCount(index_count));
        }
        let store_size = u32::from_be_bytes([buffer[12], buffer[13], buffer[14], buffer[15]]);

        Ok((index_count as usize, store_size as usize))
    }

    fn parse_index_record(buffer: &[u8]) -> IndexRecord {
        IndexRecord {
            tag: i32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]),
            type_code: i32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]),
            offset: i32::from_be_bytes([buffer[8], buffer[9], buffer[10], buffer[11]]),
            count: i32::from_be_bytes([buffer[12], buffer[13], buffer[14], buffer[15]]),
        }
    }

    fn decode_record(record: &IndexRecord, store: &[u8]) -> Result<HeaderEntry> {
        let value_type =
            ValueType::from_code(record.type_code).ok_or(RpmError::UnknownValueType {
                tag: record.tag,
                type_code: record.type_code,
            })?;
        let value = decode_value(store, record.tag, value_type, record.offset, record.count)?;
        Ok(HeaderEntry {
            tag: record.tag,
            value_type,
            offset: record.offset,
            count: record.count,
            value,
        })
    }
}
