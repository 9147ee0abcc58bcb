//! Header entry decoding.
//!
//! Each index record declares a tag, a value type, a store offset and a
//! count. Values are decoded out of the fully-buffered store in a second
//! pass: offsets are store-relative, not stream-relative, so no entry is
//! valid before the whole store has been read.

use crate::error::{Result, RpmError};

/// RPM entry value type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bin,
    StringArray,
    /// Localized string table; decodes like [`ValueType::StringArray`].
    I18nString,
}

impl ValueType {
    /// Map a declared type code; `None` for codes this reader does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Null,
            1 => Self::Char,
            2 => Self::Int8,
            3 => Self::Int16,
            4 => Self::Int32,
            5 => Self::Int64,
            6 => Self::String,
            7 => Self::Bin,
            8 => Self::StringArray,
            9 => Self::I18nString,
            _ => return None,
        })
    }
}

/// A decoded tag value.
///
/// Fixed-width integers are big-endian on the wire and always decode to a
/// vector; single-valued tags are vectors of length one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Char(Vec<u8>),
    Int8(Vec<u8>),
    Int16(Vec<u16>),
    Int32(Vec<u32>),
    Int64(Vec<u64>),
    String(String),
    StringArray(Vec<String>),
    Binary(Vec<u8>),
}

impl Value {
    /// Single-string view; `None` for any other shape.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Self::StringArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Scalar integer view (first element), if the value fits in a `u32`.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Int8(v) => v.first().map(|&x| u32::from(x)),
            Self::Int16(v) => v.first().map(|&x| u32::from(x)),
            Self::Int32(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Scalar integer view (first element), widened to `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int64(v) => v.first().copied(),
            other => other.as_u32().map(u64::from),
        }
    }
}

/// One header entry: index identity plus the value decoded from the store.
#[derive(Debug, Clone)]
pub struct HeaderEntry {
    pub tag: i32,
    pub value_type: ValueType,
    pub offset: i32,
    pub count: i32,
    pub value: Value,
}

/// Decode a single value out of the store buffer.
pub fn decode_value(
    store: &[u8],
    tag: i32,
    value_type: ValueType,
    offset: i32,
    count: i32,
) -> Result<Value> {
    if offset < 0 || count < 0 {
        return Err(out_of_bounds(store, tag, offset, count));
    }

    match value_type {
        ValueType::Null => Ok(Value::Null),
        ValueType::Char => Ok(Value::Char(
            fixed_slice(store, tag, offset, count, 1)?.to_vec(),
        )),
        ValueType::Int8 => Ok(Value::Int8(
            fixed_slice(store, tag, offset, count, 1)?.to_vec(),
        )),
        ValueType::Int16 => {
            let bytes = fixed_slice(store, tag, offset, count, 2)?;
            Ok(Value::Int16(
                bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect(),
            ))
        }
        ValueType::Int32 => {
            let bytes = fixed_slice(store, tag, offset, count, 4)?;
            Ok(Value::Int32(
                bytes
                    .chunks_exact(4)
                    .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ))
        }
        ValueType::Int64 => {
            let bytes = fixed_slice(store, tag, offset, count, 8)?;
            Ok(Value::Int64(
                bytes
                    .chunks_exact(8)
                    .map(|c| {
                        u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                    })
                    .collect(),
            ))
        }
        // STRING is defined as exactly one NUL-terminated string; the
        // declared count is not a string count.
        ValueType::String => match read_strings(store, tag, offset, count, 1)?.pop() {
            Some(value) => Ok(Value::String(value)),
            None => Err(RpmError::UnterminatedString { tag }),
        },
        ValueType::StringArray | ValueType::I18nString => Ok(Value::StringArray(read_strings(
            store, tag, offset, count, count,
        )?)),
        ValueType::Bin => Ok(Value::Binary(
            fixed_slice(store, tag, offset, count, 1)?.to_vec(),
        )),
    }
}

fn out_of_bounds(store: &[u8], tag: i32, offset: i32, count: i32) -> RpmError {
    RpmError::EntryOutOfBounds {
        tag,
        offset,
        count,
        store_size: store.len(),
    }
}

/// Borrow `count * width` bytes starting at `offset`, bounds-checked.
fn fixed_slice<'a>(
    store: &'a [u8],
    tag: i32,
    offset: i32,
    count: i32,
    width: usize,
) -> Result<&'a [u8]> {
    let start = offset as usize;
    let end = (count as usize)
        .checked_mul(width)
        .and_then(|len| start.checked_add(len));
    match end {
        Some(end) if end <= store.len() => Ok(&store[start..end]),
        _ => Err(out_of_bounds(store, tag, offset, count)),
    }
}

/// Read `strings` consecutive NUL-terminated strings starting at `offset`.
fn read_strings(
    store: &[u8],
    tag: i32,
    offset: i32,
    count: i32,
    strings: i32,
) -> Result<Vec<String>> {
    let mut position = offset as usize;
    let mut values = Vec::with_capacity(strings as usize);
    for _ in 0..strings {
        let rest = store
            .get(position..)
            .ok_or_else(|| out_of_bounds(store, tag, offset, count))?;
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(RpmError::UnterminatedString { tag })?;
        values.push(String::from_utf8_lossy(&rest[..nul]).into_owned());
        position += nul + 1;
    }
    Ok(values)
}
