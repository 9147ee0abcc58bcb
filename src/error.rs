//! Error types for RPM parsing and payload decoding.
//!
//! This module provides the [`RpmError`] type which covers all possible
//! errors that can occur when reading an RPM package stream.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Format | [`InvalidLeadMagic`], [`InvalidHeaderMagic`], [`InvalidHeaderVersion`] | File is not a valid RPM package |
//! | Header | [`UnknownValueType`], [`EntryOutOfBounds`], [`UnterminatedString`] | A header entry cannot be decoded |
//! | Payload | [`UnsupportedPayloadFormat`], [`UnsupportedPayloadCoding`] | The payload cannot be unwrapped |
//! | I/O | [`Io`] | Short read or underlying source failure |
//!
//! Format and header errors are fatal and never retried: a corrupt byte
//! stream cannot become valid by reading it again. Retry policy, if any,
//! belongs to whoever re-fetches the source bytes.
//!
//! [`InvalidLeadMagic`]: RpmError::InvalidLeadMagic
//! [`InvalidHeaderMagic`]: RpmError::InvalidHeaderMagic
//! [`InvalidHeaderVersion`]: RpmError::InvalidHeaderVersion
//! [`UnknownValueType`]: RpmError::UnknownValueType
//! [`EntryOutOfBounds`]: RpmError::EntryOutOfBounds
//! [`UnterminatedString`]: RpmError::UnterminatedString
//! [`UnsupportedPayloadFormat`]: RpmError::UnsupportedPayloadFormat
//! [`UnsupportedPayloadCoding`]: RpmError::UnsupportedPayloadCoding
//! [`Io`]: RpmError::Io

use std::fmt;
use std::io;

use crate::parsing::header::HeaderParser;
use crate::parsing::lead::LeadParser;

/// Error type for RPM stream operations.
#[derive(Debug)]
pub enum RpmError {
    /// The stream does not start with the RPM lead magic `ED AB EE DB`.
    InvalidLeadMagic {
        /// The four bytes actually read.
        actual: [u8; 4],
    },

    /// A header section does not start with the magic `8E AD E8`.
    InvalidHeaderMagic {
        /// The three bytes actually read.
        actual: [u8; 3],
    },

    /// A header section declares a version other than 1.
    InvalidHeaderVersion(u8),

    /// A header section declares a negative index count.
    InvalidIndexCount(i32),

    /// An index record declares a value type this reader does not know.
    ///
    /// Known type codes are 0 (NULL) through 9 (I18N string).
    UnknownValueType {
        /// The tag whose record is unreadable.
        tag: i32,
        /// The type code that was declared.
        type_code: i32,
    },

    /// An index record references bytes outside the header's store.
    EntryOutOfBounds {
        tag: i32,
        offset: i32,
        count: i32,
        /// Actual length of the store buffer.
        store_size: usize,
    },

    /// A string value runs past the end of the store without a NUL.
    UnterminatedString {
        /// The tag whose value is unterminated.
        tag: i32,
    },

    /// A payload declaration tag held something other than a single string.
    ///
    /// `field` is either `"payload format"` or `"payload coding"`.
    PayloadValueNotString { field: &'static str },

    /// The payload archive format is not `cpio`.
    ///
    /// The `String` is the declared format. This reader only understands
    /// the cpio archive format for payload content.
    UnsupportedPayloadFormat(String),

    /// The payload compression coding is not one this reader supports.
    ///
    /// Supported codings: `none`, `gzip`, `bzip2`, `lzma`, `xz`.
    UnsupportedPayloadCoding(String),

    /// The requested operation is not supported by the selected payload
    /// decompressor (e.g. `reset`). The stream itself remains usable.
    UnsupportedOperation(&'static str),

    /// The archived-entry codec failed while reading the payload.
    Archive(cpio_archive::Error),

    /// An I/O error occurred.
    ///
    /// Short reads surface as [`std::io::ErrorKind::UnexpectedEof`]. The
    /// stream is unusable afterwards and must be closed.
    Io(io::Error),
}

impl fmt::Display for RpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLeadMagic { actual } => write!(
                f,
                "invalid lead magic: expected {:02X?}, read {:02X?}",
                LeadParser::MAGIC,
                actual
            ),
            Self::InvalidHeaderMagic { actual } => write!(
                f,
                "invalid header magic: expected {:02X?}, read {:02X?}",
                HeaderParser::MAGIC,
                actual
            ),
            Self::InvalidHeaderVersion(version) => {
                write!(f, "invalid header version: {version} (valid: 1)")
            }
            Self::InvalidIndexCount(count) => {
                write!(f, "invalid header index count: {count}")
            }
            Self::UnknownValueType { tag, type_code } => {
                write!(f, "tag {tag}: unknown value type code {type_code}")
            }
            Self::EntryOutOfBounds {
                tag,
                offset,
                count,
                store_size,
            } => write!(
                f,
                "tag {tag}: entry (offset {offset}, count {count}) outside store of {store_size} bytes"
            ),
            Self::UnterminatedString { tag } => {
                write!(f, "tag {tag}: string value not NUL-terminated")
            }
            Self::PayloadValueNotString { field } => {
                write!(f, "{field} must be a single string")
            }
            Self::UnsupportedPayloadFormat(format) => {
                write!(f, "unsupported payload format: {format}")
            }
            Self::UnsupportedPayloadCoding(coding) => {
                write!(f, "unsupported payload coding: {coding}")
            }
            Self::UnsupportedOperation(op) => {
                write!(f, "operation not supported by the payload stream: {op}")
            }
            Self::Archive(e) => write!(f, "archive error: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for RpmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Archive(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RpmError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<cpio_archive::Error> for RpmError {
    fn from(e: cpio_archive::Error) -> Self {
        Self::Archive(e)
    }
}

pub type Result<T> = std::result::Result<T, RpmError>;
