//! Payload codec selection.
//!
//! The payload header declares an archive format and a compression coding
//! for everything that follows it. Only the cpio archive format is
//! understood; the coding picks one of the supported decompressors.
//! Packages that predate the declaration tags carry neither, so both fall
//! back to documented defaults: `cpio` and `gzip`.

use std::io::{self, Read};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;
use xz2::stream::Stream;

use crate::error::{Result, RpmError};
use crate::parsing::header::PayloadHeader;
use crate::tags::RpmTag;

/// Archive format of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Cpio,
}

/// Compression coding applied to the payload archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadCoding {
    None,
    Gzip,
    Bzip2,
    /// Raw LZMA-alone stream, no container framing.
    Lzma,
    /// XZ-framed LZMA2 stream.
    Xz,
}

impl PayloadCoding {
    /// Wrap the remaining raw stream in the matching decompressor.
    pub fn decoder<R: Read>(self, inner: R) -> Result<PayloadDecoder<R>> {
        Ok(match self {
            Self::None => PayloadDecoder::None(inner),
            Self::Gzip => PayloadDecoder::Gzip(GzDecoder::new(inner)),
            Self::Bzip2 => PayloadDecoder::Bzip2(BzDecoder::new(inner)),
            Self::Lzma => {
                let stream = Stream::new_lzma_decoder(u64::MAX)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                PayloadDecoder::Lzma(XzDecoder::new_stream(inner, stream))
            }
            Self::Xz => PayloadDecoder::Xz(XzDecoder::new(inner)),
        })
    }
}

/// Resolve the payload format and coding tags of a payload header,
/// applying the defaults when either is absent or empty.
pub fn select_payload(header: &PayloadHeader) -> Result<(PayloadFormat, PayloadCoding)> {
    let format = single_string(header, RpmTag::PayloadFormat, "payload format")?;
    let format = match format {
        None | Some("") | Some("cpio") => PayloadFormat::Cpio,
        Some(other) => return Err(RpmError::UnsupportedPayloadFormat(other.to_string())),
    };

    let coding = single_string(header, RpmTag::PayloadCoding, "payload coding")?;
    let coding = match coding {
        None | Some("") | Some("gzip") => PayloadCoding::Gzip,
        Some("none") => PayloadCoding::None,
        Some("bzip2") => PayloadCoding::Bzip2,
        Some("lzma") => PayloadCoding::Lzma,
        Some("xz") => PayloadCoding::Xz,
        Some(other) => return Err(RpmError::UnsupportedPayloadCoding(other.to_string())),
    };

    Ok((format, coding))
}

/// An absent tag is fine; a present tag must be a single string.
fn single_string<'a>(
    header: &'a PayloadHeader,
    tag: RpmTag,
    field: &'static str,
) -> Result<Option<&'a str>> {
    match header.get(tag) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or(RpmError::PayloadValueNotString { field }),
    }
}

/// Decompressor dispatch over the remaining raw stream.
///
/// One variant per supported coding; all of them are forward-only.
pub enum PayloadDecoder<R: Read> {
    None(R),
    Gzip(GzDecoder<R>),
    Bzip2(BzDecoder<R>),
    Lzma(XzDecoder<R>),
    Xz(XzDecoder<R>),
}

impl<R: Read> Read for PayloadDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::None(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
            Self::Lzma(r) | Self::Xz(r) => r.read(buf),
        }
    }
}
