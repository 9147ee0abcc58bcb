//! Lead parser - the fixed 96-byte record at the start of every RPM file.
//!
//! The lead is a legacy identification structure; everything that matters
//! today lives in the header sections. Only the version, package name and
//! signature type are surfaced.

use crate::error::{Result, RpmError};

/// Decoded lead record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub major: u8,
    pub minor: u8,
    /// Package name, trailing NUL padding trimmed.
    pub name: String,
    pub signature_type: u16,
}

pub struct LeadParser;

impl LeadParser {
    /// Lead magic bytes.
    pub const MAGIC: [u8; 4] = [0xED, 0xAB, 0xEE, 0xDB];
    /// Fixed size of the lead on the wire.
    pub const SIZE: usize = 96;

    /// Parse the lead from an exactly 96-byte buffer.
    ///
    /// Layout: magic(4), version(2), type+arch(4, ignored), name(66),
    /// os(2, ignored), signature type(2, big-endian), reserved(16).
    pub fn parse(buffer: &[u8; Self::SIZE]) -> Result<Lead> {
        if buffer[..4] != Self::MAGIC {
            let mut actual = [0u8; 4];
            actual.copy_from_slice(&buffer[..4]);
            return Err(RpmError::InvalidLeadMagic { actual });
        }

        let major = buffer[4];
        let minor = buffer[5];

        // The 66-byte name field is NUL-padded to its fixed width.
        let name = String::from_utf8_lossy(&buffer[10..76])
            .trim_end_matches('\0')
            .to_string();

        let signature_type = u16::from_be_bytes([buffer[78], buffer[79]]);

        Ok(Lead {
            major,
            minor,
            name,
            signature_type,
        })
    }
}
