//! RPM tag vocabularies.
//!
//! Tags are integer keys into a header's index. The signature header and
//! the payload header use disjoint vocabularies and are never mixed; each
//! header type only accepts its own enum.
//!
//! Only the tags this reader and its immediate consumers care about are
//! listed. Unlisted tags still parse: raw lookups by `i32` work on any
//! header.

/// Tags of the payload (main) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RpmTag {
    Name = 1000,
    Version = 1001,
    Release = 1002,
    Epoch = 1003,
    Summary = 1004,
    Description = 1005,
    BuildTime = 1006,
    BuildHost = 1007,
    Size = 1009,
    License = 1014,
    Group = 1016,
    Url = 1020,
    Os = 1021,
    Arch = 1022,
    SourceRpm = 1044,
    ArchiveSize = 1046,
    ProvideName = 1047,
    PayloadFormat = 1124,
    PayloadCoding = 1125,
    PayloadFlags = 1126,
}

impl From<RpmTag> for i32 {
    fn from(tag: RpmTag) -> i32 {
        tag as i32
    }
}

/// Tags of the signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RpmSignatureTag {
    HeaderSignatures = 62,
    Pubkeys = 266,
    Dsa = 267,
    Rsa = 268,
    Sha1 = 269,
    /// Size of header plus compressed payload.
    Size = 1000,
    Pgp = 1002,
    Md5 = 1004,
    Gpg = 1005,
    /// Uncompressed payload size.
    PayloadSize = 1007,
}

impl From<RpmSignatureTag> for i32 {
    fn from(tag: RpmSignatureTag) -> i32 {
        tag as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values() {
        assert_eq!(i32::from(RpmTag::Name), 1000);
        assert_eq!(i32::from(RpmTag::PayloadFormat), 1124);
        assert_eq!(i32::from(RpmTag::PayloadCoding), 1125);
        assert_eq!(i32::from(RpmSignatureTag::Md5), 1004);
        assert_eq!(i32::from(RpmSignatureTag::PayloadSize), 1007);
    }
}
