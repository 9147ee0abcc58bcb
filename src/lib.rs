//! RPM package streaming library.
//!
//! A forward-only reader for the RPM binary container format: the 96-byte
//! lead, the signature and payload header sections, and the compressed
//! cpio payload, all decoded in a single pass over a non-seekable stream.
//!
//! ## Reading a package
//!
//! ```rust,ignore
//! use rpm_stream::{CpioReader, RpmArchiveStream, RpmTag};
//!
//! let file = std::fs::File::open("testpkg-1.0-1.noarch.rpm")?;
//! let mut rpm = RpmArchiveStream::new(file);
//!
//! println!("name: {:?}", rpm.payload_header()?.get_string(RpmTag::Name));
//!
//! let entries = rpm.archive_reader()?;
//! while let Some(entry) = entries.read_next()? {
//!     println!("{} ({} bytes)", entry.name(), entry.file_size());
//! }
//! ```
//!
//! ## Design
//!
//! - Lazy, ordered initialization: nothing is read until the first
//!   accessor, then lead, signature header, payload header and payload
//!   codec run exactly once, in that order, whichever accessor came first.
//! - Single ownership: the stream owns its byte source exclusively and
//!   never seeks or re-reads. Closing is idempotent and releases every
//!   payload resource together.
//! - The payload decompressor (gzip, bzip2, lzma, xz or pass-through) is
//!   picked from tags discovered mid-stream; see [`payload`].

pub mod counting_reader;
pub mod error;
pub mod parsing;
pub mod payload;
pub mod tags;

mod rpm_archive_stream;

pub use counting_reader::CountingReader;
pub use error::{Result, RpmError};
pub use parsing::entry::{HeaderEntry, Value, ValueType};
pub use parsing::header::{HeaderParser, PayloadHeader, RawHeader, SignatureHeader};
pub use parsing::lead::{Lead, LeadParser};
pub use payload::{select_payload, PayloadCoding, PayloadDecoder, PayloadFormat};
pub use rpm_archive_stream::{ArchiveReader, RpmArchiveStream};
pub use tags::{RpmSignatureTag, RpmTag};

// Entry cursor types come straight from the cpio codec crate.
pub use cpio_archive::{CpioHeader, CpioReader};
