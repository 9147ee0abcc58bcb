//! RPM structure parsers.

pub mod entry;
pub mod header;
pub mod lead;

pub use entry::{HeaderEntry, Value, ValueType};
pub use header::{HeaderParser, PayloadHeader, RawHeader, SignatureHeader};
pub use lead::{Lead, LeadParser};
