//! RpmArchiveStream - streaming facade over one RPM package.
//!
//! Orchestrates the strictly ordered initialization chain: lead, signature
//! header, payload header, payload codec, archived-entry stream. Every
//! stage runs exactly once, lazily, triggered by whichever accessor is
//! called first; later accessors reuse the memoized results.
//!
//! The stream exclusively owns its byte source for its entire lifetime and
//! makes a single forward pass over it - nothing is ever re-read. The
//! reader is not reentrant: one consumer at a time, as with any `Read`
//! value that is `&mut`-threaded through its methods.

use std::io::{self, BufRead, BufReader, Read};

use cpio_archive::ChainedCpioReader;

use crate::counting_reader::CountingReader;
use crate::error::{Result, RpmError};
use crate::parsing::header::{HeaderParser, PayloadHeader, SignatureHeader};
use crate::parsing::lead::{Lead, LeadParser};
use crate::payload::{select_payload, PayloadDecoder};

/// Buffered, decompressed payload bytes.
type PayloadStream<R> = BufReader<PayloadDecoder<CountingReader<R>>>;

/// Archived-entry cursor over the decompressed payload.
pub type ArchiveReader<R> = Box<ChainedCpioReader<PayloadStream<R>>>;

/// Initialization stages, strictly ordered.
///
/// A later stage can never be reached without all earlier ones; `Closed`
/// is reachable from anywhere and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    LeadRead,
    SignatureRead,
    PayloadHeaderRead,
    PayloadReady,
    Closed,
}

/// The payload is consumed either as raw decompressed bytes or through
/// the archived-entry cursor; the cursor takes over the stream on first
/// access and the two modes must not be interleaved.
enum Payload<R: Read> {
    Raw(PayloadStream<R>),
    Archive(ArchiveReader<R>),
}

/// Streaming reader for one RPM package.
///
/// ```rust,ignore
/// let mut rpm = RpmArchiveStream::new(std::fs::File::open(path)?);
/// println!("package: {}", rpm.lead()?.name);
/// let entries = rpm.archive_reader()?;
/// while let Some(entry) = entries.read_next()? {
///     // entry.name(), entry.file_size(); content follows via Read
/// }
/// ```
pub struct RpmArchiveStream<R: Read> {
    source: Option<CountingReader<R>>,
    state: State,
    lead: Option<Lead>,
    signature_header: Option<SignatureHeader>,
    payload_header: Option<PayloadHeader>,
    payload: Option<Payload<R>>,
}

impl<R: Read> RpmArchiveStream<R> {
    /// Wrap a raw byte source. Nothing is read until the first accessor.
    pub fn new(source: R) -> Self {
        Self {
            source: Some(CountingReader::new(source)),
            state: State::Uninitialized,
            lead: None,
            signature_header: None,
            payload_header: None,
            payload: None,
        }
    }

    /// Run every outstanding initialization stage, in order.
    ///
    /// A cheap no-op once the payload is ready.
    fn ensure_init(&mut self) -> Result<()> {
        loop {
            match self.state {
                State::PayloadReady => return Ok(()),
                State::Closed => return Err(closed()),
                State::Uninitialized => {
                    let source = self.source_mut()?;
                    let mut buffer = [0u8; LeadParser::SIZE];
                    source.read_exact(&mut buffer)?;
                    self.lead = Some(LeadParser::parse(&buffer)?);
                    self.state = State::LeadRead;
                }
                State::LeadRead => {
                    let source = self.source_mut()?;
                    let raw = HeaderParser::read(source, true)?;
                    log::debug!(
                        "signature header: {} entries in {} bytes",
                        raw.entries().len(),
                        raw.length()
                    );
                    self.signature_header = Some(SignatureHeader(raw));
                    self.state = State::SignatureRead;
                }
                State::SignatureRead => {
                    let source = self.source_mut()?;
                    let raw = HeaderParser::read(source, false)?;
                    log::debug!(
                        "payload header: {} entries in {} bytes",
                        raw.entries().len(),
                        raw.length()
                    );
                    self.payload_header = Some(PayloadHeader(raw));
                    self.state = State::PayloadHeaderRead;
                }
                State::PayloadHeaderRead => {
                    let header = match self.payload_header.as_ref() {
                        Some(header) => header,
                        None => return Err(closed()),
                    };
                    let (_format, coding) = select_payload(header)?;
                    let source = match self.source.take() {
                        Some(source) => source,
                        None => return Err(closed()),
                    };
                    let decoder = coding.decoder(source)?;
                    self.payload = Some(Payload::Raw(BufReader::new(decoder)));
                    self.state = State::PayloadReady;
                }
            }
        }
    }

    fn source_mut(&mut self) -> Result<&mut CountingReader<R>> {
        self.source.as_mut().ok_or_else(closed)
    }

    fn payload_mut(&mut self) -> Result<&mut Payload<R>> {
        self.ensure_init()?;
        self.payload.as_mut().ok_or_else(closed)
    }

    /// The 96-byte lead record.
    pub fn lead(&mut self) -> Result<&Lead> {
        self.ensure_init()?;
        self.lead.as_ref().ok_or_else(closed)
    }

    /// The signature header section.
    pub fn signature_header(&mut self) -> Result<&SignatureHeader> {
        self.ensure_init()?;
        self.signature_header.as_ref().ok_or_else(closed)
    }

    /// The payload header section.
    pub fn payload_header(&mut self) -> Result<&PayloadHeader> {
        self.ensure_init()?;
        self.payload_header.as_ref().ok_or_else(closed)
    }

    /// Read a single payload byte; `Ok(None)` at end of payload.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        let n = self.read(&mut byte)?;
        Ok(if n == 0 { None } else { Some(byte[0]) })
    }

    /// Discard up to `n` payload bytes, returning how many were skipped.
    pub fn skip(&mut self, n: u64) -> Result<u64> {
        self.ensure_init()?;
        let mut limited = Read::take(&mut *self, n);
        Ok(io::copy(&mut limited, &mut io::sink())?)
    }

    /// Decompressed bytes available without another read of the raw
    /// source; 0 once the archived-entry cursor owns the payload.
    pub fn available(&mut self) -> Result<usize> {
        match self.payload_mut()? {
            Payload::Raw(stream) => Ok(stream.fill_buf()?.len()),
            Payload::Archive(_) => Ok(0),
        }
    }

    /// Rewind the payload stream.
    ///
    /// None of the supported decompressors can rewind a forward-only
    /// source, so this always fails with
    /// [`RpmError::UnsupportedOperation`].
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_init()?;
        Err(RpmError::UnsupportedOperation("reset"))
    }

    /// The archived-entry cursor over the decompressed payload.
    ///
    /// Built once, on first access. Entries come back lazily in archive
    /// order via `read_next`, each one's content readable through the
    /// cursor's `Read` impl; the sequence is finite and not restartable.
    /// The cursor owns the payload bytes from this point on.
    pub fn archive_reader(&mut self) -> Result<&mut ArchiveReader<R>>
    where
        R: 'static,
    {
        self.ensure_init()?;
        if matches!(self.payload, Some(Payload::Raw(_))) {
            match self.payload.take() {
                Some(Payload::Raw(stream)) => {
                    self.payload = Some(Payload::Archive(cpio_archive::reader(stream)?));
                }
                _ => return Err(closed()),
            }
        }
        match self.payload.as_mut() {
            Some(Payload::Archive(reader)) => Ok(reader),
            _ => Err(closed()),
        }
    }

    /// Close the stream, releasing the source, the decompressor and any
    /// entry cursor together, whatever stage initialization reached.
    ///
    /// Closing twice is a no-op; accessors fail afterwards.
    pub fn close(&mut self) {
        if self.state != State::Closed {
            self.payload = None;
            self.source = None;
            self.state = State::Closed;
        }
    }
}

impl<R: Read> Read for RpmArchiveStream<R> {
    /// Forward to the decompressed payload, initializing first if needed.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.payload_mut().map_err(into_io)? {
            Payload::Raw(stream) => stream.read(buf),
            Payload::Archive(reader) => reader.read(buf),
        }
    }
}

fn closed() -> RpmError {
    RpmError::Io(io::Error::new(io::ErrorKind::Other, "stream is closed"))
}

fn into_io(e: RpmError) -> io::Error {
    match e {
        RpmError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
