//! End-to-end tests over synthetic in-memory packages.
//!
//! Each test assembles a complete RPM byte stream - lead, signature
//! header, payload header, compressed cpio payload - and drives the
//! public facade the way the storage layer would.

use std::io::{Cursor, Read, Write};

use rpm_stream::{
    CpioReader, RpmArchiveStream, RpmError, RpmSignatureTag, RpmTag, Value,
};

const LEAD_MAGIC: [u8; 4] = [0xED, 0xAB, 0xEE, 0xDB];
const HEADER_MAGIC: [u8; 3] = [0x8E, 0xAD, 0xE8];

fn lead_bytes(name: &str) -> Vec<u8> {
    let mut lead = vec![0u8; 96];
    lead[..4].copy_from_slice(&LEAD_MAGIC);
    lead[4] = 3;
    lead[5] = 0;
    lead[10..10 + name.len()].copy_from_slice(name.as_bytes());
    lead[78..80].copy_from_slice(&5u16.to_be_bytes());
    lead
}

/// Assemble a header section: index records plus a store.
struct SectionBuilder {
    index: Vec<u8>,
    store: Vec<u8>,
    count: i32,
}

impl SectionBuilder {
    fn new() -> Self {
        Self {
            index: Vec::new(),
            store: Vec::new(),
            count: 0,
        }
    }

    fn push_record(&mut self, tag: i32, type_code: i32, offset: i32, count: i32) {
        self.index.extend_from_slice(&tag.to_be_bytes());
        self.index.extend_from_slice(&type_code.to_be_bytes());
        self.index.extend_from_slice(&offset.to_be_bytes());
        self.index.extend_from_slice(&count.to_be_bytes());
        self.count += 1;
    }

    fn add_string(&mut self, tag: impl Into<i32>, value: &str) {
        let offset = self.store.len() as i32;
        self.store.extend_from_slice(value.as_bytes());
        self.store.push(0);
        self.push_record(tag.into(), 6, offset, 1);
    }

    fn add_int32(&mut self, tag: impl Into<i32>, values: &[u32]) {
        while self.store.len() % 4 != 0 {
            self.store.push(0);
        }
        let offset = self.store.len() as i32;
        for value in values {
            self.store.extend_from_slice(&value.to_be_bytes());
        }
        self.push_record(tag.into(), 4, offset, values.len() as i32);
    }

    fn add_bin(&mut self, tag: impl Into<i32>, data: &[u8]) {
        let offset = self.store.len() as i32;
        self.store.extend_from_slice(data);
        self.push_record(tag.into(), 7, offset, data.len() as i32);
    }

    fn build(&self, padded: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&HEADER_MAGIC);
        bytes.push(1);
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.extend_from_slice(&self.count.to_be_bytes());
        bytes.extend_from_slice(&(self.store.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.index);
        bytes.extend_from_slice(&self.store);
        if padded {
            let pad = (8 - self.store.len() % 8) % 8;
            bytes.extend_from_slice(&vec![0u8; pad]);
        }
        bytes
    }
}

/// One newc-format cpio entry, 4-byte aligned.
fn newc_entry(name: &str, data: &[u8], mode: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"070701");
    let fields: [u32; 13] = [
        1,                      // ino
        mode,                   // mode
        0,                      // uid
        0,                      // gid
        1,                      // nlink
        1_600_000_000,          // mtime
        data.len() as u32,      // filesize
        0,                      // dev major
        0,                      // dev minor
        0,                      // rdev major
        0,                      // rdev minor
        (name.len() + 1) as u32, // namesize, NUL included
        0,                      // check
    ];
    for field in fields {
        out.extend_from_slice(format!("{field:08x}").as_bytes());
    }
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out.extend_from_slice(data);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}

fn cpio_payload(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (name, data) in entries {
        payload.extend(newc_entry(name, data, 0o100_644));
    }
    payload.extend(newc_entry("TRAILER!!!", &[], 0));
    payload
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bzip2_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A complete package stream around an already-compressed payload.
fn package(name: &str, coding: Option<&str>, compressed_payload: &[u8]) -> Vec<u8> {
    let mut signature = SectionBuilder::new();
    signature.add_int32(RpmSignatureTag::Size, &[compressed_payload.len() as u32]);
    signature.add_bin(RpmSignatureTag::Md5, &[0xAB; 16]);

    let mut header = SectionBuilder::new();
    header.add_string(RpmTag::Name, name);
    header.add_string(RpmTag::Version, "1.0");
    header.add_string(RpmTag::PayloadFormat, "cpio");
    if let Some(coding) = coding {
        header.add_string(RpmTag::PayloadCoding, coding);
    }

    let mut file = lead_bytes(name);
    file.extend(signature.build(true));
    file.extend(header.build(false));
    file.extend_from_slice(compressed_payload);
    file
}

#[test]
fn test_reads_package_end_to_end() {
    let payload = cpio_payload(&[
        ("etc/testpkg.conf", b"hello rpm\n"),
        ("usr/share/testpkg/data", b"0123456789abcdef"),
    ]);
    let file = package("testpkg", Some("gzip"), &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));

    let lead = rpm.lead().unwrap().clone();
    assert_eq!(lead.major, 3);
    assert_eq!(lead.minor, 0);
    assert_eq!(lead.name, "testpkg");
    assert_eq!(lead.signature_type, 5);

    let signature = rpm.signature_header().unwrap();
    assert!(signature
        .get(RpmSignatureTag::Size)
        .and_then(Value::as_u32)
        .is_some());
    assert_eq!(
        signature.get(RpmSignatureTag::Md5).and_then(Value::as_binary),
        Some(&[0xAB; 16][..])
    );

    let header = rpm.payload_header().unwrap();
    assert_eq!(header.get_string(RpmTag::Name), Some("testpkg"));
    assert_eq!(header.get_string(RpmTag::Version), Some("1.0"));
    assert_eq!(header.get_string(RpmTag::PayloadFormat), Some("cpio"));

    let entries = rpm.archive_reader().unwrap();

    let first = entries.read_next().unwrap().unwrap();
    assert_eq!(first.name(), "etc/testpkg.conf");
    assert_eq!(first.file_size(), 10);
    let mut content = vec![0u8; 10];
    entries.read_exact(&mut content).unwrap();
    assert_eq!(content, b"hello rpm\n");

    let second = entries.read_next().unwrap().unwrap();
    assert_eq!(second.name(), "usr/share/testpkg/data");
    assert_eq!(second.file_size(), 16);
    let mut content = vec![0u8; 16];
    entries.read_exact(&mut content).unwrap();
    assert_eq!(content, b"0123456789abcdef");

    assert!(entries.read_next().unwrap().is_none());
}

#[test]
fn test_headers_record_consumed_byte_ranges() {
    let payload = cpio_payload(&[("a", b"x")]);
    let file = package("testpkg", Some("gzip"), &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    let (sig_start, sig_length) = {
        let signature = rpm.signature_header().unwrap().raw();
        (signature.start(), signature.length())
    };
    assert_eq!(sig_start, 96);
    assert_eq!(sig_length % 8, 0);

    let header = rpm.payload_header().unwrap().raw();
    assert_eq!(header.start(), sig_start + sig_length);
}

#[test]
fn test_bzip2_payload_round_trips_byte_identical() {
    let payload = cpio_payload(&[("data/blob", &[0x42; 1024])]);
    let file = package("testpkg", Some("bzip2"), &bzip2_compress(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    let mut decompressed = Vec::new();
    rpm.read_to_end(&mut decompressed).unwrap();
    assert_eq!(decompressed, payload);
}

#[test]
fn test_missing_coding_tag_defaults_to_gzip() {
    let payload = cpio_payload(&[("etc/a", b"a")]);
    let file = package("testpkg", None, &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    let mut decompressed = Vec::new();
    rpm.read_to_end(&mut decompressed).unwrap();
    assert_eq!(decompressed, payload);
}

#[test]
fn test_none_coding_passes_payload_through() {
    let payload = cpio_payload(&[("etc/a", b"abc")]);
    let file = package("testpkg", Some("none"), &payload);

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    let entries = rpm.archive_reader().unwrap();
    let entry = entries.read_next().unwrap().unwrap();
    assert_eq!(entry.name(), "etc/a");
}

#[test]
fn test_unsupported_coding_fails_initialization() {
    let payload = cpio_payload(&[("etc/a", b"a")]);
    let file = package("testpkg", Some("zstd"), &payload);

    // Even the lead accessor runs the full initialization chain, so the
    // bad coding surfaces before any payload stream exists.
    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    match rpm.lead() {
        Err(RpmError::UnsupportedPayloadCoding(coding)) => assert_eq!(coding, "zstd"),
        other => panic!("expected unsupported coding, got {other:?}"),
    }
}

#[test]
fn test_stream_operations_forward_to_payload() {
    let payload = cpio_payload(&[("etc/a", b"abc")]);
    let file = package("testpkg", Some("gzip"), &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));

    assert_eq!(rpm.read_byte().unwrap(), Some(payload[0]));
    assert_eq!(rpm.skip(2).unwrap(), 2);
    assert_eq!(rpm.read_byte().unwrap(), Some(payload[3]));
    assert!(rpm.available().unwrap() > 0);

    assert!(matches!(
        rpm.reset(),
        Err(RpmError::UnsupportedOperation("reset"))
    ));

    // The stream stays usable after the failed reset.
    let mut rest = Vec::new();
    rpm.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, &payload[4..]);
    assert_eq!(rpm.read_byte().unwrap(), None);
}

#[test]
fn test_accessors_are_memoized_in_any_order() {
    let payload = cpio_payload(&[("etc/a", b"a")]);
    let file = package("testpkg", Some("gzip"), &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));

    // Latest-stage accessor first; earlier stages must already have run.
    assert_eq!(
        rpm.payload_header().unwrap().get_string(RpmTag::Name),
        Some("testpkg")
    );
    assert_eq!(rpm.lead().unwrap().name, "testpkg");
    assert_eq!(rpm.lead().unwrap().name, "testpkg");
    assert!(rpm.signature_header().unwrap().raw().entries().len() > 0);
}

#[test]
fn test_truncated_payload_header_is_io_error() {
    let payload = cpio_payload(&[("etc/a", b"a")]);
    let mut file = package("testpkg", Some("gzip"), &gzip(&payload));
    file.truncate(96 + 40); // into the signature header's index block

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    match rpm.payload_header() {
        Err(RpmError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected IO error, got {other:?}"),
    }
}

#[test]
fn test_close_releases_everything_once() {
    let payload = cpio_payload(&[("etc/a", b"a")]);
    let file = package("testpkg", Some("gzip"), &gzip(&payload));

    let mut rpm = RpmArchiveStream::new(Cursor::new(file));
    rpm.lead().unwrap();
    rpm.close();
    rpm.close();
    assert!(rpm.lead().is_err());
    assert!(rpm.read_byte().is_err());
}
