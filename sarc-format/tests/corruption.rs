//! Opening malformed archives.

use std::error::Error as _;
use std::io::{Cursor, ErrorKind as IoErrorKind, Write};

use sarc_format::{Archive, CorruptionError, Error, ErrorKind, Mode};

fn valid() -> Vec<u8> {
    let archive = Archive::new(Cursor::new(Vec::new()), Mode::Create).unwrap();
    for (name, body) in [("alpha", &b"first body"[..]), ("beta", b"2")] {
        let entry = archive.create_entry(name).unwrap();
        entry.open().unwrap().write_all(body).unwrap();
    }
    archive.into_inner().unwrap().into_inner()
}

fn open(bytes: &[u8]) -> CorruptionError {
    let err = Archive::new(Cursor::new(bytes), Mode::Read).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedArchive);
    match err {
        Error::Corrupted(cause) => cause,
        other => panic!("expected corruption, got {:?}", other),
    }
}

fn put_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

#[test]
fn too_short() {
    assert!(matches!(open(b""), CorruptionError::TooShort(0)));
    assert!(matches!(open(b"sarc\0\0\0\x01"), CorruptionError::TooShort(8)));

    // an empty stream is not an archive in update mode either
    let err = Archive::new(Cursor::new(Vec::new()), Mode::Update).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedArchive);
}

#[test]
fn wrong_magic_or_version() {
    let mut bytes = valid();
    bytes[..4].copy_from_slice(b"SARC");
    assert!(matches!(open(&bytes), CorruptionError::BadMagic(m) if &m == b"SARC"));

    let mut bytes = valid();
    put_u32(&mut bytes, 4, 2);
    assert!(matches!(open(&bytes), CorruptionError::UnsupportedVersion(2)));
}

#[test]
fn offset_table_past_end() {
    let mut bytes = valid();
    put_u32(&mut bytes, 8, 1_000_000);
    assert!(matches!(
        open(&bytes),
        CorruptionError::Truncated {
            entry_count: 1_000_000,
            ..
        }
    ));
}

#[test]
fn truncated_body_keeps_cause() {
    let mut bytes = valid();
    bytes.truncate(bytes.len() - 1);

    let err = Archive::new(Cursor::new(&bytes[..]), Mode::Read).unwrap_err();
    let cause = err.source().unwrap();
    assert!(cause.to_string().contains("Entry 1"));
    let root = cause.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(root.kind(), IoErrorKind::UnexpectedEof);
}

#[test]
fn header_offset_out_of_range() {
    let mut bytes = valid();
    put_u32(&mut bytes, 12, u32::MAX);
    assert!(matches!(
        open(&bytes),
        CorruptionError::MalformedEntry { index: 0, .. }
    ));
}

#[test]
fn non_ascii_name() {
    let mut bytes = valid();
    let header = u32::from_be_bytes(bytes[12..16].try_into().unwrap()) as usize;
    bytes[header + 12] = 0xC3;
    match open(&bytes) {
        CorruptionError::MalformedEntry { index, source } => {
            assert_eq!(index, 0);
            assert_eq!(source.kind(), IoErrorKind::InvalidData);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn bad_alignment_on_disk() {
    let mut bytes = valid();
    let header = u32::from_be_bytes(bytes[16..20].try_into().unwrap()) as usize;
    put_u32(&mut bytes, header + 8, 3);
    assert!(matches!(
        open(&bytes),
        CorruptionError::BadAlignment {
            index: 1,
            alignment: 3
        }
    ));
}

#[test]
fn duplicate_names_on_disk() {
    let mut bytes = valid();
    // point both slots at the first entry
    let first = u32::from_be_bytes(bytes[12..16].try_into().unwrap());
    put_u32(&mut bytes, 16, first);
    assert!(matches!(
        open(&bytes),
        CorruptionError::DuplicateName(name) if name == "alpha"
    ));
}
