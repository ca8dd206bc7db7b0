//! Sans-IO parsing primitives for the sarc format.
//!
//! These functions work on byte slices without any I/O traits, which makes
//! them usable over memory maps and in-memory buffers alike.
//!
//! All functions return `(value, bytes_consumed)` on success, allowing the
//! caller to manage buffer positions.

use crate::header::{ArchiveHeader, MAGIC_BYTES, VERSION};

/// Error type for parsing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Need more bytes to complete parsing. Contains minimum additional bytes needed.
    NeedMoreBytes(usize),
    /// Invalid data encountered.
    InvalidData(&'static str),
    /// A string contained a byte outside the ASCII range.
    InvalidAscii,
    /// The buffer does not start with the archive magic bytes.
    BadMagic([u8; 4]),
    /// The archive was written by an unsupported format version.
    UnsupportedVersion(u32),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::NeedMoreBytes(n) => write!(f, "need {} more bytes", n),
            ParseError::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            ParseError::InvalidAscii => write!(f, "invalid ASCII"),
            ParseError::BadMagic(magic) => write!(f, "invalid magic bytes: {:02x?}", magic),
            ParseError::UnsupportedVersion(v) => {
                write!(f, "unsupported version {} (expected {})", v, VERSION)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for std::io::Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::NeedMoreBytes(_) => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, e)
            }
            _ => std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    }
}

pub type ParseResult<T> = Result<(T, usize), ParseError>;

/// Parse a big-endian u32.
#[inline]
pub fn parse_u32_be(data: &[u8]) -> ParseResult<u32> {
    match data.get(..4) {
        Some(&[a, b, c, d]) => Ok((u32::from_be_bytes([a, b, c, d]), 4)),
        _ => Err(ParseError::NeedMoreBytes(4 - data.len())),
    }
}

/// Parse a NUL-terminated ASCII string.
///
/// The consumed count includes the terminator.
pub fn parse_cstr(data: &[u8]) -> ParseResult<&str> {
    let end = match data.iter().position(|&b| b == 0) {
        Some(end) => end,
        None => return Err(ParseError::NeedMoreBytes(1)),
    };

    let bytes = &data[..end];
    if !bytes.is_ascii() {
        return Err(ParseError::InvalidAscii);
    }

    // ASCII is always valid UTF-8.
    let s = std::str::from_utf8(bytes).map_err(|_| ParseError::InvalidAscii)?;
    Ok((s, end + 1))
}

/// Header fields that follow the magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderData {
    pub version: u32,
    pub entry_count: u32,
}

/// Parse and validate the 12-byte archive header.
pub fn parse_header(data: &[u8]) -> ParseResult<HeaderData> {
    let size = ArchiveHeader::SIZE as usize;
    if data.len() < size {
        return Err(ParseError::NeedMoreBytes(size - data.len()));
    }

    let magic = [data[0], data[1], data[2], data[3]];
    if &magic != MAGIC_BYTES {
        return Err(ParseError::BadMagic(magic));
    }

    let (version, _) = parse_u32_be(&data[4..])?;
    if version != VERSION {
        return Err(ParseError::UnsupportedVersion(version));
    }

    let (entry_count, _) = parse_u32_be(&data[8..])?;

    Ok((
        HeaderData {
            version,
            entry_count,
        },
        size,
    ))
}
