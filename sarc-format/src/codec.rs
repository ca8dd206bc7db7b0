//! Positional big-endian codec over a backing stream.

use std::io::{Read, Result, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::parse::ParseError;
use crate::storage::{stream_len, WritableStorage};

const CSTR_CHUNK: usize = 64;
const ZEROS: [u8; 256] = [0u8; 256];

/// Random-access reader. Every read names the absolute position it starts at.
pub(crate) struct Reader<'a, S: ?Sized> {
    stream: &'a mut S,
    len: u64,
}

impl<'a, S: Read + Seek + ?Sized> Reader<'a, S> {
    pub(crate) fn new(stream: &'a mut S) -> Result<Self> {
        let len = stream_len(stream)?;
        Ok(Reader { stream, len })
    }

    #[inline]
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    pub(crate) fn read_u32(&mut self, pos: u64) -> Result<u32> {
        self.stream.seek(SeekFrom::Start(pos))?;
        self.stream.read_u32::<BigEndian>()
    }

    pub(crate) fn read_bytes(&mut self, pos: u64, count: u64) -> Result<Vec<u8>> {
        // Refuse before allocating, so a corrupt length cannot request gigabytes.
        match pos.checked_add(count) {
            Some(end) if end <= self.len => {}
            _ => return Err(ParseError::NeedMoreBytes(count as usize).into()),
        }

        self.stream.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; count as usize];
        self.stream.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a NUL-terminated ASCII string starting at `pos`.
    pub(crate) fn read_cstr(&mut self, pos: u64) -> Result<String> {
        self.stream.seek(SeekFrom::Start(pos))?;

        let mut out = Vec::new();
        let mut chunk = [0u8; CSTR_CHUNK];
        loop {
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(ParseError::NeedMoreBytes(1).into());
            }
            match chunk[..n].iter().position(|&b| b == 0) {
                Some(end) => {
                    out.extend_from_slice(&chunk[..end]);
                    break;
                }
                None => out.extend_from_slice(&chunk[..n]),
            }
        }

        if !out.is_ascii() {
            return Err(ParseError::InvalidAscii.into());
        }
        String::from_utf8(out).map_err(|_| ParseError::InvalidAscii.into())
    }
}

/// Sequential writer with explicit seeks, tracking its own position.
pub(crate) struct Writer<'a> {
    stream: &'a mut dyn WritableStorage,
    position: u64,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(stream: &'a mut dyn WritableStorage) -> Result<Self> {
        let position = stream.stream_position()?;
        Ok(Writer { stream, position })
    }

    #[inline]
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn seek(&mut self, pos: u64) -> Result<()> {
        self.position = self.stream.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> Result<()> {
        self.stream.write_u32::<BigEndian>(value)?;
        self.position += 4;
        Ok(())
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Writes `value` followed by a NUL terminator.
    pub(crate) fn write_cstr(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())?;
        self.write_bytes(&[0])
    }

    pub(crate) fn write_zeros(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            let n = count.min(ZEROS.len() as u64) as usize;
            self.write_bytes(&ZEROS[..n])?;
            count -= n as u64;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }

    pub(crate) fn set_len(&mut self, len: u64) -> Result<()> {
        self.stream.set_len(len)
    }
}
