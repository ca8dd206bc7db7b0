//! Backing stream capabilities.
//!
//! Reading and seeking are required of every backing stream and are expressed
//! through `Read + Seek`. Write access is discovered at runtime through
//! [`Storage::writable`], because it depends on how a stream was opened rather
//! than on its type alone.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Write};

/// A readable, seekable stream that may additionally be writable.
pub trait Storage: Read + Seek {
    /// Returns the write half of this stream, or `None` if it is read-only.
    fn writable(&mut self) -> Option<&mut dyn WritableStorage>;
}

/// A stream the archive can rewrite and shrink.
pub trait WritableStorage: Write + Seek {
    fn set_len(&mut self, len: u64) -> std::io::Result<()>;
}

/// Wraps a stream so the archive only ever reads from it.
///
/// Useful for handing a [`File`] opened read-only to an archive, which would
/// otherwise report itself as writable.
#[derive(Debug)]
pub struct ReadOnly<S>(pub S);

impl<S> ReadOnly<S> {
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S: Read> Read for ReadOnly<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl<S: Seek> Seek for ReadOnly<S> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.0.seek(pos)
    }
}

impl<S: Read + Seek> Storage for ReadOnly<S> {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        None
    }
}

impl Storage for File {
    /// A file opened without write access fails a zero-length write.
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        match Write::write(self, &[]) {
            Ok(_) => Some(self),
            Err(_) => None,
        }
    }
}

impl WritableStorage for File {
    fn set_len(&mut self, len: u64) -> std::io::Result<()> {
        File::set_len(self, len)
    }
}

impl Storage for Cursor<Vec<u8>> {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        Some(self)
    }
}

impl WritableStorage for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> std::io::Result<()> {
        self.get_mut().resize(buffer_len(len)?, 0);
        Ok(())
    }
}

impl Storage for Cursor<&mut Vec<u8>> {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        Some(self)
    }
}

impl WritableStorage for Cursor<&mut Vec<u8>> {
    fn set_len(&mut self, len: u64) -> std::io::Result<()> {
        self.get_mut().resize(buffer_len(len)?, 0);
        Ok(())
    }
}

impl Storage for Cursor<&[u8]> {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        None
    }
}

impl<R: Read + Seek> Storage for BufReader<R> {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        None
    }
}

impl<T: Storage + ?Sized> Storage for &mut T {
    fn writable(&mut self) -> Option<&mut dyn WritableStorage> {
        (**self).writable()
    }
}

fn buffer_len(len: u64) -> std::io::Result<usize> {
    usize::try_from(len).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "length does not fit in memory",
        )
    })
}

/// Total length of a stream, leaving its position unchanged.
pub(crate) fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> std::io::Result<u64> {
    let pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if pos != len {
        stream.seek(SeekFrom::Start(pos))?;
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_capabilities() {
        let mut owned = Cursor::new(vec![1u8, 2, 3]);
        assert!(owned.writable().is_some());

        let data = [1u8, 2, 3];
        let mut borrowed = Cursor::new(&data[..]);
        assert!(borrowed.writable().is_none());

        let mut wrapped = ReadOnly(Cursor::new(vec![0u8; 4]));
        assert!(wrapped.writable().is_none());

        let mut by_ref = &mut owned;
        assert!(Storage::writable(&mut by_ref).is_some());
    }

    #[test]
    fn cursor_set_len_truncates_and_extends() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        WritableStorage::set_len(&mut cursor, 2).unwrap();
        assert_eq!(cursor.get_ref(), &[1, 2]);
        WritableStorage::set_len(&mut cursor, 3).unwrap();
        assert_eq!(cursor.get_ref(), &[1, 2, 0]);
    }

    #[test]
    fn stream_len_keeps_position() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        cursor.seek(SeekFrom::Start(4)).unwrap();
        assert_eq!(stream_len(&mut cursor).unwrap(), 10);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn read_only_file_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, b"abc").unwrap();

        let mut file = File::open(&path).unwrap();
        assert!(file.writable().is_none());

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        assert!(file.writable().is_some());
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn file_is_writable() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"abcdef").unwrap();
        let writable = file.writable().unwrap();
        writable.set_len(2).unwrap();
        assert_eq!(stream_len(&mut file).unwrap(), 2);
    }
}
