use std::cell::RefMut;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use super::entry::{EntryShared, EntryState};
use crate::error::{Error, Result};
use crate::name::EntryName;

/// Read, write and seek access to the body of one entry.
///
/// Returned by [`ArchiveEntry::open`](super::ArchiveEntry::open). The stream
/// keeps its own position; writing past the end extends the body and fills
/// any gap with zeros. Dropping the stream closes it.
///
/// Once the archive is closed the stream is cut off and every operation fails
/// with [`Error::StreamClosed`].
pub struct EntryStream {
    entry: Rc<EntryShared>,
    token: u64,
    position: u64,
    writable: bool,
    closed: bool,
}

impl EntryStream {
    pub(crate) fn new(
        entry: Rc<EntryShared>,
        token: u64,
        position: u64,
        writable: bool,
    ) -> EntryStream {
        EntryStream {
            entry,
            token,
            position,
            writable,
            closed: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &EntryName {
        &self.entry.name
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn len(&self) -> Result<u64> {
        let state = self.entry.state.borrow();
        Ok(self.body(&state)?.len() as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Truncates or zero-extends the body. A position past the new end is
    /// moved to the end.
    pub fn set_len(&mut self, len: u64) -> Result<()> {
        let len = usize::try_from(len).map_err(|_| Error::too_large("entry length"))?;
        let mut body = self.body_mut()?;
        body.resize(len, 0);
        drop(body);

        self.position = self.position.min(len as u64);
        Ok(())
    }

    /// Closes the stream so the entry can be opened again.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Ok(mut state) = self.entry.state.try_borrow_mut() {
            if state.open_stream == Some(self.token) {
                state.open_stream = None;
                tracing::trace!("closed stream of {:?}", self.entry.name);
            }
        }
    }

    fn body<'s>(&self, state: &'s EntryState) -> Result<&'s Vec<u8>> {
        if self.closed || state.open_stream != Some(self.token) {
            return Err(Error::StreamClosed);
        }
        state.body.as_ref().ok_or(Error::StreamClosed)
    }

    fn body_mut(&mut self) -> Result<RefMut<'_, Vec<u8>>> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }

        let state = self.entry.state.borrow_mut();
        self.body(&state)?;
        Ok(RefMut::map(state, |s| {
            s.body.get_or_insert_with(Vec::new)
        }))
    }
}

impl Read for EntryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let state = self.entry.state.borrow();
        let body = self.body(&state)?;

        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(body.len());
        let n = buf.len().min(body.len() - start);
        buf[..n].copy_from_slice(&body[start..start + n]);
        drop(state);

        self.position += n as u64;
        Ok(n)
    }
}

impl Write for EntryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let start = usize::try_from(self.position).map_err(|_| Error::too_large("entry length"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| Error::too_large("entry length"))?;

        let mut body = self.body_mut()?;
        if body.len() < end {
            body.resize(end, 0);
        }
        body[start..end].copy_from_slice(buf);
        drop(body);

        self.position = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let state = self.entry.state.borrow();
        self.body(&state)?;
        Ok(())
    }
}

impl Seek for EntryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.len()?;
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl Drop for EntryStream {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for EntryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStream")
            .field("name", &self.entry.name)
            .field("position", &self.position)
            .field("writable", &self.writable)
            .field("closed", &self.closed)
            .finish()
    }
}
