use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;

use crate::alignment::Alignment;
use crate::codec::{Reader, Writer};
use crate::error::{CorruptionError, Error, Result};
use crate::header::{ArchiveHeader, EntryHeader};
use crate::name::{EntryName, IntoEntryNameError};
use crate::parse::{self, ParseError};
use crate::storage::{stream_len, Storage};

mod entry;
mod stream;

pub use self::entry::ArchiveEntry;
pub use self::stream::EntryStream;

use self::entry::EntryShared;

/// How an archive treats its backing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Start a new archive in an empty, writable stream.
    Create,
    /// Inspect an existing archive. Nothing is ever written back.
    Read,
    /// Modify an existing archive in place.
    Update,
}

impl Mode {
    #[inline]
    pub fn is_writable(self) -> bool {
        !matches!(self, Mode::Read)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Create => "Create",
            Mode::Read => "Read",
            Mode::Update => "Update",
        })
    }
}

/// Options for opening an [`Archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub mode: Mode,
    /// Alignment given to entries created through [`Archive::create_entry`].
    /// Must be a power of two.
    pub alignment: u32,
    /// Keep the backing stream alive after the archive is closed, so it can be
    /// taken back with [`Archive::into_inner`].
    pub leave_open: bool,
}

impl ArchiveOptions {
    pub fn new(mode: Mode) -> Self {
        ArchiveOptions {
            mode,
            alignment: Alignment::DEFAULT.get(),
            leave_open: false,
        }
    }

    pub fn with_alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_leave_open(mut self, leave_open: bool) -> Self {
        self.leave_open = leave_open;
        self
    }
}

/// Shared state between an archive and the entries it hands out.
pub(crate) struct Registry {
    pub(crate) mode: Mode,
    pub(crate) closed: bool,
    pub(crate) entries: Vec<Rc<EntryShared>>,
}

impl Registry {
    /// Excises `entry` from the sequence. Only called from [`ArchiveEntry::delete`].
    pub(crate) fn remove(&mut self, entry: &Rc<EntryShared>) {
        self.entries.retain(|e| !Rc::ptr_eq(e, entry));
    }
}

/// An archive of named, aligned byte blobs over a seekable backing stream.
///
/// Entry bodies are loaded into memory when the archive is opened. Changes
/// only touch memory until [`Archive::flush`] or [`Archive::close`] lays the
/// whole archive out again from the start of the stream.
///
/// Dropping an archive closes it. Errors during that implicit close can only
/// be logged, so call [`Archive::close`] when they matter.
pub struct Archive<S: Storage> {
    storage: Option<S>,
    registry: Rc<RefCell<Registry>>,
    default_alignment: Alignment,
    leave_open: bool,
}

impl<S: Storage> Archive<S> {
    pub fn new(storage: S, mode: Mode) -> Result<Self> {
        Self::with_options(storage, ArchiveOptions::new(mode))
    }

    /// Opens an existing archive, for update when the stream is writable and
    /// for reading otherwise.
    pub fn open(mut storage: S) -> Result<Self> {
        let mode = match storage.writable() {
            Some(_) => Mode::Update,
            None => Mode::Read,
        };
        Self::new(storage, mode)
    }

    pub fn with_options(mut storage: S, options: ArchiveOptions) -> Result<Self> {
        let default_alignment = Alignment::new(options.alignment)?;
        let mode = options.mode;

        if mode.is_writable() && storage.writable().is_none() {
            return Err(Error::NotWritable(mode));
        }

        let registry = Rc::new(RefCell::new(Registry {
            mode,
            closed: false,
            entries: Vec::new(),
        }));

        match mode {
            Mode::Create => {
                let len = stream_len(&mut storage)?;
                if len != 0 {
                    return Err(Error::StreamNotEmpty(len));
                }
            }
            Mode::Read | Mode::Update => {
                let entries =
                    read_entries(&mut storage, &registry, mode).map_err(Error::Corrupted)?;
                registry.borrow_mut().entries = entries;
            }
        }

        tracing::debug!(
            %mode,
            entries = registry.borrow().entries.len(),
            alignment = default_alignment.get(),
            "opened archive"
        );

        Ok(Archive {
            storage: Some(storage),
            registry,
            default_alignment,
            leave_open: options.leave_open,
        })
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.registry.borrow().mode
    }

    #[inline]
    pub fn default_alignment(&self) -> Alignment {
        self.default_alignment
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.registry.borrow().closed
    }

    /// All entries in on-disk order.
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        let registry = live(&self.registry)?;
        Ok(registry
            .entries
            .iter()
            .map(|e| ArchiveEntry::from_shared(Rc::clone(e)))
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(live(&self.registry)?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Looks up an entry by exact, case-sensitive name.
    pub fn get_entry(&self, name: &str) -> Result<Option<ArchiveEntry>> {
        let registry = live(&self.registry)?;
        if name.is_empty() {
            return Err(Error::InvalidName(IntoEntryNameError::Empty));
        }

        let found = registry
            .entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| ArchiveEntry::from_shared(Rc::clone(e)));
        tracing::trace!("get_entry {:?}: found={}", name, found.is_some());
        Ok(found)
    }

    /// Appends a new, empty entry using the default alignment.
    pub fn create_entry(&self, name: &str) -> Result<ArchiveEntry> {
        let mut registry = live_mut(&self.registry)?;
        if registry.mode == Mode::Read {
            return Err(Error::ReadOnly);
        }

        let name = EntryName::new(name)?;
        if registry.entries.iter().any(|e| e.name == name) {
            return Err(Error::DuplicateEntry(name.0));
        }

        tracing::trace!("create_entry {:?} at index {}", name, registry.entries.len());
        let shared = Rc::new(EntryShared::new(
            name,
            self.default_alignment,
            Vec::new(),
            Rc::downgrade(&self.registry),
            false,
        ));
        registry.entries.push(Rc::clone(&shared));
        Ok(ArchiveEntry::from_shared(shared))
    }

    /// Rewrites the whole archive into the backing stream. Does nothing in
    /// [`Mode::Read`].
    ///
    /// A failure part way leaves the stream inconsistent; nothing is rolled back.
    pub fn flush(&mut self) -> Result<()> {
        let registry = live(&self.registry)?;
        if registry.mode == Mode::Read {
            return Ok(());
        }

        let storage = self.storage.as_mut().ok_or(Error::ArchiveClosed)?;
        let old_len = stream_len(storage)?;
        let out = storage
            .writable()
            .ok_or(Error::NotWritable(registry.mode))?;
        let mut writer = Writer::new(out)?;

        let count =
            u32::try_from(registry.entries.len()).map_err(|_| Error::too_large("entry count"))?;
        writer.seek(0)?;
        ArchiveHeader::new(count).write(&mut writer)?;

        let mut prev_end = ArchiveHeader::table_end(u64::from(count));

        for (index, entry) in registry.entries.iter().enumerate() {
            let state = entry.state.borrow();
            let body = state.body.as_deref().unwrap_or_default();
            let alignment = state.alignment;

            let header_addr = prev_end;
            let length = u32::try_from(body.len()).map_err(|_| Error::too_large("entry length"))?;

            writer.seek(ArchiveHeader::slot_offset(index as u64))?;
            writer.write_u32(
                u32::try_from(header_addr).map_err(|_| Error::too_large("entry header offset"))?,
            )?;

            writer.seek(header_addr)?;
            writer.write_u32(u32::MAX)?;
            writer.write_u32(length)?;
            writer.write_u32(alignment.get())?;
            writer.write_cstr(entry.name.as_str())?;

            let raw_body_start = writer.position();
            let body_start = alignment.align_up(raw_body_start);

            writer.seek(header_addr)?;
            writer.write_u32(
                u32::try_from(body_start - header_addr)
                    .map_err(|_| Error::too_large("entry body offset"))?,
            )?;

            writer.seek(raw_body_start)?;
            writer.write_zeros(body_start - raw_body_start)?;
            writer.write_bytes(body)?;

            prev_end = writer.position();

            tracing::debug!(
                index,
                name = %entry.name,
                header = format_args!("{:#x}", header_addr),
                body = format_args!("{:#x}", body_start),
                length,
                alignment = alignment.get(),
                "wrote entry"
            );
        }

        if prev_end < old_len {
            tracing::debug!(
                from = format_args!("{:#x}", old_len),
                to = format_args!("{:#x}", prev_end),
                "truncating archive"
            );
            writer.set_len(prev_end)?;
        }
        writer.flush()?;

        tracing::debug!(entries = count, len = prev_end, "flushed archive");
        Ok(())
    }

    /// Flushes (unless in [`Mode::Read`]), releases the backing stream and
    /// detaches every entry. Closing twice is a no-op.
    ///
    /// The archive is closed afterwards even if the flush fails; the flush
    /// error is returned.
    pub fn close(&mut self) -> Result<()> {
        self.close_inner(self.leave_open)
    }

    /// Closes the archive and returns the backing stream.
    pub fn into_inner(mut self) -> Result<S> {
        self.close_inner(true)?;
        self.storage.take().ok_or(Error::ArchiveClosed)
    }

    fn close_inner(&mut self, retain_storage: bool) -> Result<()> {
        if self.registry.borrow().closed {
            return Ok(());
        }

        let flushed = self.flush();

        if !retain_storage {
            self.storage = None;
        }

        let entries = {
            let mut registry = self.registry.borrow_mut();
            registry.closed = true;
            std::mem::take(&mut registry.entries)
        };
        for entry in &entries {
            entry.owner_disposing();
        }

        tracing::debug!(entries = entries.len(), ok = flushed.is_ok(), "closed archive");
        flushed
    }
}

impl Archive<File> {
    /// Creates a new archive file. Fails if `path` already exists.
    pub fn create_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Self::new(file, Mode::Create)
    }

    pub fn open_file<P: AsRef<Path>>(path: P, mode: Mode) -> Result<Self> {
        match mode {
            Mode::Create => Self::create_file(path),
            Mode::Update => {
                let file = OpenOptions::new().read(true).write(true).open(path)?;
                Self::new(file, mode)
            }
            Mode::Read => Self::new(File::open(path)?, mode),
        }
    }
}

impl<S: Storage> Drop for Archive<S> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(%error, "Archive dropped and closing it failed. Changes may be lost.");
        }
    }
}

impl<S: Storage> fmt::Debug for Archive<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("Archive")
            .field("mode", &registry.mode)
            .field("closed", &registry.closed)
            .field("entries", &registry.entries.len())
            .field("default_alignment", &self.default_alignment)
            .finish()
    }
}

fn live(registry: &RefCell<Registry>) -> Result<Ref<'_, Registry>> {
    let registry = registry.borrow();
    if registry.closed {
        return Err(Error::ArchiveClosed);
    }
    Ok(registry)
}

fn live_mut(registry: &RefCell<Registry>) -> Result<RefMut<'_, Registry>> {
    let registry = registry.borrow_mut();
    if registry.closed {
        return Err(Error::ArchiveClosed);
    }
    Ok(registry)
}

/// Walks the header, offset table and every entry.
fn read_entries<S: Read + Seek + ?Sized>(
    storage: &mut S,
    registry: &Rc<RefCell<Registry>>,
    mode: Mode,
) -> Result<Vec<Rc<EntryShared>>, CorruptionError> {
    let mut reader = Reader::new(storage).map_err(CorruptionError::Header)?;

    if reader.len() < ArchiveHeader::SIZE {
        return Err(CorruptionError::TooShort(reader.len()));
    }

    let header_bytes = reader
        .read_bytes(0, ArchiveHeader::SIZE)
        .map_err(CorruptionError::Header)?;
    let (header, _) = parse::parse_header(&header_bytes).map_err(|e| match e {
        ParseError::BadMagic(magic) => CorruptionError::BadMagic(magic),
        ParseError::UnsupportedVersion(v) => CorruptionError::UnsupportedVersion(v),
        other => CorruptionError::Header(other.into()),
    })?;

    let count = header.entry_count;
    if ArchiveHeader::table_end(u64::from(count)) > reader.len() {
        return Err(CorruptionError::Truncated {
            entry_count: count,
            len: reader.len(),
        });
    }

    tracing::debug!(
        version = header.version,
        entries = count,
        len = reader.len(),
        "read archive header"
    );

    let read_only = mode == Mode::Read;
    let mut seen = HashSet::with_capacity(count as usize);
    let mut entries = Vec::with_capacity(count as usize);

    for index in 0..count {
        let (header, body) = read_entry(&mut reader, index)
            .map_err(|source| CorruptionError::MalformedEntry { index, source })?;

        let alignment = Alignment::new(header.alignment).map_err(|_| {
            CorruptionError::BadAlignment {
                index,
                alignment: header.alignment,
            }
        })?;
        if !seen.insert(header.name.clone()) {
            return Err(CorruptionError::DuplicateName(header.name));
        }

        entries.push(Rc::new(EntryShared::new(
            EntryName::from_disk(header.name),
            alignment,
            body,
            Rc::downgrade(registry),
            read_only,
        )));
    }

    Ok(entries)
}

fn read_entry<S: Read + Seek + ?Sized>(
    reader: &mut Reader<'_, S>,
    index: u32,
) -> std::io::Result<(EntryHeader<String>, Vec<u8>)> {
    let header_addr = u64::from(reader.read_u32(ArchiveHeader::slot_offset(u64::from(index)))?);
    let body_offset = reader.read_u32(header_addr)?;
    let length = reader.read_u32(header_addr + 4)?;
    let alignment = reader.read_u32(header_addr + 8)?;
    let name = reader.read_cstr(header_addr + EntryHeader::<()>::FIXED_SIZE)?;

    let body_addr = header_addr + u64::from(body_offset);
    let body = reader.read_bytes(body_addr, u64::from(length))?;

    tracing::debug!(
        index,
        %name,
        header = format_args!("{:#x}", header_addr),
        body = format_args!("{:#x}", body_addr),
        length,
        alignment,
        "read entry"
    );

    Ok((
        EntryHeader {
            body_offset,
            length,
            alignment,
            name,
        },
        body,
    ))
}
