use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::stream::EntryStream;
use super::{Mode, Registry};
use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::name::EntryName;

/// Back-reference from an entry to the archive that holds it.
pub(crate) enum Owner {
    Attached(Weak<RefCell<Registry>>),
    /// Removed through [`ArchiveEntry::delete`].
    Deleted,
    /// The archive was closed while the entry was still attached.
    Disposed,
}

pub(crate) struct EntryState {
    pub(crate) alignment: Alignment,
    /// `None` once the entry is deleted or its archive closed.
    pub(crate) body: Option<Vec<u8>>,
    /// Body length at the moment the body was released.
    pub(crate) last_len: u64,
    pub(crate) owner: Owner,
    pub(crate) read_only: bool,
    /// Token of the stream currently allowed to touch `body`.
    pub(crate) open_stream: Option<u64>,
    next_token: u64,
}

impl EntryState {
    fn release_body(&mut self) {
        if let Some(body) = self.body.take() {
            self.last_len = body.len() as u64;
        }
    }
}

pub(crate) struct EntryShared {
    pub(crate) name: EntryName,
    pub(crate) state: RefCell<EntryState>,
}

impl EntryShared {
    pub(crate) fn new(
        name: EntryName,
        alignment: Alignment,
        body: Vec<u8>,
        owner: Weak<RefCell<Registry>>,
        read_only: bool,
    ) -> EntryShared {
        EntryShared {
            name,
            state: RefCell::new(EntryState {
                alignment,
                last_len: body.len() as u64,
                body: Some(body),
                owner: Owner::Attached(owner),
                read_only,
                open_stream: None,
                next_token: 0,
            }),
        }
    }

    /// Called by the archive while it closes. Any open stream is cut off.
    pub(crate) fn owner_disposing(&self) {
        let mut state = self.state.borrow_mut();
        if state.open_stream.take().is_some() {
            tracing::trace!("force-closing stream of {:?}", self.name);
        }
        state.release_body();
        state.owner = Owner::Disposed;
    }
}

/// Handle to one entry of an [`Archive`](super::Archive).
///
/// Handles are cheap to clone and all clones refer to the same entry. A handle
/// stays valid after its entry is deleted or its archive closed, but only the
/// metadata accessors keep working.
#[derive(Clone)]
pub struct ArchiveEntry {
    shared: Rc<EntryShared>,
}

impl ArchiveEntry {
    pub(crate) fn from_shared(shared: Rc<EntryShared>) -> ArchiveEntry {
        ArchiveEntry { shared }
    }

    #[inline]
    pub fn name(&self) -> &EntryName {
        &self.shared.name
    }

    pub fn alignment(&self) -> Alignment {
        self.shared.state.borrow().alignment
    }

    /// Changes the alignment used the next time the archive is written. A value
    /// that is not a power of two is rejected and the old alignment kept.
    pub fn set_alignment(&self, alignment: u32) -> Result<()> {
        let alignment = Alignment::new(alignment)?;
        self.shared.state.borrow_mut().alignment = alignment;
        Ok(())
    }

    /// Body length in bytes. After the entry is deleted or its archive closed,
    /// the last known length.
    pub fn len(&self) -> u64 {
        let state = self.shared.state.borrow();
        match &state.body {
            Some(body) => body.len() as u64,
            None => state.last_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the entry was loaded by an archive opened in [`Mode::Read`].
    pub fn is_read_only(&self) -> bool {
        self.shared.state.borrow().read_only
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.shared.state.borrow().owner, Owner::Deleted)
    }

    /// Whether a stream returned by [`ArchiveEntry::open`] is still open.
    pub fn is_open(&self) -> bool {
        self.shared.state.borrow().open_stream.is_some()
    }

    /// Opens the body as a stream positioned at its end.
    ///
    /// Only one stream per entry can be open at a time. Dropping or closing
    /// the stream allows the next `open`.
    pub fn open(&self) -> Result<EntryStream> {
        let mut state = self.shared.state.borrow_mut();
        attached_owner(&state.owner)?;

        if state.open_stream.is_some() {
            return Err(Error::AlreadyOpen(self.shared.name.to_string()));
        }

        let token = state.next_token;
        state.next_token += 1;
        state.open_stream = Some(token);

        let position = state.body.as_ref().map_or(0, |b| b.len() as u64);
        let writable = !state.read_only;
        tracing::trace!("open {:?} (token {}, writable={})", self.shared.name, token, writable);

        Ok(EntryStream::new(
            Rc::clone(&self.shared),
            token,
            position,
            writable,
        ))
    }

    /// Removes the entry from its archive and releases its body.
    ///
    /// Fails while a stream is open; the stream has to be closed first.
    pub fn delete(&self) -> Result<()> {
        let mut state = self.shared.state.borrow_mut();
        let registry = attached_owner(&state.owner)?;
        let mut registry = registry.borrow_mut();

        if state.open_stream.is_some() {
            return Err(Error::StreamOpen(self.shared.name.to_string()));
        }
        if registry.mode == Mode::Read {
            return Err(Error::ReadOnly);
        }

        registry.remove(&self.shared);
        state.owner = Owner::Deleted;
        state.release_body();

        tracing::trace!("deleted {:?}", self.shared.name);
        Ok(())
    }
}

/// The live archive an entry belongs to, or why there is none.
fn attached_owner(owner: &Owner) -> Result<Rc<RefCell<Registry>>> {
    match owner {
        Owner::Deleted => Err(Error::EntryDeleted),
        Owner::Disposed => Err(Error::ArchiveClosed),
        Owner::Attached(weak) => match weak.upgrade() {
            Some(registry) if !registry.borrow().closed => Ok(registry),
            _ => Err(Error::ArchiveClosed),
        },
    }
}

impl PartialEq for ArchiveEntry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for ArchiveEntry {}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        let status = match state.owner {
            Owner::Attached(_) => "attached",
            Owner::Deleted => "deleted",
            Owner::Disposed => "disposed",
        };
        f.debug_struct("ArchiveEntry")
            .field("name", &self.shared.name)
            .field("alignment", &state.alignment)
            .field(
                "len",
                &state.body.as_ref().map_or(state.last_len, |b| b.len() as u64),
            )
            .field("status", &status)
            .field("open", &state.open_stream.is_some())
            .finish()
    }
}
