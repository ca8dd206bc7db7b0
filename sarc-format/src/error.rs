use std::io;

use crate::archive::Mode;
use crate::name::IntoEntryNameError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed a value the archive cannot accept.
    InvalidArgument,
    /// The operation is not allowed in the current state of the archive or entry.
    InvalidState,
    /// The backing stream does not hold a well-formed archive.
    CorruptedArchive,
    /// The backing stream failed.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid entry name")]
    InvalidName(#[source] IntoEntryNameError),

    #[error("Alignment must be a power of two, got {0}")]
    InvalidAlignment(u32),

    #[error("{0} mode requires a writable stream")]
    NotWritable(Mode),

    #[error("Create mode requires an empty stream, found {0} bytes")]
    StreamNotEmpty(u64),

    #[error("Archive was opened read-only")]
    ReadOnly,

    #[error("Entry has been deleted")]
    EntryDeleted,

    #[error("Archive has been closed")]
    ArchiveClosed,

    #[error("Entry '{0}' already has an open stream")]
    AlreadyOpen(String),

    #[error("Entry '{0}' cannot be deleted while a stream is open")]
    StreamOpen(String),

    #[error("Entry '{0}' already exists")]
    DuplicateEntry(String),

    #[error("Entry stream has been closed")]
    StreamClosed,

    #[error("Archive is corrupted")]
    Corrupted(#[source] CorruptionError),

    #[error("I/O error")]
    Io(#[source] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CorruptionError {
    #[error("Stream is {0} bytes, too short for an archive header")]
    TooShort(u64),

    #[error("Archive header could not be read")]
    Header(#[source] io::Error),

    #[error("Offset table for {entry_count} entries does not fit in {len} bytes")]
    Truncated { entry_count: u32, len: u64 },

    #[error("Invalid magic bytes {0:02x?}. Is this a sarc archive?")]
    BadMagic([u8; 4]),

    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("Entry {index} has alignment {alignment}, which is not a power of two")]
    BadAlignment { index: u32, alignment: u32 },

    #[error("Entry name '{0}' appears more than once")]
    DuplicateName(String),

    #[error("Entry {index} could not be read")]
    MalformedEntry {
        index: u32,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidName(_)
            | Error::InvalidAlignment(_)
            | Error::NotWritable(_)
            | Error::StreamNotEmpty(_) => ErrorKind::InvalidArgument,
            Error::ReadOnly
            | Error::EntryDeleted
            | Error::ArchiveClosed
            | Error::AlreadyOpen(_)
            | Error::StreamOpen(_)
            | Error::DuplicateEntry(_)
            | Error::StreamClosed => ErrorKind::InvalidState,
            Error::Corrupted(_) => ErrorKind::CorruptedArchive,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn too_large(what: &'static str) -> Error {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not fit in a 32-bit field", what),
        ))
    }
}

impl From<IntoEntryNameError> for Error {
    fn from(err: IntoEntryNameError) -> Self {
        Error::InvalidName(err)
    }
}

impl From<CorruptionError> for Error {
    fn from(err: CorruptionError) -> Self {
        Error::Corrupted(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Entry streams surface archive errors through io::Error; take them back out.
        if err.get_ref().map_or(false, |inner| inner.is::<Error>()) {
            let kind = err.kind();
            return match err.into_inner().map(|inner| inner.downcast::<Error>()) {
                Some(Ok(inner)) => *inner,
                _ => Error::Io(io::Error::from(kind)),
            };
        }
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::Io(inner) => return inner,
            Error::ReadOnly => io::ErrorKind::PermissionDenied,
            Error::Corrupted(_) => io::ErrorKind::InvalidData,
            ref other if other.kind() == ErrorKind::InvalidArgument => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kinds() {
        assert_eq!(Error::InvalidAlignment(3).kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::NotWritable(Mode::Update).kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::ReadOnly.kind(), ErrorKind::InvalidState);
        assert_eq!(Error::AlreadyOpen("a".into()).kind(), ErrorKind::InvalidState);
        assert_eq!(
            Error::from(CorruptionError::TooShort(3)).kind(),
            ErrorKind::CorruptedArchive
        );
        assert_eq!(
            Error::from(io::Error::from(io::ErrorKind::UnexpectedEof)).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn io_round_trip_is_lossless() {
        let err: io::Error = Error::DuplicateEntry("x".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        match Error::from(err) {
            Error::DuplicateEntry(name) => assert_eq!(name, "x"),
            other => panic!("unexpected {:?}", other),
        }

        let err: io::Error = Error::ReadOnly.into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(matches!(Error::from(err), Error::ReadOnly));

        let err: io::Error = Error::InvalidAlignment(6).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn plain_io_errors_stay_io() {
        let err: io::Error = Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(err.get_ref().is_none());
    }

    #[test]
    fn corruption_keeps_cause() {
        let err = Error::from(CorruptionError::MalformedEntry {
            index: 4,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        });
        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "Entry 4 could not be read");
        let root = cause.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(root.kind(), io::ErrorKind::UnexpectedEof);
    }
}
