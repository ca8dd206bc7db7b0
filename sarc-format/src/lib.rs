//! Herein lies the brains of the `sarc` archive format.
//!
//! Use [Archive][Archive] to create, read and modify archives through any
//! [Storage][Storage], and [ArchiveView][ArchiveView] to read an archive that is
//! already in memory without copying.

mod alignment;
pub mod archive;
mod codec;
mod error;
pub mod header;
pub mod name;
pub mod parse;
pub mod storage;
pub mod view;

pub use self::alignment::Alignment;
pub use self::archive::{Archive, ArchiveEntry, ArchiveOptions, EntryStream, Mode};
pub use self::error::{CorruptionError, Error, ErrorKind, Result};
pub use self::header::VERSION;
pub use self::name::{EntryName, IntoEntryNameError};
pub use self::parse::{HeaderData, ParseError, ParseResult};
pub use self::storage::{ReadOnly, Storage, WritableStorage};
pub use self::view::{ArchiveView, EntryRef};
