pub mod append;
pub mod create;
pub mod delete;
pub mod extract;
pub mod info;
pub mod list;
pub mod update;

pub use append::run as append;
pub use create::run as create;
pub use delete::run as delete;
pub use extract::run as extract;
pub use info::run as info;
pub use list::run as list;
pub use update::run as update;

use std::fs::{File, OpenOptions};
use std::path::Path;

use sarc_format::{Archive, ArchiveOptions, Mode};

use crate::error::{Error, Result};

/// Opens an existing archive for modification. `alignment` applies to
/// entries created through the returned archive.
pub(crate) fn open_for_update(path: &Path, alignment: u32) -> Result<Archive<File>> {
    let open_err = |source: sarc_format::Error| Error::OpenArchive {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| open_err(e.into()))?;
    Archive::with_options(file, ArchiveOptions::new(Mode::Update).with_alignment(alignment))
        .map_err(open_err)
}

pub(crate) fn open_for_read(path: &Path) -> Result<Archive<File>> {
    Archive::open_file(path, Mode::Read).map_err(|source| Error::OpenArchive {
        path: path.to_path_buf(),
        source,
    })
}
