use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use humansize::BINARY;
use indicatif::{ProgressBar, ProgressStyle};
use sarc_format::{Archive, ArchiveEntry, EntryName};

use crate::error::{Error, Result};

/// A file given on the command line, paired with the entry name it maps to.
#[derive(Debug, Clone)]
pub struct Input {
    pub path: PathBuf,
    pub name: String,
}

/// Checks that every path is an existing regular file whose file name is a
/// valid, unique entry name. Order is preserved.
pub fn collect_inputs(files: &[PathBuf]) -> Result<Vec<Input>> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(files.len());

    for path in files {
        let meta = std::fs::metadata(path).map_err(|source| Error::OpenFile {
            path: path.clone(),
            source,
        })?;
        if !meta.is_file() {
            return Err(Error::NotAFile { path: path.clone() });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = EntryName::new(&file_name).map_err(|source| Error::InvalidName {
            path: path.clone(),
            source,
        })?;

        if !seen.insert(name.as_str().to_string()) {
            return Err(Error::DuplicateInput {
                name: name.to_string(),
                path: path.clone(),
            });
        }

        inputs.push(Input {
            path: path.clone(),
            name: name.to_string(),
        });
    }

    Ok(inputs)
}

/// Replaces the body of `entry` with the contents of the input file.
pub fn copy_into(entry: &ArchiveEntry, input: &Input) -> Result<u64> {
    let add_err = |source: sarc_format::Error| Error::AddFile {
        path: input.path.clone(),
        source,
    };

    let mut file = File::open(&input.path).map_err(|source| Error::OpenFile {
        path: input.path.clone(),
        source,
    })?;

    let mut stream = entry.open().map_err(add_err)?;
    stream.set_len(0).map_err(add_err)?;
    stream
        .seek(SeekFrom::Start(0))
        .map_err(|e| add_err(e.into()))?;
    let copied = io::copy(&mut file, &mut stream).map_err(|e| add_err(e.into()))?;
    stream.close();

    tracing::debug!("copied {} bytes from {} into {}", copied, input.path.display(), input.name);
    Ok(copied)
}

/// Flushes and closes the archive, reporting failures against `path`.
pub fn finish(mut archive: Archive<File>, path: &Path) -> Result<()> {
    archive.close().map_err(|source| Error::FinishArchive {
        path: path.to_path_buf(),
        source,
    })
}

pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, BINARY)
}

/// Create a progress bar for file operations, hidden when `quiet` is set.
pub fn create_progress_bar(total: u64, message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(message.to_string());
    pb
}
