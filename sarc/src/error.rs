use std::path::PathBuf;

use miette::Diagnostic;
use sarc_format::{IntoEntryNameError, ParseError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    #[diagnostic(help("Is this a valid .sarc file?"))]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Cannot create archive `{}`", .path.display())]
    CreateArchive {
        path: PathBuf,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Archive already exists: `{}`", .path.display())]
    #[diagnostic(help("Remove it first, or use `sarc append` or `sarc update`"))]
    ArchiveExists { path: PathBuf },

    #[error("Not a regular file: `{}`", .path.display())]
    NotAFile { path: PathBuf },

    #[error("Cannot open file `{}`", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot use `{}` as an entry name", .path.display())]
    InvalidName {
        path: PathBuf,
        #[source]
        source: IntoEntryNameError,
    },

    #[error("More than one input is named `{name}`")]
    #[diagnostic(help("Entries are named after the file name only; rename one of the inputs"))]
    DuplicateInput { name: String, path: PathBuf },

    #[error("Entry `{name}` already exists in the archive")]
    #[diagnostic(help("Use `sarc update` to replace it"))]
    EntryExists { name: String },

    #[error("Cannot add file to archive `{}`", .path.display())]
    AddFile {
        path: PathBuf,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Cannot delete entry `{name}`")]
    DeleteEntry {
        name: String,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Cannot read entry `{name}`")]
    ReadEntry {
        name: String,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Cannot create directory `{}`", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output path is a directory: `{}`", .path.display())]
    OutputIsDirectory { path: PathBuf },

    #[error("Refusing to extract entry `{name}`")]
    #[diagnostic(help("The name is not a single file name and would escape the output directory"))]
    UnsafeEntryName { name: String },

    #[error("Cannot write file `{}`", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot finish archive `{}`", .path.display())]
    FinishArchive {
        path: PathBuf,
        #[source]
        source: sarc_format::Error,
    },

    #[error("Cannot map archive `{}`", .path.display())]
    MapArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse archive `{}`", .path.display())]
    #[diagnostic(help("Is this a valid .sarc file?"))]
    ParseArchive {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to serialize JSON")]
    Json(#[source] serde_json::Error),
}
