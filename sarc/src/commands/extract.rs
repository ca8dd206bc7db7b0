use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use sarc_format::ArchiveEntry;

use crate::cli::ExtractArgs;
use crate::commands::open_for_read;
use crate::error::{Error, Result};
use crate::util::create_progress_bar;

pub fn run(args: ExtractArgs) -> Result<()> {
    let archive = open_for_read(&args.archive)?;
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&output).map_err(|source| Error::CreateDirectory {
        path: output.clone(),
        source,
    })?;

    let entries = if args.names.is_empty() {
        archive.entries().map_err(|source| Error::OpenArchive {
            path: args.archive.clone(),
            source,
        })?
    } else {
        let mut found = Vec::with_capacity(args.names.len());
        for name in &args.names {
            let entry = archive.get_entry(name).map_err(|source| Error::ReadEntry {
                name: name.clone(),
                source,
            })?;
            match entry {
                Some(entry) => found.push(entry),
                None if !args.quiet => {
                    println!("Skip: {} (File doesn't exist in the Archive.)", name)
                }
                None => {}
            }
        }
        found
    };

    let pb = create_progress_bar(entries.len() as u64, "Extracting", args.quiet);
    let mut extracted = 0;
    for entry in &entries {
        if extract_entry(entry, &output, args.overwrite)? {
            extracted += 1;
        } else if !args.quiet {
            pb.println(format!(
                "Skip: {} (File exists in output directory.)",
                entry.name()
            ));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !args.quiet {
        println!("Extracted {} file(s).", extracted);
    }
    Ok(())
}

/// Writes one entry into `output`. Returns `false` when an existing file was
/// left alone.
fn extract_entry(entry: &ArchiveEntry, output: &Path, overwrite: bool) -> Result<bool> {
    let name = entry.name();
    if !name.is_path_safe() {
        return Err(Error::UnsafeEntryName {
            name: name.to_string(),
        });
    }

    let path = output.join(name.as_str());
    if path.is_dir() {
        return Err(Error::OutputIsDirectory { path });
    }
    if path.exists() && !overwrite {
        return Ok(false);
    }

    let read_err = |source| Error::ReadEntry {
        name: name.to_string(),
        source,
    };
    let mut stream = entry.open().map_err(read_err)?;
    stream
        .seek(SeekFrom::Start(0))
        .map_err(|e| read_err(e.into()))?;

    let write_err = |source| Error::WriteFile {
        path: path.clone(),
        source,
    };
    let mut file = File::create(&path).map_err(write_err)?;
    let copied = io::copy(&mut stream, &mut file).map_err(write_err)?;
    tracing::debug!("extracted {} ({} bytes) to {}", name, copied, path.display());

    Ok(true)
}
