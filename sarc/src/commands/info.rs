use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use sarc_format::{ArchiveView, ParseError};

use crate::cli::InfoArgs;
use crate::error::{Error, Result};
use crate::util::format_size;

pub fn run(args: InfoArgs) -> Result<()> {
    let file = File::open(&args.archive).map_err(|source| Error::OpenFile {
        path: args.archive.clone(),
        source,
    })?;
    let map_err = |source| Error::MapArchive {
        path: args.archive.clone(),
        source,
    };
    let len = file.metadata().map_err(map_err)?.len();

    // Safety: the file is opened read-only and the map lives only for this call.
    let mmap = if len == 0 {
        None
    } else {
        Some(unsafe { Mmap::map(&file) }.map_err(map_err)?)
    };
    let data: &[u8] = mmap.as_deref().unwrap_or(&[]);

    print!("{}", describe(&args.archive, data)?);
    Ok(())
}

fn describe(path: &Path, data: &[u8]) -> Result<String> {
    let parse_err = |source: ParseError| Error::ParseArchive {
        path: path.to_path_buf(),
        source,
    };
    let view = ArchiveView::parse(data).map_err(parse_err)?;

    let mut out = String::new();
    out.push_str(&format!("Archive:  {}\n", path.display()));
    out.push_str(&format!("Version:  {}\n", view.version()));
    out.push_str(&format!("Entries:  {}\n", view.len()));
    out.push_str(&format!(
        "Size:     {} ({} bytes)\n\n",
        format_size(data.len() as u64),
        data.len()
    ));
    out.push_str(&format!(
        "{:>10}  {:>10}  {:>7}  {:>10}  {:>6}  Name\n",
        "Header", "Body", "Padding", "Length", "Align"
    ));

    for entry in &view {
        let entry = entry.map_err(parse_err)?;
        out.push_str(&format!(
            "{:>#10x}  {:>#10x}  {:>7}  {:>10}  {:>6}  {}\n",
            entry.header_offset,
            entry.body_offset,
            entry.padding(),
            entry.data.len(),
            entry.alignment,
            entry.name
        ));
    }

    Ok(out)
}
