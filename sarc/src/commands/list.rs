use serde::Serialize;

use crate::cli::ListArgs;
use crate::commands::open_for_read;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct JsonEntry {
    name: String,
    size: u64,
    alignment: u32,
}

pub fn run(args: ListArgs) -> Result<()> {
    let archive = open_for_read(&args.archive)?;
    let entries = archive.entries().map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let rows: Vec<JsonEntry> = entries
        .iter()
        .map(|entry| JsonEntry {
            name: entry.name().to_string(),
            size: entry.len(),
            alignment: entry.alignment().get(),
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).map_err(Error::Json)?;
        println!("{}", json);
        return Ok(());
    }

    println!("{:<10} {:<5} Name", "Size", "Align");
    for row in &rows {
        println!("{:>10} {:>5} {}", row.size, row.alignment, row.name);
    }
    println!("{} file(s) in {}.", rows.len(), args.archive.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::make_archive;

    #[test]
    fn lists_valid_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = make_archive(dir.path(), &[("one", b"1")]);

        run(ListArgs {
            archive: archive.clone(),
            json: false,
        })
        .unwrap();
        run(ListArgs {
            archive,
            json: true,
        })
        .unwrap();
    }

    #[test]
    fn corrupt_archive_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.sarc");
        std::fs::write(&archive, b"not an archive at all").unwrap();

        let err = run(ListArgs {
            archive,
            json: false,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::OpenArchive {
                source: sarc_format::Error::Corrupted(_),
                ..
            }
        ));
    }

    #[test]
    fn json_shape() {
        let row = JsonEntry {
            name: "a".into(),
            size: 3,
            alignment: 8,
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({ "name": "a", "size": 3, "alignment": 8 })
        );
    }
}
