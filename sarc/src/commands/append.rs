use crate::cli::AppendArgs;
use crate::commands::open_for_update;
use crate::error::{Error, Result};
use crate::util::{collect_inputs, copy_into, create_progress_bar, finish};

pub fn run(args: AppendArgs) -> Result<()> {
    let inputs = collect_inputs(&args.files)?;
    let archive = open_for_update(&args.archive, args.alignment)?;

    // Nothing is added unless every name is new.
    for input in &inputs {
        let existing = archive
            .get_entry(&input.name)
            .map_err(|source| Error::ReadEntry {
                name: input.name.clone(),
                source,
            })?;
        if existing.is_some() {
            return Err(Error::EntryExists {
                name: input.name.clone(),
            });
        }
    }

    let pb = create_progress_bar(inputs.len() as u64, "Appending", args.quiet);
    for input in &inputs {
        let entry = archive
            .create_entry(&input.name)
            .map_err(|source| Error::AddFile {
                path: input.path.clone(),
                source,
            })?;
        copy_into(&entry, input)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    finish(archive, &args.archive)?;

    if !args.quiet {
        println!("Appended {} file(s).", inputs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::commands::test_support::{contents, make_archive, write_files};

    #[test]
    fn appends_after_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = make_archive(dir.path(), &[("one", b"1")]);
        let files = write_files(dir.path(), &[("two", b"22"), ("three", b"333")]);

        run(AppendArgs {
            archive: archive.clone(),
            alignment: 8,
            quiet: true,
            files,
        })
        .unwrap();

        let names: Vec<_> = contents(&archive).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[test]
    fn existing_name_aborts_without_changes() {
        let dir = tempfile::tempdir().unwrap();
        let archive = make_archive(dir.path(), &[("one", b"1")]);
        let before = fs::read(&archive).unwrap();
        let files = write_files(dir.path(), &[("new", b"n"), ("one", b"again")]);

        let err = run(AppendArgs {
            archive: archive.clone(),
            alignment: 8,
            quiet: true,
            files,
        })
        .unwrap_err();
        assert!(matches!(err, Error::EntryExists { ref name } if name == "one"));
        assert_eq!(fs::read(&archive).unwrap(), before);
    }

    #[test]
    fn archive_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), &[("a", b"1")]);
        let archive = dir.path().join("missing.sarc");

        let err = run(AppendArgs {
            archive: archive.clone(),
            alignment: 8,
            quiet: true,
            files,
        })
        .unwrap_err();
        assert!(matches!(err, Error::OpenArchive { .. }));
        assert!(!archive.exists());
    }
}
