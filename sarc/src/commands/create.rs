use std::fs::{self, File, OpenOptions};

use sarc_format::{Archive, ArchiveOptions, Mode};

use crate::cli::CreateArgs;
use crate::error::{Error, Result};
use crate::util::{collect_inputs, copy_into, create_progress_bar, finish, format_size, Input};

pub fn run(args: CreateArgs) -> Result<()> {
    let archive_path = &args.archive;

    if archive_path.exists() {
        return Err(Error::ArchiveExists {
            path: archive_path.clone(),
        });
    }

    let inputs = collect_inputs(&args.files)?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(archive_path)
        .map_err(|source| Error::CreateArchive {
            path: archive_path.clone(),
            source: source.into(),
        })?;

    let result = write_archive(file, &args, &inputs);
    if result.is_err() {
        tracing::debug!("removing partial archive {}", archive_path.display());
        let _ = fs::remove_file(archive_path);
    }
    let total = result?;

    if !args.quiet {
        let size = fs::metadata(archive_path).map(|m| m.len()).unwrap_or(0);
        println!(
            "Created {} with {} file(s), {} of data ({} on disk).",
            archive_path.display(),
            inputs.len(),
            format_size(total),
            format_size(size)
        );
    }

    Ok(())
}

fn write_archive(file: File, args: &CreateArgs, inputs: &[Input]) -> Result<u64> {
    let options = ArchiveOptions::new(Mode::Create).with_alignment(args.alignment);
    let archive = Archive::with_options(file, options).map_err(|source| Error::CreateArchive {
        path: args.archive.clone(),
        source,
    })?;

    let pb = create_progress_bar(inputs.len() as u64, "Adding", args.quiet);
    let mut total = 0;
    for input in inputs {
        let entry = archive
            .create_entry(&input.name)
            .map_err(|source| Error::AddFile {
                path: input.path.clone(),
                source,
            })?;
        total += copy_into(&entry, input)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    finish(archive, &args.archive)?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{contents, write_files};

    #[test]
    fn creates_archive_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), &[("b.txt", b"second"), ("a.txt", b"first")]);
        let archive = dir.path().join("out.sarc");

        run(CreateArgs {
            archive: archive.clone(),
            alignment: 16,
            quiet: true,
            files,
        })
        .unwrap();

        assert_eq!(
            contents(&archive),
            [
                ("b.txt".to_string(), b"second".to_vec()),
                ("a.txt".to_string(), b"first".to_vec()),
            ]
        );

        let bytes = fs::read(&archive).unwrap();
        let view = sarc_format::ArchiveView::parse(&bytes).unwrap();
        for entry in &view {
            let entry = entry.unwrap();
            assert_eq!(entry.alignment, 16);
            assert_eq!(entry.body_offset % 16, 0);
        }
    }

    #[test]
    fn refuses_existing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), &[("a", b"1")]);
        let archive = dir.path().join("out.sarc");
        fs::write(&archive, b"keep").unwrap();

        let err = run(CreateArgs {
            archive: archive.clone(),
            alignment: 8,
            quiet: true,
            files,
        })
        .unwrap_err();
        assert!(matches!(err, Error::ArchiveExists { .. }));
        assert_eq!(fs::read(&archive).unwrap(), b"keep");
    }

    #[test]
    fn failure_removes_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), &[("a", b"1")]);
        let archive = dir.path().join("out.sarc");

        let err = run(CreateArgs {
            archive: archive.clone(),
            alignment: 12,
            quiet: true,
            files,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::CreateArchive {
                source: sarc_format::Error::InvalidAlignment(12),
                ..
            }
        ));
        assert!(!archive.exists());
    }

    #[test]
    fn missing_input_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("out.sarc");

        let err = run(CreateArgs {
            archive: archive.clone(),
            alignment: 8,
            quiet: true,
            files: vec![dir.path().join("nope")],
        })
        .unwrap_err();
        assert!(matches!(err, Error::OpenFile { .. }));
        assert!(!archive.exists());
    }
}
