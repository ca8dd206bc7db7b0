//! Archives backed by files on disk.

use std::io::{Read, Seek, SeekFrom, Write};

use sarc_format::{Archive, ArchiveView, Error, ErrorKind, Mode};
use tempfile::TempDir;

fn add(archive: &Archive<std::fs::File>, name: &str, body: &[u8]) {
    let entry = archive.create_entry(name).unwrap();
    entry.open().unwrap().write_all(body).unwrap();
}

#[test]
fn create_update_read() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.sarc");

    {
        let mut archive = Archive::create_file(&path).unwrap();
        add(&archive, "readme.txt", b"hello");
        add(&archive, "data.bin", &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        archive.close().unwrap();
    }

    {
        let mut archive = Archive::open_file(&path, Mode::Update).unwrap();
        assert_eq!(archive.mode(), Mode::Update);
        let entry = archive.get_entry("readme.txt").unwrap().unwrap();
        let mut stream = entry.open().unwrap();
        stream.set_len(0).unwrap();
        stream.write_all(b"replaced").unwrap();
        drop(stream);
        add(&archive, "late.txt", b"appended");
        archive.close().unwrap();
    }

    let archive = Archive::open_file(&path, Mode::Read).unwrap();
    let names: Vec<_> = archive
        .entries()
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, ["readme.txt", "data.bin", "late.txt"]);

    let mut stream = archive.get_entry("readme.txt").unwrap().unwrap().open().unwrap();
    stream.seek(SeekFrom::Start(0)).unwrap();
    let mut text = String::new();
    stream.read_to_string(&mut text).unwrap();
    assert_eq!(text, "replaced");
}

#[test]
fn create_refuses_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("exists.sarc");
    std::fs::write(&path, b"").unwrap();

    let err = Archive::create_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    match err {
        Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn delete_truncates_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shrink.sarc");

    {
        let archive = Archive::create_file(&path).unwrap();
        add(&archive, "keep", b"small");
        add(&archive, "drop", &[0xAB; 4096]);
    }
    let before = std::fs::metadata(&path).unwrap().len();

    {
        let mut archive = Archive::open_file(&path, Mode::Update).unwrap();
        archive.get_entry("drop").unwrap().unwrap().delete().unwrap();
        archive.close().unwrap();
    }
    let after = std::fs::metadata(&path).unwrap().len();
    assert!(after < before);

    let bytes = std::fs::read(&path).unwrap();
    let view = ArchiveView::parse(&bytes).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.find("keep").unwrap().unwrap().data, b"small");
}

#[test]
fn read_mode_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ro.sarc");
    {
        let archive = Archive::create_file(&path).unwrap();
        add(&archive, "a", b"alpha");
    }
    let before = std::fs::read(&path).unwrap();

    {
        let mut archive = Archive::open_file(&path, Mode::Read).unwrap();
        let entry = archive.get_entry("a").unwrap().unwrap();
        assert!(entry.open().unwrap().write_all(b"!").is_err());
        assert!(archive.create_entry("b").is_err());
        archive.close().unwrap();
    }

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn read_only_file_cannot_be_updated() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.sarc");
    {
        let mut archive = Archive::create_file(&path).unwrap();
        add(&archive, "a", b"1");
        archive.close().unwrap();
    }
    let before = std::fs::read(&path).unwrap();

    let err = Archive::new(std::fs::File::open(&path).unwrap(), Mode::Update).unwrap_err();
    assert!(matches!(err, Error::NotWritable(Mode::Update)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut archive = Archive::open(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(archive.mode(), Mode::Read);
    assert_eq!(archive.len().unwrap(), 1);
    archive.close().unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}
