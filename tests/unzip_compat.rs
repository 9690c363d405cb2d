//! Exercises real `unzip` against archives this writer produces. Skipped
//! entirely if the system has no `unzip` binary, since CI images vary.

use std::process::Command;

use splitzip::{CompressionMethod, SplitZipWriter};

fn unzip_available() -> bool {
    Command::new("unzip")
        .arg("-v")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn single_volume_archive_passes_unzip_integrity_check() {
    if !unzip_available() {
        eprintln!("skipping: unzip not installed");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("out");
    let mut writer = SplitZipWriter::create(
        &stem,
        splitzip::volume::MIN_VOLUME_SIZE,
        CompressionMethod::Deflated(6),
    )
    .unwrap();
    writer.add_bytes("hello.txt", b"Hello, World!".repeat(50)).unwrap();
    writer.add_directory("empty/").unwrap();
    let volumes = writer.finish().unwrap();
    assert_eq!(volumes.len(), 1);

    let status = Command::new("unzip")
        .arg("-t")
        .arg(&volumes[0])
        .status()
        .expect("failed to run unzip");
    assert!(status.success(), "unzip -t reported a corrupt archive");
}

#[test]
fn extracted_contents_are_byte_identical() {
    if !unzip_available() {
        eprintln!("skipping: unzip not installed");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("out");
    let mut writer = SplitZipWriter::create(
        &stem,
        splitzip::volume::MIN_VOLUME_SIZE,
        CompressionMethod::Stored,
    )
    .unwrap();
    let payload = b"the quick brown fox jumps over the lazy dog".to_vec();
    writer.add_bytes("fox.txt", payload.clone()).unwrap();
    let volumes = writer.finish().unwrap();

    let extract_dir = dir.path().join("extracted");
    std::fs::create_dir_all(&extract_dir).unwrap();
    let status = Command::new("unzip")
        .arg(&volumes[0])
        .arg("-d")
        .arg(&extract_dir)
        .status()
        .expect("failed to run unzip");
    assert!(status.success());

    let extracted = std::fs::read(extract_dir.join("fox.txt")).unwrap();
    assert_eq!(extracted, payload);
}
