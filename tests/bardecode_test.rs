#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use pdf_dicer::config::region::Region;
use pdf_dicer::config::settings::BardecodeOptions;
use pdf_dicer::decode::{BardecodeDecoder, DecoderStrategy};
use pdf_dicer::error::DicerError;

/// Drop a fake decoder executable into `dir` and return its path.
fn fake_bin(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn options(bin: PathBuf) -> BardecodeOptions {
    BardecodeOptions {
        bin,
        serial: String::new(),
        check_evaluation: true,
    }
}

fn image_in(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"tif bytes").expect("write image");
    path
}

#[test]
fn test_reads_first_stdout_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = fake_bin(dir.path(), "bardecode", r#"echo "101-a""#);
    let decoder = BardecodeDecoder::new(options(bin));

    let value = decoder
        .decode(&image_in(dir.path(), "page-1.tif"), &Region::default())
        .expect("decode");
    assert_eq!(value.as_deref(), Some("101-a"));
}

#[test]
fn test_evaluation_banner_lines_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = fake_bin(
        dir.path(),
        "bardecode",
        "echo \"EVALUATION MODE version banner\"\necho \"\"\necho \"250-z\"",
    );
    let decoder = BardecodeDecoder::new(options(bin));

    let value = decoder
        .decode(&image_in(dir.path(), "page-1.tif"), &Region::default())
        .expect("decode");
    assert_eq!(value.as_deref(), Some("250-z"));
}

#[test]
fn test_masked_value_is_returned_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = fake_bin(dir.path(), "bardecode", r#"echo "666-???""#);
    let decoder = BardecodeDecoder::new(options(bin));

    // The masked suffix is only warned about, never altered.
    let value = decoder
        .decode(&image_in(dir.path(), "page-1.tif"), &Region::default())
        .expect("decode");
    assert_eq!(value.as_deref(), Some("666-???"));
}

#[test]
fn test_silent_nonzero_exit_means_no_marker() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = fake_bin(dir.path(), "bardecode", "exit 1");
    let decoder = BardecodeDecoder::new(options(bin));

    let value = decoder
        .decode(&image_in(dir.path(), "page-1.tif"), &Region::default())
        .expect("decode");
    assert_eq!(value, None);
}

#[test]
fn test_nonzero_exit_with_stderr_is_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = fake_bin(
        dir.path(),
        "bardecode",
        "echo \"license expired\" >&2\nexit 2",
    );
    let decoder = BardecodeDecoder::new(options(bin));

    let result = decoder.decode(&image_in(dir.path(), "page-1.tif"), &Region::default());
    match result {
        Err(DicerError::DecoderUnavailable(msg)) => {
            assert!(msg.contains("license expired"), "diagnostics kept: {msg}");
        }
        other => panic!("expected DecoderUnavailable, got {other:?}"),
    }
}

#[test]
fn test_missing_executable_is_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let decoder = BardecodeDecoder::new(options(dir.path().join("no-such-bin")));

    let result = decoder.decode(&image_in(dir.path(), "page-1.tif"), &Region::default());
    assert!(matches!(result, Err(DicerError::DecoderUnavailable(_))));
}

#[test]
fn test_serial_is_forwarded_as_k_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Echo the arguments back so the test can assert on them.
    let bin = fake_bin(dir.path(), "bardecode", r#"echo "$1|$2|$3""#);
    let decoder = BardecodeDecoder::new(BardecodeOptions {
        bin,
        serial: "SER-42".into(),
        check_evaluation: true,
    });

    let image = image_in(dir.path(), "page-1.tif");
    let value = decoder
        .decode(&image, &Region::default())
        .expect("decode")
        .expect("argument echo");
    assert_eq!(value, format!("{}|-K|SER-42", image.display()));
}

#[test]
fn test_result_is_memoized_per_image_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Count invocations through a side file; each run appends a line.
    let counter = dir.path().join("calls");
    let bin = fake_bin(
        dir.path(),
        "bardecode",
        &format!("echo run >> {}\necho \"101-a\"", counter.display()),
    );
    let decoder = BardecodeDecoder::new(options(bin));

    let image = image_in(dir.path(), "page-1.tif");
    for _ in 0..3 {
        let value = decoder.decode(&image, &Region::default()).expect("decode");
        assert_eq!(value.as_deref(), Some("101-a"));
    }
    // A second page spawns its own subprocess.
    let other = image_in(dir.path(), "page-2.tif");
    decoder.decode(&other, &Region::default()).expect("decode");

    let calls = fs::read_to_string(&counter).expect("counter file");
    assert_eq!(calls.lines().count(), 2, "one subprocess per image path");
}
