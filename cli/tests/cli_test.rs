//! Exit status and output location checks for the pdfcards binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn pdfcards(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pdfcards"))
        .args(args)
        .current_dir(cwd)
        .env_remove("PDFCARDS_INPUT")
        .env_remove("PDFCARDS_MODE")
        .env_remove("PDFCARDS_DATA_DIR")
        .env_remove("PDFCARDS_IMAGES_DIR")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run pdfcards")
}

#[test]
fn test_missing_input_prints_usage_and_fails() {
    let dir = TempDir::new().unwrap();
    let output = pdfcards(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_invalid_input_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "hi").unwrap();

    let output = pdfcards(dir.path(), &["notes.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
    assert!(!dir.path().join("docs/src/data/cards.json").exists());
}

#[test]
fn test_empty_directory_succeeds_with_default_layout() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("pdfs")).unwrap();

    let output = pdfcards(dir.path(), &["pdfs"]);
    assert!(output.status.success());

    let json = fs::read_to_string(dir.path().join("docs/src/data/cards.json")).unwrap();
    assert_eq!(json, "[]");
    assert!(dir.path().join("docs/public/cards").is_dir());
}

#[test]
fn test_failed_documents_do_not_change_exit_status() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    let output = pdfcards(
        dir.path(),
        &["broken.pdf", "--mode", "dictionary", "--data-dir", "out"],
    );
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("out/dictionary.json")).unwrap(),
        "[]"
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("broken.pdf"));
}
