use std::fs;

use tempfile::TempDir;
use trip_engine::{ensure_output_dir, AtomicFileWriter, PersistError};

#[test]
fn creates_missing_plan_directory() {
    let temp = TempDir::new().unwrap();
    let plans = temp.path().join("plans").join("2026");
    assert!(!plans.exists());
    ensure_output_dir(&plans).unwrap();
    assert!(plans.is_dir());
}

#[test]
fn saving_a_plan_twice_replaces_it() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer
        .write("trip_lisbon_20261019_0900.md", b"# Complete Trip Plan: Lisbon\n")
        .unwrap();
    assert_eq!(first.file_name().unwrap(), "trip_lisbon_20261019_0900.md");

    let second = writer
        .write("trip_lisbon_20261019_0900.md", "# Revised: Lisboa 🇵🇹\n".as_bytes())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "# Revised: Lisboa 🇵🇹\n");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1, "no temp files left");
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let err = writer.write("plan.md", b"data").unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
    assert!(!file_path.with_file_name("plan.md").exists());
}
