use std::fs;

use otp_engine::{PersistError, PreviewWriter};
use tempfile::TempDir;

#[test]
fn materialize_writes_keyed_document() {
    let temp = TempDir::new().unwrap();
    let writer = PreviewWriter::new(temp.path().to_path_buf());

    let path = writer.materialize("837261", "Your access code is 837261").unwrap();
    assert_eq!(path, temp.path().join("otp-837261.html"));
    let doc = fs::read_to_string(&path).unwrap();
    assert!(doc.contains("Your access code is <mark>837261</mark>"));
}

#[test]
fn same_code_overwrites_previous_document() {
    let temp = TempDir::new().unwrap();
    let writer = PreviewWriter::new(temp.path().to_path_buf());

    let first = writer.materialize("4242", "code 4242 (first)").unwrap();
    let second = writer.materialize("4242", "code 4242 (second)").unwrap();
    assert_eq!(first, second);
    let doc = fs::read_to_string(&second).unwrap();
    assert!(doc.contains("(second)"));
    assert!(!doc.contains("(first)"));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn missing_directory_is_created() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested").join("previews");
    let writer = PreviewWriter::new(dir.clone());
    writer.materialize("1234", "otp 1234").unwrap();
    assert!(dir.join("otp-1234.html").is_file());
}

#[test]
fn non_digit_key_is_rejected() {
    let temp = TempDir::new().unwrap();
    let writer = PreviewWriter::new(temp.path().to_path_buf());
    assert!(matches!(
        writer.materialize("../evil", "x"),
        Err(PersistError::InvalidKey(_))
    ));
}

#[test]
fn file_in_place_of_directory_is_reported() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = PreviewWriter::new(file_path);
    assert!(matches!(
        writer.materialize("1234", "code 1234"),
        Err(PersistError::OutputDir(_))
    ));
}
