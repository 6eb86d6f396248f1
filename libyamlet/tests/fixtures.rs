//! Test harness for the Yamlet parser against fixture files.
//!
//! Reads every `.yaml` file under `tests/fixtures/valid/`, parses it and
//! compares the JSON encoding against the `.json` file beside it. Files under
//! `tests/fixtures/invalid/` must fail with the message in their `.error`
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use libyamlet::{encode, parse, Format};

/// Fixture directory for a given kind.
fn fixture_files(kind: &str) -> Vec<PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(kind)
        .join("*.yaml");
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read the companion file with the given extension.
fn read_companion(path: &Path, ext: &str) -> Option<String> {
    fs::read_to_string(path.with_extension(ext)).ok()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Run a single valid fixture (expected to succeed).
fn run_valid_test(path: &Path) -> Result<(), String> {
    let content = fs::read(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let filename = file_name(path);

    let doc = parse(&content)
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    let actual = encode(&doc, Format::Json);
    match read_companion(path, "json") {
        Some(expected) if expected.trim() != actual.trim() => {
            return Err(format!(
                "{}: Output mismatch\n    expected: {}\n    actual:   {}",
                filename,
                expected.trim(),
                actual
            ));
        }
        Some(_) => println!("  {} => ok", filename),
        None => println!("  {} => {:?} (no expected output)", filename, doc),
    }

    // Canonical text must read back to the same document.
    let canonical = encode(&doc, Format::Yamlet);
    match parse(canonical.as_bytes()) {
        Ok(reparsed) if reparsed == doc => Ok(()),
        Ok(reparsed) => Err(format!(
            "{}: Canonical round trip changed the document\n    before: {:?}\n    after:  {:?}",
            filename, doc, reparsed
        )),
        Err(e) => Err(format!(
            "{}: Canonical text failed to parse: {}\n{}",
            filename, e, canonical
        )),
    }
}

/// Run a single invalid fixture (expected to fail with a specific error).
fn run_invalid_test(path: &Path) -> Result<(), String> {
    let content = fs::read(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let filename = file_name(path);

    let err = match parse(&content) {
        Ok(doc) => {
            return Err(format!(
                "{}: Expected parse error, but got success: {:?}",
                filename, doc
            ))
        }
        Err(e) => e,
    };

    let actual = err.to_string();
    match read_companion(path, "error") {
        Some(expected) if expected.trim() == actual => {
            println!("  {} => error (as expected)", filename);
            Ok(())
        }
        Some(expected) => Err(format!(
            "{}: Error mismatch\n    expected: {}\n    actual:   {}",
            filename,
            expected.trim(),
            actual
        )),
        None => {
            println!(
                "  {} => error: {} (no .error file to compare)",
                filename, actual
            );
            Ok(())
        }
    }
}

fn run_all(kind: &str, run: fn(&Path) -> Result<(), String>) {
    let files = fixture_files(kind);
    assert!(!files.is_empty(), "no {} fixtures found", kind);

    println!("\nRunning {} {} fixtures:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| run(f).err()).collect();

    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), kind);
}

#[test]
fn test_all_valid_fixtures() {
    run_all("valid", run_valid_test);
}

#[test]
fn test_all_invalid_fixtures() {
    run_all("invalid", run_invalid_test);
}

#[test]
fn test_error_location_in_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/invalid/tab_indent.yaml");
    let content = fs::read(&path).unwrap();
    let err = parse(&content).unwrap_err();
    let location = err.location(&content);
    assert_eq!((location.line, location.column), (2, 1));
}
