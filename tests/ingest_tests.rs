//! Integration tests for local ingestion: discovery, parsing and validation.

use glossary_updater::engine::ingest;
use glossary_updater::error::ErrorCode;
use glossary_updater::formats::{self, Format};
use glossary_updater::terms::{self, TermSet};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn csv_with_quoted_fields_and_alternate_headers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["Term", "Description", "Owner"]).unwrap();
    writer
        .write_record(["CI/CD", "Continuous integration, continuous delivery", "platform"])
        .unwrap();
    writer
        .write_record(["Quote", "Says \"hello\"\nacross lines", "docs"])
        .unwrap();
    writer.flush().unwrap();

    let ingested = ingest(&[path], &[]).unwrap();
    assert_eq!(ingested.files[0].format, Format::Csv);
    assert_eq!(ingested.terms.len(), 2);
    assert_eq!(
        ingested.terms.get("ci/cd").unwrap().definition(),
        "Continuous integration, continuous delivery"
    );
    assert_eq!(
        ingested.terms.get("QUOTE").unwrap().definition(),
        "Says \"hello\"\nacross lines"
    );
}

#[test]
fn csv_written_from_a_term_set_reads_back_unchanged() {
    let original: TermSet = [
        ("API", "Application Programming Interface"),
        ("CI/CD", "Continuous integration, continuous delivery"),
        ("Quote", "Says \"hello\", then leaves"),
        ("Multi-line", "First line\nsecond line"),
        ("Placeholder", ""),
        ("Café", "Unicode phrase"),
    ]
    .into_iter()
    .map(|(phrase, definition)| terms::normalize(Some(phrase), Some(definition)).unwrap())
    .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["phrase", "definition"]).unwrap();
    for term in &original {
        writer.write_record([term.phrase(), term.definition()]).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let raw = formats::parse(&bytes, Format::Csv, "generated.csv").unwrap();
    let normalized = terms::normalize_all(raw);
    assert_eq!(normalized.rejected, 0);
    let deduped = terms::dedupe(normalized.terms);
    assert_eq!(deduped.duplicates_found, 0);
    assert_eq!(deduped.terms, original);
}

#[test]
fn later_files_override_earlier_ones() {
    let temp = TempDir::new().unwrap();
    let yaml = temp.path().join("base.yml");
    let json = temp.path().join("override.json");
    std::fs::write(&yaml, "API: Application Programming Interface\nSDK: Software Development Kit\n").unwrap();
    std::fs::write(&json, r#"{"glossary": [{"phrase": "api", "definition": "Public interface"}]}"#).unwrap();

    let ingested = ingest(&[yaml, json], &[]).unwrap();
    assert_eq!(ingested.files.len(), 2);
    assert_eq!(ingested.terms.len(), 2);
    assert_eq!(ingested.duplicates_found, 1);
    assert_eq!(ingested.terms.get("API").unwrap().definition(), "Public interface");
}

#[test]
fn same_file_twice_is_read_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.csv");
    std::fs::write(&path, "phrase,definition\nAPI,Interface\n").unwrap();

    let ingested = ingest(&[path.clone(), path], &[temp.path().to_path_buf()]).unwrap();
    assert_eq!(ingested.files.len(), 1);
    assert_eq!(ingested.duplicates_found, 0);
}

#[test]
fn unsupported_structure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scalar.json");
    std::fs::write(&path, "42").unwrap();

    let err = ingest(&[path], &[]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedStructure);
}

#[test]
fn directory_that_is_a_file_is_path_not_found() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("terms.csv");
    std::fs::write(&path, "phrase,definition\n").unwrap();

    let err = ingest(&[], &[path]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathNotFound);

    let err = ingest(&[PathBuf::from("/definitely/not/here.csv")], &[]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathNotFound);
}
