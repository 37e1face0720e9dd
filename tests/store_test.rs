//! Integration tests for loading document folders.

mod common;

use common::DocumentFolder;
use pdfqc::{find_documents, load_document, Error, LoadOptions, PageStore};
use std::fs;

#[test]
fn test_load_sample() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();

    assert_eq!(doc.name, "sample");
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.pages[1].title, "Balance Sheet");
    assert_eq!(doc.pages[1].tables[0].columns, vec!["Item", "Value"]);
    assert_eq!(doc.total_tables(), 3);
    assert_eq!(doc.processing_metadata["pipeline"]["version"], 3);
    assert!(doc.keywords().contains(&"finance".to_string()));
}

#[test]
fn test_text_file_overrides_raw_content() {
    let dir = tempfile::tempdir().unwrap();
    let doc_dir = common::sample(dir.path());
    fs::write(doc_dir.join("pages/page_002.md"), "Corrected text").unwrap();

    let doc = load_document(&doc_dir).unwrap();
    assert_eq!(doc.pages[0].text, "Text of page 1");
    assert_eq!(doc.pages[1].text, "Corrected text");
}

#[test]
fn test_parallel_and_sequential_agree() {
    let dir = tempfile::tempdir().unwrap();
    let mut folder = DocumentFolder::new(dir.path(), "long");
    for i in 0..40 {
        folder = folder.page(&format!("Section {}", i));
    }
    let doc_dir = folder.write();

    let parallel = PageStore::new().load(&doc_dir).unwrap();
    let sequential = PageStore::with_options(LoadOptions::new().sequential())
        .load(&doc_dir)
        .unwrap();
    assert_eq!(parallel.pages, sequential.pages);
    assert_eq!(parallel.pages[39].title, "Section 39");
}

#[test]
fn test_missing_page_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let doc_dir = common::sample(dir.path());
    fs::remove_file(doc_dir.join("pages/page_002.json")).unwrap();

    match load_document(&doc_dir) {
        Err(Error::NotFound(path)) => assert!(path.ends_with("pages/page_002.json")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_non_uniform_rows_are_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let doc_dir = DocumentFolder::new(dir.path(), "bad")
        .page("Fine")
        .raw_page(r#"{"tables": [{"data": [{"a": "1"}, {"b": "2"}]}]}"#)
        .write();

    match load_document(&doc_dir) {
        Err(Error::MalformedData { location, .. }) => {
            assert_eq!(location, "page 2 tables[0].data")
        }
        other => panic!("expected MalformedData, got {:?}", other),
    }
}

#[test]
fn test_find_documents_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let older = DocumentFolder::new(dir.path(), "report_20240101").page("A").write();
    let newer = DocumentFolder::new(dir.path(), "report_20240201").page("A").write();
    DocumentFolder::new(dir.path(), "other_20240301").page("A").write();

    let old_time = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
    fs::File::open(&older).unwrap().set_modified(old_time).unwrap();

    let found = find_documents(dir.path(), "report.pdf").unwrap();
    assert_eq!(found, vec![newer, older]);
}
