//! Integration tests for export bundles.

mod common;

use chrono::{TimeZone, Utc};
use pdfqc::render::split_consolidated_text;
use pdfqc::{
    load_document, ExportConsolidator, ExportError, ExportOptions, Error, ReviewState,
    ReviewStatus,
};
use serde_json::Value;
use std::fs;

fn reviewed_state() -> ReviewState {
    let mut state = ReviewState::new(3).with_portfolio(Some("Equity".to_string()));
    state.set_status(0, ReviewStatus::Approved).unwrap();
    state.set_status(2, ReviewStatus::Flagged).unwrap();
    state
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_bundle_contents() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();
    let state = reviewed_state();
    let out = dir.path().join("final_outputs");

    let exported_at = Utc.with_ymd_and_hms(2024, 6, 1, 14, 5, 9).unwrap();
    let bundle = ExportConsolidator::new(ExportOptions::new().with_output_dir(&out))
        .export_at(&doc, &state, exported_at)
        .unwrap();

    assert_eq!(bundle.name, "sample_final_20240601_140509_000");
    for name in [
        "sample_final.json",
        "sample_content.md",
        "sample_summary.md",
        "sample.pdf",
        "processing_metadata.json",
        "export_report.json",
        "pages/page_01_Cover.md",
        "pages/page_02_Balance_Sheet.md",
        "pages/page_03_Notes.md",
    ] {
        assert!(bundle.dir.join(name).is_file(), "missing {}", name);
    }

    let final_json = read_json(&bundle.dir.join("sample_final.json"));
    let info = &final_json["document_info"];
    assert_eq!(info["document_name"], "sample");
    assert_eq!(info["original_pdf"], "original.pdf");
    assert_eq!(info["portfolio"], "Equity");
    assert_eq!(info["total_pages"], 3);
    assert_eq!(info["total_tables"], 3);
    assert_eq!(info["processed_at"], "2024-05-01T09:30:00.000Z");

    let first_row = &final_json["pages"][1]["tables"][0]["rows"][0];
    assert_eq!(first_row["Item"], "Revenue");
    assert_eq!(first_row["Value"], "200");

    let report = read_json(&bundle.dir.join("export_report.json"));
    assert_eq!(report["approved_pages"], 1);
    assert_eq!(report["flagged_pages"], 1);
    assert_eq!(report["pending_pages"], 1);
    assert_eq!(report["flagged_page_numbers"], serde_json::json!([3]));
    assert_eq!(report["portfolio"], "Equity");

    // Passthrough files are byte copies.
    assert_eq!(
        fs::read(bundle.dir.join("sample.pdf")).unwrap(),
        fs::read(&doc.source.path).unwrap()
    );
    assert_eq!(
        fs::read(bundle.dir.join("processing_metadata.json")).unwrap(),
        fs::read(&doc.metadata_path).unwrap()
    );
}

#[test]
fn test_page_files_render_each_page() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();
    let bundle = ExportConsolidator::new(
        ExportOptions::new().with_output_dir(dir.path().join("out")),
    )
    .export(&doc, &ReviewState::new(3))
    .unwrap();

    let content = fs::read_to_string(bundle.dir.join("sample_content.md")).unwrap();
    let sections = split_consolidated_text(&content);
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[1], (2, "Text of page 2".to_string()));

    let page_file = fs::read_to_string(bundle.dir.join("pages/page_02_Balance_Sheet.md")).unwrap();
    assert!(page_file.starts_with("# Page 2: Balance Sheet\n"));
    assert!(page_file.contains("**Summary:** Summary of Balance Sheet"));
    assert!(page_file.contains("### Balance Sheet figures"));
    assert!(page_file.contains("| Item | Value |"));
    assert!(page_file.contains("| Revenue | 200 |"));
    assert!(page_file.ends_with("## Raw Content\n\nText of page 2\n"));
}

#[test]
fn test_page_files_keep_marker_shaped_text() {
    let dir = tempfile::tempdir().unwrap();
    let root = common::DocumentFolder::new(dir.path(), "markers")
        .raw_page(r#"{"title": "One", "raw_content": "intro\n<!-- page 2 -->\ntail of page one"}"#)
        .raw_page(r#"{"title": "Two", "raw_content": "real page two"}"#)
        .write();
    let doc = load_document(root).unwrap();
    let bundle = ExportConsolidator::new(
        ExportOptions::new().with_output_dir(dir.path().join("out")),
    )
    .export(&doc, &ReviewState::new(2))
    .unwrap();

    let first = fs::read_to_string(bundle.dir.join("pages/page_01_One.md")).unwrap();
    assert!(first.contains("intro\n<!-- page 2 -->\ntail of page one"));
    let second = fs::read_to_string(bundle.dir.join("pages/page_02_Two.md")).unwrap();
    assert!(second.contains("real page two"));
    assert!(!second.contains("tail of page one"));
}

#[test]
fn test_repeated_exports_differ_only_in_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();
    let state = reviewed_state();
    let consolidator =
        ExportConsolidator::new(ExportOptions::new().with_output_dir(dir.path().join("out")));

    let first = consolidator.export(&doc, &state).unwrap();
    let second = consolidator.export(&doc, &state).unwrap();
    assert_ne!(first.dir, second.dir);

    let mut a = read_json(&first.dir.join("sample_final.json"));
    let mut b = read_json(&second.dir.join("sample_final.json"));
    a["document_info"]["export_date"] = Value::Null;
    b["document_info"]["export_date"] = Value::Null;
    assert_eq!(a, b);

    assert_eq!(
        fs::read(first.dir.join("sample_content.md")).unwrap(),
        fs::read(second.dir.join("sample_content.md")).unwrap()
    );
}

#[test]
fn test_export_does_not_touch_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let doc_dir = common::sample(dir.path());
    let doc = load_document(&doc_dir).unwrap();
    let state = reviewed_state();
    let before_state = state.clone();
    let before_page = fs::read(doc_dir.join("pages/page_001.json")).unwrap();

    ExportConsolidator::new(ExportOptions::new().with_output_dir(dir.path().join("out")))
        .export(&doc, &state)
        .unwrap();

    assert_eq!(state, before_state);
    assert_eq!(fs::read(doc_dir.join("pages/page_001.json")).unwrap(), before_page);
    assert!(!doc_dir.join("review_state.json").exists());
}

#[test]
fn test_stale_state_export_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();
    let out = dir.path().join("out");

    let result = ExportConsolidator::new(ExportOptions::new().with_output_dir(&out))
        .export(&doc, &ReviewState::new(2));
    assert!(matches!(
        result,
        Err(Error::Export(ExportError::StaleState {
            review_pages: 2,
            document_pages: 3
        }))
    ));
    assert!(!out.exists());
}

#[test]
fn test_no_staging_folder_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let doc = load_document(common::sample(dir.path())).unwrap();
    let out = dir.path().join("out");
    let consolidator = ExportConsolidator::new(ExportOptions::new().with_output_dir(&out));
    consolidator.export(&doc, &ReviewState::new(3)).unwrap();

    let mut broken = doc.clone();
    broken.source.path = dir.path().join("missing.pdf");
    assert!(consolidator.export(&broken, &ReviewState::new(3)).is_err());

    let entries: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|name| !name.starts_with('.')));
}
