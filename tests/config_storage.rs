use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use dashboard_report::config::ReportConfig;
use dashboard_report::export::{self, ExportFile, ExportFormat};
use dashboard_report::rules::LocalStorage;
use dashboard_report::ReportError;

#[test]
fn loads_explicit_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r##"
output_dir = "exports"
storage_path = "/var/lib/dashboard/storage.json"
margins_mm = 12.5
palette = ["#2563eb", "#f97316"]
"##,
    )
    .expect("write config");

    let config = ReportConfig::load(Some(&path)).expect("load config");
    assert_eq!(config.output_dir, PathBuf::from("exports"));
    assert_eq!(
        config.storage_path(),
        PathBuf::from("/var/lib/dashboard/storage.json")
    );
    assert_eq!(config.margins_mm, 12.5);
    assert_eq!(config.palette().len(), 2);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ReportConfig::load(Some(&dir.path().join("absent.toml")))
        .expect_err("explicit path must exist");
    assert!(matches!(err, ReportError::Io(_)));
}

#[test]
fn storage_without_token_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("storage.json");
    fs::write(&path, r#"{"token":"","theme":"dark"}"#).expect("write storage");

    let storage = LocalStorage::load(&path).expect("load storage");
    assert_eq!(storage.get("theme"), Some("dark"));
    match storage.token() {
        Err(ReportError::MissingToken { key, path: reported }) => {
            assert_eq!(key, "token");
            assert_eq!(reported, path.display().to_string());
        }
        other => panic!("expected a missing token error, got {other:?}"),
    }
}

#[test]
fn missing_storage_file_is_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalStorage::load(dir.path().join("none.json")).expect("load storage");
    assert!(storage.get("token").is_none());
}

#[test]
fn exports_are_written_with_dated_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let records = dashboard_report::data::records_from_json(r#"[{"agence":"Tunis","n":3}]"#)
        .expect("parse records");
    let text = export::to_csv(&records).expect("csv export");

    let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");
    let file = ExportFile::new("encours", ExportFormat::Csv, date, text.into_bytes());
    let path = file
        .write_to(&dir.path().join("out"))
        .expect("write export");

    assert!(path.ends_with("encours_2024-03-07.csv"));
    assert_eq!(
        fs::read_to_string(path).expect("read export"),
        "agence,n\nTunis,3"
    );
}
