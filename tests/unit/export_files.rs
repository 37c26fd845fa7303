//! Export tests against a real temp directory

use crate::common::{csv_settings, logging, test_data};
use pretty_assertions::assert_eq;
use resume_sender::export::{export_records, ExportFormat, ExportSettings};
use resume_sender::models::{CareerEntry, EmailStatus};
use tempfile::TempDir;
use test_log::test;

#[test]
fn test_history_csv_has_header_and_formatted_rows() {
    logging::init_test_logging();
    logging::log_test_step("Exporting email history as csv");

    let dir = TempDir::new().unwrap();
    let records = vec![
        test_data::email_record(2, "hr@acme.example", EmailStatus::Success),
        test_data::email_record(1, "jobs@globex.example", EmailStatus::Failure),
    ];

    let path = export_records(&records, &csv_settings(dir.path()))
        .unwrap()
        .expect("non-empty history is written");
    assert_eq!(path, dir.path().join("Email_History.csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    logging::log_test_data("csv", &content);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Recipient,Sent At,Status",
            "hr@acme.example,\"Jan 5, 2026, 03:04 PM\",Sent",
            "jobs@globex.example,\"Jan 5, 2026, 03:04 PM\",Failed",
        ]
    );
}

#[test]
fn test_referrals_csv_uses_referral_columns() {
    let dir = TempDir::new().unwrap();
    let referrals = vec![test_data::referral(
        7,
        "Initech",
        "https://www.linkedin.com/in/peter",
    )];

    let path = export_records(&referrals, &csv_settings(dir.path()))
        .unwrap()
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "LinkedIn_Referrals.csv");
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "Company Name,LinkedIn Profile",
            "Initech,https://www.linkedin.com/in/peter",
        ]
    );
}

#[test]
fn test_xlsx_export_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let settings = ExportSettings {
        dir: dir.path().join("exports").join("nested"),
        format: ExportFormat::Xlsx,
    };
    let careers = vec![test_data::career(1, "Acme", "https://acme.example/careers")];

    let path = export_records(&careers, &settings).unwrap().unwrap();

    assert_eq!(path, settings.dir.join("Company_Careers.xlsx"));
    let bytes = std::fs::read(&path).unwrap();
    // xlsx is a zip container
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_empty_collection_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let settings = ExportSettings {
        dir: dir.path().join("never-created"),
        format: ExportFormat::Xlsx,
    };

    let result = export_records::<CareerEntry>(&[], &settings).unwrap();

    assert_eq!(result, None);
    assert!(!settings.dir.exists());
}
