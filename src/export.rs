//! Spreadsheet export of the loaded collections
//!
//! [`build_sheet`] turns records into rows and is pure. The writers save a sheet as `.xlsx`
//! or `.csv` into the export directory.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::models::{CareerEntry, EmailRecord, ReferralEntry};
use crate::utils::format_sent_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}' (expected xlsx or csv)", other)),
        }
    }
}

/// Where exported files go
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub format: ExportFormat,
}

/// One output column: header text and how to read the cell from a record
pub struct Column<R> {
    pub header: &'static str,
    pub value: fn(&R) -> String,
}

/// Row-oriented sheet ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Records with a fixed spreadsheet layout
pub trait Exportable: Sized {
    const SHEET_NAME: &'static str;
    const FILE_STEM: &'static str;

    fn columns() -> Vec<Column<Self>>;
}

impl Exportable for CareerEntry {
    const SHEET_NAME: &'static str = "Careers";
    const FILE_STEM: &'static str = "Company_Careers";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column {
                header: "Company Name",
                value: |c| c.company_name.clone(),
            },
            Column {
                header: "Career Page Link",
                value: |c| c.career_link.clone(),
            },
        ]
    }
}

impl Exportable for ReferralEntry {
    const SHEET_NAME: &'static str = "Referrals";
    const FILE_STEM: &'static str = "LinkedIn_Referrals";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column {
                header: "Company Name",
                value: |r| r.company_name.clone(),
            },
            Column {
                header: "LinkedIn Profile",
                value: |r| r.linked_in_url.clone(),
            },
        ]
    }
}

impl Exportable for EmailRecord {
    const SHEET_NAME: &'static str = "Email History";
    const FILE_STEM: &'static str = "Email_History";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column {
                header: "Recipient",
                value: |e| e.email.clone(),
            },
            Column {
                header: "Sent At",
                value: |e| format_sent_at(&e.sent_at),
            },
            Column {
                header: "Status",
                value: |e| e.status.label().to_string(),
            },
        ]
    }
}

/// Lay out `records` under `columns`; `None` when there is nothing to export
pub fn build_sheet<R>(name: &str, records: &[R], columns: &[Column<R>]) -> Option<Sheet> {
    if records.is_empty() {
        return None;
    }
    Some(Sheet {
        name: name.to_string(),
        headers: columns.iter().map(|c| c.header.to_string()).collect(),
        rows: records
            .iter()
            .map(|record| columns.iter().map(|c| (c.value)(record)).collect())
            .collect(),
    })
}

pub fn write_xlsx(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row, cells) in sheet.rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_csv(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `records` to `<dir>/<FILE_STEM>.<ext>`. Returns `None` and writes nothing when empty.
pub fn export_records<R: Exportable>(
    records: &[R],
    settings: &ExportSettings,
) -> Result<Option<PathBuf>> {
    let sheet = match build_sheet(R::SHEET_NAME, records, &R::columns()) {
        Some(sheet) => sheet,
        None => return Ok(None),
    };

    std::fs::create_dir_all(&settings.dir)
        .with_context(|| format!("Failed to create {}", settings.dir.display()))?;
    let path = settings
        .dir
        .join(format!("{}.{}", R::FILE_STEM, settings.format.extension()));
    match settings.format {
        ExportFormat::Xlsx => write_xlsx(&sheet, &path)?,
        ExportFormat::Csv => write_csv(&sheet, &path)?,
    }

    info!("💾 Exported {} row(s) to {}", sheet.rows.len(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailStatus;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_sheet_keeps_record_order() {
        let careers = vec![
            CareerEntry {
                id: 2,
                company_name: "Globex".to_string(),
                career_link: "https://globex.example/jobs".to_string(),
            },
            CareerEntry {
                id: 1,
                company_name: "Acme".to_string(),
                career_link: "https://acme.example/careers".to_string(),
            },
        ];

        let sheet = build_sheet("Careers", &careers, &CareerEntry::columns()).unwrap();

        assert_eq!(sheet.headers, vec!["Company Name", "Career Page Link"]);
        assert_eq!(sheet.rows[0], vec!["Globex", "https://globex.example/jobs"]);
        assert_eq!(sheet.rows[1], vec!["Acme", "https://acme.example/careers"]);
    }

    #[test]
    fn test_empty_collection_builds_nothing() {
        let none: Vec<ReferralEntry> = Vec::new();
        assert_eq!(build_sheet("Referrals", &none, &ReferralEntry::columns()), None);
    }

    #[test]
    fn test_history_columns_are_formatted() {
        let record = EmailRecord {
            id: 1,
            email: "hr@acme.example".to_string(),
            sent_at: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            status: EmailStatus::Success,
        };

        let sheet = build_sheet("Email History", &[record], &EmailRecord::columns()).unwrap();

        assert_eq!(sheet.rows[0], vec!["hr@acme.example", "Jan 5, 2026, 09:30 AM", "Sent"]);
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
