//! File exports: CSV text, XLSX workbooks, paginated PDF tables and multi-section dashboards.
//!
//! Serializers work on in-memory [`DataPoint`] records and return bytes; [`ExportFile`] pairs
//! those bytes with the conventional `{name}_{YYYY-MM-DD}.{ext}` filename and MIME type.

pub mod csv;
pub mod dashboard;
pub mod pdf_table;
pub mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::builder::DEFAULT_MARGIN_MM;
use crate::config::ReportConfig;
use crate::data::DataPoint;
use crate::error::Result;
use crate::format::NumberFormat;
use crate::palette::Palette;

pub use self::csv::{parse_csv, to_csv};
pub use dashboard::{dashboard_builder, to_dashboard_pdf};
pub use pdf_table::{table_orientation, to_pdf_table};
pub use xlsx::{column_width, to_xlsx};

/// Output format of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma separated values.
    Csv,
    /// Office Open XML workbook.
    Xlsx,
    /// PDF document.
    Pdf,
}

impl ExportFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type announced for downloads.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// Builds `{name}_{YYYY-MM-DD}.{ext}`.
pub fn export_filename(name: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_{}.{}",
        name,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Current local date, used in filenames and PDF subtitles.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// A named group of records exported as one dashboard section.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ExportSection {
    /// Section heading.
    pub title: String,
    /// Rows shown in the section table.
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

impl ExportSection {
    /// Creates a section.
    pub fn new(title: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            title: title.into(),
            data,
        }
    }
}

/// Produced file, ready to be written or served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested filename.
    pub filename: String,
    /// Content type of `bytes`.
    pub mime_type: &'static str,
    /// File content.
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Wraps `bytes` with the filename and MIME type for `format`.
    pub fn new(name: &str, format: ExportFormat, date: NaiveDate, bytes: Vec<u8>) -> Self {
        Self {
            filename: export_filename(name, format, date),
            mime_type: format.mime_type(),
            bytes,
        }
    }

    /// Writes the file into `dir`, creating it when needed, and returns the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        log::info!(
            "wrote {} ({} bytes, {})",
            path.display(),
            self.bytes.len(),
            self.mime_type
        );
        Ok(path)
    }
}

/// Settings shared by the PDF exports.
#[derive(Clone, Debug)]
pub struct PdfOptions {
    /// Document title, printed on the first page.
    pub title: String,
    /// Date printed under the title.
    pub date: NaiveDate,
    /// Directory searched first for fonts.
    pub fonts_dir: Option<PathBuf>,
    /// Page margins on every side.
    pub margins_mm: f64,
    /// Chart and accent colors.
    pub palette: Palette,
    /// Number separators.
    pub format: NumberFormat,
}

impl PdfOptions {
    /// Options with today's date and the default layout.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: today(),
            fonts_dir: None,
            margins_mm: DEFAULT_MARGIN_MM,
            palette: Palette::default(),
            format: NumberFormat::default(),
        }
    }

    /// Applies fonts, margins and palette from the configuration.
    pub fn with_config(mut self, config: &ReportConfig) -> Self {
        self.fonts_dir = config.fonts_dir.clone();
        self.margins_mm = config.margins_mm;
        self.palette = config.palette();
        self
    }

    /// Overrides the date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub(crate) fn date_line(&self) -> String {
        format!("Generated on {}", self.date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date")
    }

    #[test]
    fn filename_pattern() {
        assert_eq!(
            export_filename("portefeuille", ExportFormat::Csv, date()),
            "portefeuille_2024-03-07.csv"
        );
        assert_eq!(
            export_filename("risques", ExportFormat::Xlsx, date()),
            "risques_2024-03-07.xlsx"
        );
    }

    #[test]
    fn mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert!(ExportFormat::Xlsx.mime_type().ends_with("spreadsheetml.sheet"));
    }

    #[test]
    fn write_to_creates_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("exports");
        let file = ExportFile::new("segments", ExportFormat::Csv, date(), b"a,b".to_vec());
        let path = file.write_to(&target).expect("write export");
        assert_eq!(path, target.join("segments_2024-03-07.csv"));
        assert_eq!(std::fs::read(path).expect("read back"), b"a,b");
    }

    #[test]
    fn export_section_deserializes_without_data() {
        let section: ExportSection =
            serde_json::from_str(r#"{"title":"Synthèse"}"#).expect("section");
        assert_eq!(section, ExportSection::new("Synthèse", Vec::new()));
    }
}
