//! Error type shared by the export, rendering and rules modules.

use std::io;

/// Errors produced while rendering documents, serializing exports or fetching rules.
///
/// Empty datasets and zero totals are not errors: every chart and export degrades to a
/// placeholder instead.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Fonts required by the PDF renderer could not be loaded.
    #[error("failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// The PDF renderer rejected the document layout.
    #[error("failed to render PDF document: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// CSV serialization or parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook generation failed.
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// JSON input could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A request to the rules API failed.
    #[error("rules request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configuration file is not valid TOML for [`crate::config::ReportConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// No bearer token was found in the client storage.
    #[error("no auth token stored under key `{key}` in {path}")]
    MissingToken {
        /// Storage key that was looked up.
        key: String,
        /// Storage file that was read.
        path: String,
    },

    /// Outline injection failed after the PDF was rendered.
    #[cfg(feature = "bookmarks")]
    #[error("failed to add bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),

    /// Filesystem access failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ReportError> = std::result::Result<T, E>;
