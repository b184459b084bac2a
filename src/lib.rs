//! Chart geometry and file exports for business-intelligence dashboards.
//!
//! The crate turns JSON records returned by a dashboard API into CSV text, XLSX workbooks and
//! paginated PDF documents whose charts are drawn from primitive shapes.  It also provides the
//! client and browsing state for the chatbot rules list.
//!
//! - [`geometry`]: pure layout math (pie sectors, bars, dashed grids, rounded paths).
//! - [`charts`]: chart drawings and the `genpdf` element that renders them.
//! - [`builder`] and [`model`]: the page builder used by every PDF export.
//! - [`export`]: CSV, XLSX, PDF table and dashboard exports.
//! - [`rules`]: rules API client and viewer state.

pub mod builder;
pub mod charts;
pub mod config;
pub mod data;
pub mod elements;
pub mod error;
pub mod export;
pub mod fonts;
pub mod format;
pub mod geometry;
pub mod model;
pub mod palette;
pub mod richtext;
pub mod rules;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use error::{ReportError, Result};
