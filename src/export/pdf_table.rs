//! Paginated PDF table export.

use crate::builder::{PageOrientation, RenderedPdf, ReportBuilder};
use crate::data::DataPoint;
use crate::error::Result;
use crate::model::{Block, Section, TableBlock};
use crate::palette::MUTED_TEXT_COLOR;
use crate::richtext::Span;

use super::PdfOptions;

/// Tables wider than this switch to landscape pages.
pub const MAX_PORTRAIT_COLUMNS: usize = 6;

/// Landscape when the table has more than six columns.
pub fn table_orientation(column_count: usize) -> PageOrientation {
    if column_count > MAX_PORTRAIT_COLUMNS {
        PageOrientation::Landscape
    } else {
        PageOrientation::Portrait
    }
}

/// Builder for a single-table document: title, generation date and the table.
pub fn table_builder(records: &[DataPoint], options: &PdfOptions) -> ReportBuilder {
    let table = TableBlock::from_records(records);
    let orientation = table_orientation(table.columns().len());
    if table.is_empty() {
        log::warn!("PDF table '{}' has no rows", options.title);
    }

    let section = Section::new(options.title.clone())
        .with_block(Block::paragraph(vec![
            Span::new(options.date_line()).sized(8).colored(MUTED_TEXT_COLOR),
        ]))
        .with_block(Block::Table(table));

    ReportBuilder::new()
        .with_title(options.title.clone())
        .with_orientation(orientation)
        .with_margins_mm(options.margins_mm)
        .with_fonts_dir(options.fonts_dir.clone())
        .with_palette(options.palette.clone())
        .with_format(options.format)
        .add_section(section)
}

/// Renders `records` as a paginated table with a `Page n / total` footer.
pub fn to_pdf_table(records: &[DataPoint], options: &PdfOptions) -> Result<RenderedPdf> {
    let rendered = table_builder(records, options).render()?;
    log::debug!(
        "PDF table '{}': {} rows on {} pages",
        options.title,
        records.len(),
        rendered.page_count
    );
    Ok(rendered)
}
