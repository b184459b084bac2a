//! Multi-section dashboard PDF: a cover page followed by one table page per section.

use crate::builder::{RenderedPdf, ReportBuilder};
use crate::error::Result;
use crate::model::{Block, Cover, Section, TableBlock};
use crate::palette::MUTED_TEXT_COLOR;
use crate::richtext::Span;

use super::{ExportSection, PdfOptions};

fn cover(sections: &[ExportSection], options: &PdfOptions) -> Cover {
    let mut cover = Cover::new(options.title.clone()).with_subtitle(Some(options.date_line()));
    if sections.is_empty() {
        return cover;
    }

    cover = cover.with_block(Block::paragraph(vec![Span::new("Contents").bold()]));
    cover.with_blocks(sections.iter().enumerate().map(|(index, section)| {
        Block::paragraph(vec![
            Span::new(format!("{}. ", index + 1)).colored(MUTED_TEXT_COLOR),
            Span::new(section.title.clone()),
        ])
    }))
}

fn row_count_line(count: usize) -> Block {
    let text = match count {
        1 => "1 row".to_string(),
        n => format!("{n} rows"),
    };
    Block::paragraph(vec![Span::new(text).sized(8).colored(MUTED_TEXT_COLOR)])
}

/// Builder for the dashboard: cover page, then each section on its own page.
pub fn dashboard_builder(sections: &[ExportSection], options: &PdfOptions) -> ReportBuilder {
    let mut builder = ReportBuilder::new()
        .with_title(options.title.clone())
        .with_header(Some(options.title.clone()))
        .with_margins_mm(options.margins_mm)
        .with_fonts_dir(options.fonts_dir.clone())
        .with_palette(options.palette.clone())
        .with_format(options.format)
        .with_cover(cover(sections, options));

    for export in sections {
        if export.data.is_empty() {
            log::warn!("dashboard section '{}' has no rows", export.title);
        }
        let section = Section::builder(export.title.clone())
            .start_on_new_page(true)
            .push_block(row_count_line(export.data.len()))
            .push_block(Block::Table(TableBlock::from_records(&export.data)))
            .build();
        builder = builder.add_section(section);
    }
    builder
}

/// Renders the dashboard document.
pub fn to_dashboard_pdf(sections: &[ExportSection], options: &PdfOptions) -> Result<RenderedPdf> {
    let builder = dashboard_builder(sections, options);

    #[cfg(feature = "bookmarks")]
    let rendered = builder.render_with_bookmarks()?;
    #[cfg(not(feature = "bookmarks"))]
    let rendered = builder.render()?;

    log::debug!(
        "dashboard '{}': {} sections on {} pages",
        options.title,
        sections.len(),
        rendered.page_count
    );
    Ok(rendered)
}
