//! Page builder that turns a [`Cover`] and [`Section`]s into a paginated PDF.
//!
//! Pagination is left to `genpdf`, but the builder owns the page count: a page decorator
//! increments a shared counter for every page it decorates, and [`SectionMarker`]s read that
//! counter to remember where each section starts.  Because the footer prints `Page n / total`,
//! documents are rendered twice, once to count pages and once with the known total.

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use genpdf::elements::{Break, PageBreak, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};

use crate::charts::{ChartBlock, DrawingElement};
use crate::charts::element::mm_from_f64;
use crate::elements::{self, PageCounter, SectionMarker};
use crate::error::{ReportError, Result};
use crate::fonts;
use crate::format::NumberFormat;
use crate::model::{Block, Cover, Section};
use crate::palette::{Palette, MUTED_TEXT_COLOR};
use crate::richtext::{paragraph_from_spans, Span};

/// Margin applied on every side of the page, in millimetres.
pub const DEFAULT_MARGIN_MM: f64 = 15.0;

const FOOTER_HEIGHT_MM: f64 = 8.0;
const HEADER_GAP_MM: f64 = 3.0;
const BODY_FONT_SIZE: u8 = 10;
const COVER_TITLE_SIZE: u8 = 24;
const COVER_SUBTITLE_SIZE: u8 = 14;
const FOOTER_FONT_SIZE: u8 = 8;

/// Page orientation for every page of a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageOrientation {
    /// A4 portrait, 210 x 297 mm.
    #[default]
    Portrait,
    /// A4 landscape, 297 x 210 mm.
    Landscape,
}

impl PageOrientation {
    fn paper_size(self) -> Size {
        match self {
            PageOrientation::Portrait => PaperSize::A4.into(),
            PageOrientation::Landscape => Size::new(297, 210),
        }
    }
}

/// Output of [`ReportBuilder::render`].
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// Serialized PDF document.
    pub bytes: Vec<u8>,
    /// Number of pages in the document, cover included.
    pub page_count: usize,
    /// First page (1-based) of each section, in insertion order.
    ///
    /// `None` when a section produced no output at all.
    pub section_pages: Vec<Option<usize>>,
}

/// Builder assembling a multi-page report.
///
/// ```no_run
/// use dashboard_report::builder::ReportBuilder;
/// use dashboard_report::model::{Block, Cover, Section};
/// use dashboard_report::richtext::Span;
///
/// let pdf = ReportBuilder::new()
///     .with_cover(Cover::new("Portefeuille"))
///     .add_section(Section::new("Synthèse").with_block(Block::paragraph(vec![Span::new("…")])))
///     .render()?;
/// std::fs::write("report.pdf", &pdf.bytes)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ReportBuilder {
    title: Option<String>,
    header: Option<String>,
    cover: Option<Cover>,
    sections: Vec<Section>,
    palette: Palette,
    format: NumberFormat,
    fonts_dir: Option<PathBuf>,
    margins_mm: f64,
    orientation: PageOrientation,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            title: None,
            header: None,
            cover: None,
            sections: Vec::new(),
            palette: Palette::default(),
            format: NumberFormat::default(),
            fonts_dir: None,
            margins_mm: DEFAULT_MARGIN_MM,
            orientation: PageOrientation::default(),
        }
    }
}

impl ReportBuilder {
    /// Creates a builder with A4 portrait pages and the default margins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Prints `header` at the top of every page.
    pub fn with_header(mut self, header: impl Into<Option<String>>) -> Self {
        self.header = header.into();
        self
    }

    /// Sets the cover page.  The first section always starts on the page after it.
    pub fn with_cover(mut self, cover: Cover) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Appends a section.  It continues the current page unless it begins with a page break.
    pub fn add_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Appends an untitled section that always starts on a fresh page.
    pub fn add_page<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.sections
            .push(Section::untitled().with_blocks(blocks).with_leading_page_break());
        self
    }

    /// Colors used by charts and KPI values.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Separators used in tables and chart labels.
    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Directory searched first for the Roboto fonts.
    pub fn with_fonts_dir(mut self, fonts_dir: Option<PathBuf>) -> Self {
        self.fonts_dir = fonts_dir;
        self
    }

    /// Margin applied on every side of the page.
    pub fn with_margins_mm(mut self, margins_mm: f64) -> Self {
        self.margins_mm = margins_mm.max(0.0);
        self
    }

    /// Page orientation.
    pub fn with_orientation(mut self, orientation: PageOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Cover page, if any.
    pub fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }

    /// Renders the document.
    pub fn render(&self) -> Result<RenderedPdf> {
        let font_family =
            fonts::font_family(self.fonts_dir.as_deref()).map_err(ReportError::FontLoad)?;

        let counted = self.render_pass(font_family.clone(), None, io::sink())?;
        let mut bytes = Vec::new();
        let rendered = self.render_pass(font_family, Some(counted.page_count), &mut bytes)?;
        if rendered.page_count != counted.page_count {
            log::warn!(
                "page count changed between passes ({} then {})",
                counted.page_count,
                rendered.page_count
            );
        }

        log::debug!(
            "rendered {} pages, {} sections, {} bytes",
            rendered.page_count,
            self.sections.len(),
            bytes.len()
        );
        Ok(RenderedPdf {
            bytes,
            page_count: rendered.page_count,
            section_pages: rendered.section_pages,
        })
    }

    /// Renders the document and adds one outline entry per titled section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedPdf> {
        let mut rendered = self.render()?;
        rendered.bytes = crate::bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            &self.sections,
            &rendered.section_pages,
        )?;
        Ok(rendered)
    }

    fn render_pass<W: io::Write>(
        &self,
        font_family: FontFamily<FontData>,
        total_pages: Option<usize>,
        writer: W,
    ) -> Result<PassSummary> {
        let counter: PageCounter = Rc::new(Cell::new(0));
        let mut document = genpdf::Document::new(font_family);
        document.set_title(self.title.clone().unwrap_or_else(|| "Report".to_string()));
        document.set_paper_size(self.orientation.paper_size());
        document.set_font_size(BODY_FONT_SIZE);
        document.set_page_decorator(ConfiguredPageDecorator {
            counter: counter.clone(),
            margins: Margins::all(mm_from_f64(self.margins_mm)),
            header: self.header.clone(),
            footer_height: mm_from_f64(FOOTER_HEIGHT_MM),
            total_pages,
        });

        let mut content_started = false;
        if let Some(cover) = &self.cover {
            self.push_cover(&mut document, cover)?;
            content_started = true;
        }

        let mut section_pages = Vec::with_capacity(self.sections.len());
        for (index, section) in self.sections.iter().enumerate() {
            let page = Rc::new(Cell::new(None));
            section_pages.push(page.clone());

            let mut blocks = section.blocks();
            if section.starts_with_page_break() || (index == 0 && self.cover.is_some()) {
                if content_started {
                    document.push(PageBreak::new());
                }
                if section.starts_with_page_break() {
                    blocks = &blocks[1..];
                }
            } else if content_started {
                document.push(Break::new(1.5));
            }

            document.push(SectionMarker::new(counter.clone(), page));
            if let Some(title) = section.title() {
                document.push(elements::heading(title));
                document.push(Break::new(0.5));
            }
            self.push_blocks(&mut document, blocks)?;
            content_started = true;
        }

        document.render(writer)?;
        Ok(PassSummary {
            page_count: counter.get(),
            section_pages: section_pages.iter().map(|page| page.get()).collect(),
        })
    }

    fn push_cover(&self, document: &mut genpdf::Document, cover: &Cover) -> Result<()> {
        document.push(Break::new(4));
        document.push(
            paragraph_from_spans([&Span::new(cover.title()).bold().sized(COVER_TITLE_SIZE)])
                .aligned(Alignment::Center),
        );
        if let Some(subtitle) = cover.subtitle() {
            document.push(Break::new(0.5));
            document.push(
                paragraph_from_spans([&Span::new(subtitle)
                    .sized(COVER_SUBTITLE_SIZE)
                    .colored(MUTED_TEXT_COLOR)])
                .aligned(Alignment::Center),
            );
        }
        document.push(Break::new(2));
        self.push_blocks(document, cover.blocks())
    }

    fn push_blocks(&self, document: &mut genpdf::Document, blocks: &[Block]) -> Result<()> {
        for (index, block) in blocks.iter().enumerate() {
            if index > 0 && !matches!(block, Block::PageBreak) {
                document.push(Break::new(1));
            }
            match block {
                Block::Paragraph(paragraph) => document.push(
                    paragraph_from_spans(paragraph.spans()).aligned(paragraph.alignment().into()),
                ),
                Block::Kpis(cards) => document.push(BoxedElement(elements::kpi_row(cards, self.palette.color(0))?)),
                Block::Chart(chart) => self.push_chart(document, chart),
                Block::Table(table) => document.push(BoxedElement(elements::data_table(table, &self.format)?)),
                Block::PageBreak => document.push(PageBreak::new()),
            }
        }
        Ok(())
    }

    fn push_chart(&self, document: &mut genpdf::Document, chart: &ChartBlock) {
        if let Some(title) = chart.title() {
            document.push(Paragraph::new(StyledString::new(
                title.to_string(),
                Style::new().bold(),
            )));
        }
        if chart.data().is_empty() {
            log::warn!("chart {:?} has no data, drawing placeholder", chart.title());
        }
        document.push(DrawingElement::new(chart.to_drawing(&self.palette, &self.format)));
    }
}

/// Adapts a boxed element to `Document::push`, which requires a concrete `Element`.
struct BoxedElement(Box<dyn Element>);

impl Element for BoxedElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: genpdf::render::Area<'_>,
        style: Style,
    ) -> std::result::Result<genpdf::RenderResult, Error> {
        self.0.render(context, area, style)
    }
}

struct PassSummary {
    page_count: usize,
    section_pages: Vec<Option<usize>>,
}

struct ConfiguredPageDecorator {
    counter: PageCounter,
    margins: Margins,
    header: Option<String>,
    footer_height: Mm,
    total_pages: Option<usize>,
}

impl ConfiguredPageDecorator {
    fn footer_text(&self, page: usize) -> String {
        match self.total_pages {
            Some(total) => format!("Page {page} / {total}"),
            None => format!("Page {page}"),
        }
    }
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> std::result::Result<genpdf::render::Area<'a>, Error> {
        let page = self.counter.get() + 1;
        self.counter.set(page);

        area.add_margins(self.margins);

        let small = Style::new()
            .with_font_size(FOOTER_FONT_SIZE)
            .with_color(MUTED_TEXT_COLOR);

        if let Some(header) = &self.header {
            let mut element = Paragraph::new(StyledString::new(header.clone(), small));
            let result = element.render(context, area.clone(), style)?;
            area.add_offset(Position::new(
                0,
                result.size.height + mm_from_f64(HEADER_GAP_MM),
            ));
        }

        let available = area.size().height;
        if self.footer_height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - self.footer_height));
        let mut footer = Paragraph::new(StyledString::new(self.footer_text(page), small))
            .aligned(Alignment::Right);
        let result = footer.render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Footer element does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - self.footer_height);
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_page_starts_with_break() {
        let builder = ReportBuilder::new()
            .add_section(Section::new("Synthèse"))
            .add_page(vec![Block::paragraph(vec![Span::new("Annexe")])]);

        assert_eq!(builder.sections().len(), 2);
        assert!(!builder.sections()[0].starts_with_page_break());
        assert!(builder.sections()[1].starts_with_page_break());
        assert_eq!(builder.sections()[1].title(), None);
    }

    #[test]
    fn negative_margins_are_clamped() {
        let builder = ReportBuilder::new().with_margins_mm(-5.0);
        assert_eq!(builder.margins_mm, 0.0);
    }

    #[test]
    fn footer_text_includes_total_once_known() {
        let decorator = ConfiguredPageDecorator {
            counter: Rc::new(Cell::new(0)),
            margins: Margins::all(mm_from_f64(DEFAULT_MARGIN_MM)),
            header: None,
            footer_height: mm_from_f64(FOOTER_HEIGHT_MM),
            total_pages: Some(4),
        };
        assert_eq!(decorator.footer_text(2), "Page 2 / 4");
    }

    #[test]
    fn landscape_is_wider_than_tall() {
        let size = PageOrientation::Landscape.paper_size();
        assert!(size.width > size.height);
    }
}
