//! Report element implementations built on top of `genpdf` primitives.
//!
//! This module turns [`crate::model`] blocks that `genpdf` has no direct equivalent for into
//! elements: KPI card rows, framed data tables with typed column alignment, headings and the
//! invisible marker used to record on which page a section starts.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::elements::{FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, RenderResult};

use crate::charts::NO_DATA_MESSAGE;
use crate::format::NumberFormat;
use crate::model::{KpiCard, TableBlock};
use crate::palette::{HEADER_TEXT_COLOR, MUTED_TEXT_COLOR};

const HEADING_SIZE: u8 = 16;
const KPI_VALUE_SIZE: u8 = 14;
const CAPTION_SIZE: u8 = 8;
const TABLE_TEXT_SIZE: u8 = 9;
const CELL_PADDING_MM: i32 = 1;

/// Shared, monotonically increasing page number written by the page decorator.
pub type PageCounter = Rc<Cell<usize>>;

/// Records the page number on which it is laid out, without taking any space.
///
/// The marker is pushed right before a section heading so outlines and tests can find the page
/// a section starts on after rendering.
pub struct SectionMarker {
    counter: PageCounter,
    page: Rc<Cell<Option<usize>>>,
}

impl SectionMarker {
    /// Creates a marker reading `counter` and writing the observed page into `page`.
    pub fn new(counter: PageCounter, page: Rc<Cell<Option<usize>>>) -> Self {
        Self { counter, page }
    }
}

impl Element for SectionMarker {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        _area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        if self.page.get().is_none() {
            self.page.set(Some(self.counter.get()));
        }
        Ok(RenderResult::default())
    }
}

/// Bold heading used for section titles.
pub fn heading(text: &str) -> Paragraph {
    Paragraph::new(StyledString::new(
        text.to_string(),
        Style::new().bold().with_font_size(HEADING_SIZE),
    ))
}

/// Small muted line, used under titles and in captions.
pub fn caption(text: &str) -> Paragraph {
    Paragraph::new(StyledString::new(
        text.to_string(),
        Style::new()
            .with_font_size(CAPTION_SIZE)
            .with_color(MUTED_TEXT_COLOR),
    ))
}

/// Paragraph announcing that a block has nothing to show.
pub fn no_data_paragraph() -> Paragraph {
    Paragraph::new(StyledString::new(
        NO_DATA_MESSAGE,
        Style::new().italic().with_color(MUTED_TEXT_COLOR),
    ))
    .aligned(Alignment::Center)
}

fn kpi_card(card: &KpiCard, accent: Color) -> LinearLayout {
    let mut layout = LinearLayout::vertical();
    layout.push(caption(card.label()));
    layout.push(Paragraph::new(StyledString::new(
        card.value().to_string(),
        Style::new()
            .bold()
            .with_font_size(KPI_VALUE_SIZE)
            .with_color(accent),
    )));
    if let Some(text) = card.caption() {
        layout.push(caption(text));
    }
    layout
}

/// Lays out KPI cards side by side in a framed row.
///
/// Returns the "no data" paragraph when `cards` is empty.
pub fn kpi_row(cards: &[KpiCard], accent: Color) -> Result<Box<dyn Element>, Error> {
    if cards.is_empty() {
        return Ok(Box::new(no_data_paragraph()));
    }

    let mut table = TableLayout::new(vec![1; cards.len()]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    let mut row = table.row();
    for card in cards {
        row.push_element(kpi_card(card, accent).padded(CELL_PADDING_MM));
    }
    row.push()?;
    Ok(Box::new(table))
}

fn cell(text: String, style: Style, alignment: Alignment) -> impl Element {
    Paragraph::new(StyledString::new(text, style))
        .aligned(alignment)
        .padded(CELL_PADDING_MM)
}

/// Builds a framed table for `block`.
///
/// The header row is bold and colored.  Numeric columns are right aligned and formatted with
/// `format`; missing cells stay empty.  An empty block yields the "no data" paragraph.
pub fn data_table(block: &TableBlock, format: &NumberFormat) -> Result<Box<dyn Element>, Error> {
    if block.is_empty() {
        return Ok(Box::new(no_data_paragraph()));
    }

    let columns = block.columns();
    let mut table = TableLayout::new(vec![1; columns.len()]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, true));

    let header_style = Style::new()
        .bold()
        .with_font_size(TABLE_TEXT_SIZE)
        .with_color(HEADER_TEXT_COLOR);
    let mut header = table.row();
    for column in columns {
        header.push_element(cell(
            column.title().to_string(),
            header_style,
            column.alignment().into(),
        ));
    }
    header.push()?;

    let body_style = Style::new().with_font_size(TABLE_TEXT_SIZE);
    for record in block.rows() {
        let mut row = table.row();
        for column in columns {
            let text = format.cell(record.get(column.key()));
            row.push_element(cell(text, body_style, column.alignment().into()));
        }
        row.push()?;
    }

    log::debug!(
        "table laid out with {} columns and {} rows",
        columns.len(),
        block.rows().len()
    );
    Ok(Box::new(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPoint;

    #[test]
    fn empty_inputs_do_not_fail() {
        assert!(kpi_row(&[], HEADER_TEXT_COLOR).is_ok());
        assert!(data_table(&TableBlock::default(), &NumberFormat::default()).is_ok());
    }

    #[test]
    fn table_rows_are_accepted() {
        let rows = vec![
            DataPoint::new().with("secteur", "BTP").with("encours", 1200),
            DataPoint::new().with("secteur", "Commerce"),
        ];
        let block = TableBlock::from_records(&rows);
        assert!(data_table(&block, &NumberFormat::default()).is_ok());
    }
}
