//! Data structures describing the logical content of a report document.
//!
//! The types in this module describe *what* goes on the pages (cover, sections, KPI cards,
//! charts, tables) without referencing the renderer's elements, so a report can be assembled
//! from API records and inspected in tests before any font is loaded.  [`crate::builder`]
//! turns them into `genpdf` elements.

use crate::charts::ChartBlock;
use crate::data::DataPoint;
use crate::richtext::Span;

/// Horizontal alignment of paragraphs and table columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
}

impl From<HorizontalAlignment> for genpdf::Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => genpdf::Alignment::Left,
            HorizontalAlignment::Center => genpdf::Alignment::Center,
            HorizontalAlignment::Right => genpdf::Alignment::Right,
        }
    }
}

/// Rich text paragraph carrying inline styling information and alignment metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans using left alignment.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the configured alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A small panel showing one summary metric.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiCard {
    label: String,
    value: String,
    caption: Option<String>,
}

impl KpiCard {
    /// Creates a card from an already formatted value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            caption: None,
        }
    }

    /// Metric name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Formatted metric value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Secondary line under the value, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Sets the caption and returns the updated card.
    pub fn with_caption(mut self, caption: impl Into<Option<String>>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// A table column derived from record keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    key: String,
    title: String,
    numeric: bool,
}

impl TableColumn {
    /// Record field the column reads.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Header text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether any row holds a number in this column.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Numeric columns are right aligned, everything else left aligned.
    pub fn alignment(&self) -> HorizontalAlignment {
        if self.numeric {
            HorizontalAlignment::Right
        } else {
            HorizontalAlignment::Left
        }
    }
}

/// Tabular content built from records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableBlock {
    columns: Vec<TableColumn>,
    rows: Vec<DataPoint>,
}

impl TableBlock {
    /// Builds a table whose columns are the keys of the first record.
    ///
    /// A column is numeric when any row holds a JSON number for it.
    pub fn from_records(records: &[DataPoint]) -> Self {
        let columns = records
            .first()
            .map(|first| {
                first
                    .keys()
                    .map(|key| TableColumn {
                        key: key.to_string(),
                        title: key.to_string(),
                        numeric: records.iter().any(|row| row.is_numeric(key)),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            columns,
            rows: records.to_vec(),
        }
    }

    /// Replaces header texts for the given keys.
    pub fn with_titles<'a, I>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, title) in titles {
            if let Some(column) = self.columns.iter_mut().find(|c| c.key == key) {
                column.title = title.to_string();
            }
        }
        self
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[DataPoint] {
        &self.rows
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Individual content blocks that make up sections and the cover.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// A row of KPI cards.
    Kpis(Vec<KpiCard>),
    /// A chart drawn from records.
    Chart(ChartBlock),
    /// A data table.
    Table(TableBlock),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Convenience helper for building a paragraph block.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    /// Convenience helper for building a table block from records.
    pub fn table(records: &[DataPoint]) -> Self {
        Self::Table(TableBlock::from_records(records))
    }

    /// Convenience helper that yields an explicit page break block.
    pub fn page_break() -> Self {
        Self::PageBreak
    }
}

/// Metadata that describes the cover page of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Cover {
    title: String,
    subtitle: Option<String>,
    blocks: Vec<Block>,
}

impl Cover {
    /// Creates a new cover with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            blocks: Vec::new(),
        }
    }

    /// Returns the title shown on the cover page.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the subtitle, if any.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Returns the content blocks rendered on the cover page.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Sets the subtitle and returns the updated cover.
    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Appends a block to the cover and returns the updated instance.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the cover with multiple blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }
}

/// Logical representation of a document section.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    title: Option<String>,
    blocks: Vec<Block>,
}

impl Section {
    /// Creates a new section with the provided heading.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            blocks: Vec::new(),
        }
    }

    /// Creates a section without a heading, used for bare pages.
    pub fn untitled() -> Self {
        Self {
            title: None,
            blocks: Vec::new(),
        }
    }

    /// Returns the heading of the section, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the blocks contained in the section.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Creates a builder that can inject an initial page break.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }

    pub(crate) fn starts_with_page_break(&self) -> bool {
        matches!(self.blocks.first(), Some(Block::PageBreak))
    }

    pub(crate) fn with_leading_page_break(mut self) -> Self {
        if !self.starts_with_page_break() {
            self.blocks.insert(0, Block::PageBreak);
        }
        self
    }
}

/// Builder for [`Section`] values.
///
/// Callers can opt in to inserting a page break at the beginning of the section via
/// [`SectionBuilder::start_on_new_page`].
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    title: String,
    blocks: Vec<Block>,
    start_on_new_page: bool,
}

impl SectionBuilder {
    /// Creates a builder for a section with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the section to start on a new page.
    pub fn start_on_new_page(mut self, start_on_new_page: bool) -> Self {
        self.start_on_new_page = start_on_new_page;
        self
    }

    /// Pushes an additional block into the section.
    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the builder with multiple blocks.
    pub fn extend_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Builds the final section, injecting a leading page break when requested.
    pub fn build(self) -> Section {
        let section = Section::new(self.title).with_blocks(self.blocks);
        if self.start_on_new_page {
            section.with_leading_page_break()
        } else {
            section
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<DataPoint> {
        crate::data::records_from_value(json!([
            { "secteur": "BTP", "encours": "n/a", "clients": "12" },
            { "secteur": "Commerce", "encours": 1200.5, "clients": "7" }
        ]))
    }

    #[test]
    fn builder_inserts_page_break() {
        let section = Section::builder("Segmentation")
            .start_on_new_page(true)
            .push_block(Block::paragraph(Vec::new()))
            .build();

        assert!(matches!(section.blocks().first(), Some(Block::PageBreak)));
    }

    #[test]
    fn builder_does_not_duplicate_page_break() {
        let section = Section::builder("Segmentation")
            .start_on_new_page(true)
            .push_block(Block::PageBreak)
            .build();

        assert!(matches!(section.blocks().first(), Some(Block::PageBreak)));
        assert_eq!(section.blocks().len(), 1);
    }

    #[test]
    fn numeric_columns_detected_from_any_row() {
        let table = TableBlock::from_records(&records());
        let numeric: Vec<bool> = table.columns().iter().map(TableColumn::is_numeric).collect();
        // "clients" only holds numeric strings, which do not count.
        assert_eq!(numeric, vec![false, true, false]);
        assert_eq!(table.columns()[1].alignment(), HorizontalAlignment::Right);
    }

    #[test]
    fn titles_replace_headers() {
        let table = TableBlock::from_records(&records()).with_titles([("encours", "Encours (€)")]);
        assert_eq!(table.columns()[1].title(), "Encours (€)");
        assert_eq!(table.columns()[0].title(), "secteur");
    }

    #[test]
    fn empty_table() {
        assert!(TableBlock::from_records(&[]).is_empty());
    }
}
