//! JSON description of a custom report, consumed by the `report` subcommand.
//!
//! ```json
//! {
//!   "title": "Portefeuille",
//!   "subtitle": "Mars 2024",
//!   "sections": [
//!     { "title": "Synthèse", "blocks": [
//!       { "type": "kpis", "cards": [{ "label": "Encours", "value": 1250000 }] },
//!       { "type": "chart", "kind": "pie", "data": [...], "value_field": "montant",
//!         "label_fields": ["segment"] }
//!     ] }
//!   ]
//! }
//! ```

use dashboard_report::builder::ReportBuilder;
use dashboard_report::charts::{ChartBlock, ChartKind};
use dashboard_report::data::{DataPoint, LabelChain};
use dashboard_report::format::NumberFormat;
use dashboard_report::model::{Block, Cover, KpiCard, Section};
use dashboard_report::richtext::Span;
use serde::Deserialize;
use serde_json::Value;

const LABEL_MAX_CHARS: usize = 24;

#[derive(Debug, Deserialize)]
pub struct ReportDefinition {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub cover: Vec<BlockDefinition>,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct SectionDefinition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub new_page: bool,
    #[serde(default)]
    pub blocks: Vec<BlockDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDefinition {
    Paragraph {
        text: String,
        #[serde(default)]
        bold: bool,
    },
    Kpis {
        cards: Vec<KpiDefinition>,
    },
    Chart(ChartDefinition),
    Table {
        #[serde(default)]
        data: Vec<DataPoint>,
    },
    PageBreak,
}

#[derive(Debug, Deserialize)]
pub struct KpiDefinition {
    pub label: String,
    pub value: Value,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKindDefinition {
    Pie,
    Bar,
    HorizontalBar,
    SectorComparison,
}

impl From<ChartKindDefinition> for ChartKind {
    fn from(kind: ChartKindDefinition) -> Self {
        match kind {
            ChartKindDefinition::Pie => ChartKind::Pie,
            ChartKindDefinition::Bar => ChartKind::Bar,
            ChartKindDefinition::HorizontalBar => ChartKind::HorizontalBar,
            ChartKindDefinition::SectorComparison => ChartKind::SectorComparison,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartDefinition {
    pub kind: ChartKindDefinition,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
    pub value_field: String,
    #[serde(default)]
    pub label_fields: Vec<String>,
    #[serde(default)]
    pub compare_field: Option<String>,
    #[serde(default)]
    pub series_names: Option<(String, String)>,
}

impl ChartDefinition {
    fn into_block(self) -> ChartBlock {
        let labels = if self.label_fields.is_empty() {
            LabelChain::default()
        } else {
            LabelChain::from_fields(self.label_fields, "Segment")
        }
        .truncated(LABEL_MAX_CHARS);

        let mut chart = ChartBlock::new(self.kind.into(), self.data, self.value_field)
            .with_title(self.title)
            .with_labels(labels);
        if let Some(compare_field) = self.compare_field {
            let (current, previous) = self
                .series_names
                .unwrap_or_else(|| ("Current".to_string(), "Previous".to_string()));
            chart = chart.with_comparison(compare_field, current, previous);
        }
        chart
    }
}

fn kpi_value(value: &Value, format: &NumberFormat) -> String {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|v| format.number(v, 2))
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

impl BlockDefinition {
    fn into_block(self, format: &NumberFormat) -> Block {
        match self {
            BlockDefinition::Paragraph { text, bold } => {
                let span = Span::new(text);
                Block::paragraph(vec![if bold { span.bold() } else { span }])
            }
            BlockDefinition::Kpis { cards } => Block::Kpis(
                cards
                    .into_iter()
                    .map(|card| {
                        KpiCard::new(card.label, kpi_value(&card.value, format))
                            .with_caption(card.caption)
                    })
                    .collect(),
            ),
            BlockDefinition::Chart(chart) => Block::Chart(chart.into_block()),
            BlockDefinition::Table { data } => Block::table(&data),
            BlockDefinition::PageBreak => Block::PageBreak,
        }
    }
}

impl ReportDefinition {
    /// Applies the definition to `builder`, which carries fonts, palette and margins.
    pub fn apply(self, mut builder: ReportBuilder, format: &NumberFormat) -> ReportBuilder {
        let cover = Cover::new(self.title.clone())
            .with_subtitle(self.subtitle)
            .with_blocks(self.cover.into_iter().map(|block| block.into_block(format)));
        builder = builder.with_title(self.title).with_cover(cover);

        for section in self.sections {
            let blocks = section
                .blocks
                .into_iter()
                .map(|block| block.into_block(format));
            builder = match section.title {
                Some(title) => builder.add_section(
                    Section::builder(title)
                        .start_on_new_page(section.new_page)
                        .extend_blocks(blocks)
                        .build(),
                ),
                None => builder.add_page(blocks),
            };
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_block_type() {
        let definition: ReportDefinition = serde_json::from_str(
            r#"{
                "title": "Portefeuille",
                "sections": [
                    { "title": "Synthèse", "new_page": true, "blocks": [
                        { "type": "paragraph", "text": "Vue d'ensemble", "bold": true },
                        { "type": "kpis", "cards": [{ "label": "Encours", "value": 1250000.5 }] },
                        { "type": "chart", "kind": "sector_comparison", "value_field": "n",
                          "compare_field": "n_1", "data": [{ "secteur": "BTP", "n": 3, "n_1": 2 }],
                          "label_fields": ["secteur"] },
                        { "type": "table", "data": [{ "a": 1 }] },
                        { "type": "page_break" }
                    ] },
                    { "blocks": [] }
                ]
            }"#,
        )
        .unwrap();

        let builder = definition.apply(ReportBuilder::new(), &NumberFormat::default());
        assert_eq!(builder.cover().map(Cover::title), Some("Portefeuille"));
        assert_eq!(builder.sections().len(), 2);

        let first = &builder.sections()[0];
        assert!(matches!(first.blocks()[0], Block::PageBreak));
        match &first.blocks()[2] {
            Block::Kpis(cards) => assert_eq!(cards[0].value(), "1 250 000,5"),
            other => panic!("unexpected block {other:?}"),
        }
        assert!(matches!(
            &first.blocks()[3],
            Block::Chart(chart) if chart.kind() == ChartKind::SectorComparison
        ));
        assert_eq!(builder.sections()[1].title(), None);
    }
}
