//! Chart components: geometry composed into drawings.
//!
//! Each builder takes records plus a [`ChartBlock`] description and returns a [`Drawing`].
//! Empty datasets and zero totals produce the "no data" placeholder instead of a degenerate
//! chart.

pub mod drawing;
pub mod element;

pub use drawing::{Drawing, Primitive, TextAlign};
pub use element::DrawingElement;

use genpdf::style::Color;

use crate::data::{DataPoint, LabelChain};
use crate::format::NumberFormat;
use crate::geometry::{
    comparison_layout, dashed_line, nice_ticks, pie_layout, tick_positions, BarChartLayout,
    BarLayoutOptions, DashPattern, LineSegment, Orientation, Path, Point, Rect,
};
use crate::palette::{Palette, GRID_COLOR, MUTED_TEXT_COLOR};

/// Message shown instead of a chart when there is nothing to plot.
pub const NO_DATA_MESSAGE: &str = "No data available";

const LABEL_SIZE: u8 = 7;
const PLACEHOLDER_SIZE: u8 = 9;
const LEGEND_SWATCH: f64 = 8.0;
const LEGEND_ROW: f64 = 14.0;
const LEGEND_MIN_COLUMN: f64 = 90.0;
const LEGEND_GAP: f64 = 12.0;
/// Pie labels below this share are left to the legend.
const MIN_LABELLED_PERCENT: f64 = 5.0;
const TICK_TARGET: usize = 4;

/// Kind of chart to draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartKind {
    /// Pie chart with a legend.
    #[default]
    Pie,
    /// Vertical bars.
    Bar,
    /// Horizontal bars.
    HorizontalBar,
    /// Horizontal grouped bars comparing two fields per sector.
    SectorComparison,
}

/// Description of one chart in a report.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartBlock {
    kind: ChartKind,
    title: Option<String>,
    data: Vec<DataPoint>,
    value_field: String,
    compare_field: Option<String>,
    series_names: (String, String),
    labels: LabelChain,
    width: f64,
    height: f64,
    color: Option<Color>,
}

impl ChartBlock {
    /// Creates a chart of `kind` plotting `value_field` of each record.
    pub fn new(kind: ChartKind, data: Vec<DataPoint>, value_field: impl Into<String>) -> Self {
        let (width, height) = match kind {
            ChartKind::Pie => (420.0, 180.0),
            ChartKind::Bar => (480.0, 220.0),
            ChartKind::HorizontalBar | ChartKind::SectorComparison => {
                (480.0, (data.len() as f64 * 26.0).clamp(80.0, 400.0))
            }
        };
        Self {
            kind,
            title: None,
            data,
            value_field: value_field.into(),
            compare_field: None,
            series_names: (String::new(), String::new()),
            labels: LabelChain::default(),
            width,
            height,
            color: None,
        }
    }

    /// Sets the caption printed above the chart.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the label fallback chain.
    pub fn with_labels(mut self, labels: LabelChain) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the second series for sector comparisons, with legend names for both series.
    pub fn with_comparison(
        mut self,
        compare_field: impl Into<String>,
        current_name: impl Into<String>,
        compare_name: impl Into<String>,
    ) -> Self {
        self.compare_field = Some(compare_field.into());
        self.series_names = (current_name.into(), compare_name.into());
        self
    }

    /// Overrides the chart box size, in points.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Uses a single color for bars instead of the palette's first color.
    pub fn with_color(mut self, color: impl Into<Option<Color>>) -> Self {
        self.color = color.into();
        self
    }

    /// Chart kind.
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Caption, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Records plotted by the chart.
    pub fn data(&self) -> &[DataPoint] {
        &self.data
    }

    /// Lays the chart out into a drawing.
    pub fn to_drawing(&self, palette: &Palette, format: &NumberFormat) -> Drawing {
        match self.kind {
            ChartKind::Pie => pie_chart(
                &self.data,
                &self.value_field,
                &self.labels,
                palette,
                format,
                self.width,
                self.height,
            ),
            ChartKind::Bar | ChartKind::HorizontalBar => {
                let orientation = if self.kind == ChartKind::Bar {
                    Orientation::Vertical
                } else {
                    Orientation::Horizontal
                };
                let color = self.color.unwrap_or_else(|| palette.color(0));
                bar_chart(
                    &self.data,
                    &[(self.value_field.as_str(), color)],
                    &self.labels,
                    format,
                    bar_options(orientation, self.width, self.height),
                )
            }
            ChartKind::SectorComparison => {
                let compare = self
                    .compare_field
                    .as_deref()
                    .unwrap_or(self.value_field.as_str());
                let series = [
                    (self.value_field.as_str(), palette.color(0)),
                    (compare, palette.color(1)),
                ];
                let mut drawing = bar_chart(
                    &self.data,
                    &series,
                    &self.labels,
                    format,
                    bar_options(
                        Orientation::Horizontal,
                        self.width,
                        self.height - LEGEND_ROW,
                    ),
                );
                if !self.data.is_empty() {
                    let names = [&self.series_names.0, &self.series_names.1];
                    let legend_y = self.height - LEGEND_ROW / 2.0;
                    let mut x = self.width / 4.0;
                    for ((_, color), name) in series.iter().zip(names) {
                        legend_entry(&mut drawing, Point::new(x, legend_y), *color, name);
                        x += self.width / 3.0;
                    }
                }
                drawing.set_height(self.height);
                drawing
            }
        }
    }
}

fn bar_options(orientation: Orientation, width: f64, height: f64) -> BarLayoutOptions {
    BarLayoutOptions {
        width,
        height,
        orientation,
        label_space: match orientation {
            Orientation::Vertical => 24.0,
            Orientation::Horizontal => (width * 0.3).min(140.0),
        },
        value_space: match orientation {
            Orientation::Vertical => 14.0,
            Orientation::Horizontal => 48.0,
        },
        ..BarLayoutOptions::default()
    }
}

/// Draws a centered "no data" message inside a dashed frame.
pub fn placeholder(width: f64, height: f64) -> Drawing {
    let mut drawing = Drawing::new(width, height);
    let (x0, y0, x1, y1) = (0.5, 0.5, width - 0.5, height - 0.5);
    let pattern = DashPattern::default();
    for (from, to) in [
        (Point::new(x0, y0), Point::new(x1, y0)),
        (Point::new(x1, y0), Point::new(x1, y1)),
        (Point::new(x1, y1), Point::new(x0, y1)),
        (Point::new(x0, y1), Point::new(x0, y0)),
    ] {
        for dash in dashed_line(from, to, pattern) {
            drawing.line(dash, GRID_COLOR);
        }
    }
    drawing.bold_text(
        Point::new(width / 2.0, height / 2.0),
        NO_DATA_MESSAGE,
        PLACEHOLDER_SIZE,
        MUTED_TEXT_COLOR,
        TextAlign::Center,
    );
    drawing
}

fn legend_entry(drawing: &mut Drawing, at: Point, color: Color, label: &str) {
    let swatch = Rect::new(at.x, at.y - LEGEND_SWATCH / 2.0, LEGEND_SWATCH, LEGEND_SWATCH);
    drawing.fill_path(&Path::rect(swatch), Point::default(), color);
    drawing.text(
        Point::new(at.x + LEGEND_SWATCH + 4.0, at.y),
        label,
        LABEL_SIZE,
        MUTED_TEXT_COLOR,
        TextAlign::Left,
    );
}

/// Draws a pie chart with percentage labels and a legend to the right.
///
/// The pie diameter leaves room for labels anchored at 125% of the radius.  Legend entries fill
/// columns top to bottom; entries that fit in no column are left out of the legend.
pub fn pie_chart(
    points: &[DataPoint],
    value_field: &str,
    labels: &LabelChain,
    palette: &Palette,
    format: &NumberFormat,
    width: f64,
    height: f64,
) -> Drawing {
    // Labels sit at 1.25 r, so the box is 2.6 r: 0.3 r of margin on each side of the pie.
    let diameter = (height / 1.3).min(width / 2.0 / 1.3).max(0.0);
    let layout = pie_layout(points, value_field, labels, palette, diameter);
    if layout.is_empty() {
        log::warn!("pie chart on `{value_field}` has no positive values, drawing placeholder");
        return placeholder(width, height);
    }

    let mut drawing = Drawing::new(width, height);
    let margin = (height - diameter) / 2.0;
    let offset = Point::new(margin, margin);
    for segment in &layout.segments {
        drawing.fill_path(&segment.path, offset, segment.color);
    }
    for segment in &layout.segments {
        if segment.percentage >= MIN_LABELLED_PERCENT {
            drawing.text(
                Point::new(
                    segment.label_anchor.x + offset.x,
                    segment.label_anchor.y + offset.y,
                ),
                format.percent(segment.percentage),
                LABEL_SIZE,
                MUTED_TEXT_COLOR,
                TextAlign::Center,
            );
        }
    }

    let legend_x = diameter + 2.0 * margin + LEGEND_GAP;
    let rows_per_column = ((height / LEGEND_ROW).floor() as usize).max(1);
    let legend_width = (width - legend_x).max(0.0);
    let max_columns = ((legend_width / LEGEND_MIN_COLUMN).floor() as usize).max(1);
    let count = layout.segments.len();
    let shown = count.min(rows_per_column * max_columns);
    if shown < count {
        log::warn!("pie legend shows {shown} of {count} segments, the rest do not fit");
    }
    let columns = (shown + rows_per_column - 1) / rows_per_column;
    let rows = shown.min(rows_per_column);
    let column_width = legend_width / columns.max(1) as f64;
    let top = ((height - rows as f64 * LEGEND_ROW) / 2.0).max(0.0) + LEGEND_ROW / 2.0;
    for (index, segment) in layout.segments.iter().take(shown).enumerate() {
        let label = format!("{} ({})", segment.label, format.number(segment.value, 2));
        let at = Point::new(
            legend_x + (index / rows_per_column) as f64 * column_width,
            (top + (index % rows_per_column) as f64 * LEGEND_ROW).min(height - LEGEND_ROW / 2.0),
        );
        legend_entry(&mut drawing, at, segment.color, &label);
    }
    drawing
}

/// Draws vertical or horizontal bars for one or more series, with a dashed tick grid.
pub fn bar_chart(
    points: &[DataPoint],
    series: &[(&str, Color)],
    labels: &LabelChain,
    format: &NumberFormat,
    options: BarLayoutOptions,
) -> Drawing {
    if points.is_empty() || series.is_empty() {
        log::warn!("bar chart has no records, drawing placeholder");
        return placeholder(options.width, options.height);
    }
    let layout = comparison_layout(points, series, labels, options);
    let mut drawing = Drawing::new(options.width, options.height);
    draw_grid(&mut drawing, &layout);

    for bar in &layout.bars {
        drawing.fill_path(&bar.path, Point::default(), bar.color);
        let value = format.number(bar.value, 2);
        match options.orientation {
            Orientation::Horizontal => drawing.text(
                Point::new(bar.rect.right() + 4.0, bar.rect.center().y),
                value,
                LABEL_SIZE,
                MUTED_TEXT_COLOR,
                TextAlign::Left,
            ),
            Orientation::Vertical => drawing.text(
                Point::new(bar.rect.center().x, bar.rect.y - 6.0),
                value,
                LABEL_SIZE,
                MUTED_TEXT_COLOR,
                TextAlign::Center,
            ),
        }
    }

    for (label, slot) in &layout.categories {
        match options.orientation {
            Orientation::Horizontal => drawing.text(
                Point::new(layout.plot.x - 6.0, slot.center().y),
                label.clone(),
                LABEL_SIZE,
                MUTED_TEXT_COLOR,
                TextAlign::Right,
            ),
            Orientation::Vertical => drawing.text(
                Point::new(slot.center().x, layout.plot.bottom() + 10.0),
                label.clone(),
                LABEL_SIZE,
                MUTED_TEXT_COLOR,
                TextAlign::Center,
            ),
        }
    }
    drawing
}

fn draw_grid(drawing: &mut Drawing, layout: &BarChartLayout) {
    let plot = layout.plot;
    let ticks = nice_ticks(layout.max_value, TICK_TARGET);
    // Bars are scaled to the data maximum, so only ticks inside it get a grid line.
    let scale_max = layout.max_value;
    let pattern = DashPattern::default();

    match layout.options.orientation {
        Orientation::Horizontal => {
            let positions = tick_positions(&ticks, scale_max, plot.width);
            for position in positions.into_iter().filter(|p| *p > 0.0 && *p <= plot.width) {
                let x = plot.x + position;
                for dash in dashed_line(Point::new(x, plot.y), Point::new(x, plot.bottom()), pattern) {
                    drawing.line(dash, GRID_COLOR);
                }
            }
            drawing.line(
                LineSegment::new(Point::new(plot.x, plot.y), Point::new(plot.x, plot.bottom())),
                GRID_COLOR,
            );
        }
        Orientation::Vertical => {
            let positions = tick_positions(&ticks, scale_max, plot.height);
            for position in positions.into_iter().filter(|p| *p > 0.0 && *p <= plot.height) {
                let y = plot.bottom() - position;
                for dash in dashed_line(Point::new(plot.x, y), Point::new(plot.right(), y), pattern) {
                    drawing.line(dash, GRID_COLOR);
                }
            }
            drawing.line(
                LineSegment::new(
                    Point::new(plot.x, plot.bottom()),
                    Point::new(plot.right(), plot.bottom()),
                ),
                GRID_COLOR,
            );
        }
    }
    log::debug!("bar grid: max {} with {} ticks", layout.max_value, ticks.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                DataPoint::new()
                    .with("segment_client", format!("Segment client {i}"))
                    .with("nombre_clients", *v)
            })
            .collect()
    }

    fn is_placeholder(drawing: &Drawing) -> bool {
        drawing.texts().any(|t| t == NO_DATA_MESSAGE)
    }

    #[test]
    fn empty_inputs_render_placeholders() {
        let palette = Palette::default();
        let format = NumberFormat::default();
        for kind in [
            ChartKind::Pie,
            ChartKind::Bar,
            ChartKind::HorizontalBar,
            ChartKind::SectorComparison,
        ] {
            let drawing = ChartBlock::new(kind, Vec::new(), "nombre_clients")
                .to_drawing(&palette, &format);
            assert!(is_placeholder(&drawing), "{kind:?}");
            assert!(!drawing.has_invalid_coordinates(), "{kind:?}");
        }
    }

    #[test]
    fn placeholder_message_is_bold() {
        let drawing = placeholder(200.0, 80.0);
        assert!(drawing.primitives().iter().any(|p| matches!(
            p,
            Primitive::Text { text, bold: true, .. } if text == NO_DATA_MESSAGE
        )));
    }

    #[test]
    fn zero_total_pie_renders_placeholder() {
        let drawing = ChartBlock::new(ChartKind::Pie, segments(&[0.0, 0.0]), "nombre_clients")
            .to_drawing(&Palette::default(), &NumberFormat::default());
        assert!(is_placeholder(&drawing));
    }

    #[test]
    fn all_zero_bars_have_no_invalid_coordinates() {
        let drawing =
            ChartBlock::new(ChartKind::HorizontalBar, segments(&[0.0, 0.0, 0.0]), "nombre_clients")
                .to_drawing(&Palette::default(), &NumberFormat::default());
        assert!(!is_placeholder(&drawing));
        assert!(!drawing.has_invalid_coordinates());
    }

    #[test]
    fn pie_legend_lists_every_segment() {
        let drawing = ChartBlock::new(ChartKind::Pie, segments(&[30.0, 70.0]), "nombre_clients")
            .with_labels(LabelChain::field("label").or_field("segment_client"))
            .to_drawing(&Palette::default(), &NumberFormat::default());
        let texts: Vec<&str> = drawing.texts().collect();
        assert!(texts.contains(&"Segment client 0 (30)"));
        assert!(texts.contains(&"Segment client 1 (70)"));
        assert!(texts.contains(&"70 %"));
        assert!(!drawing.has_invalid_coordinates());
    }

    fn all_points(drawing: &Drawing) -> Vec<Point> {
        drawing
            .primitives()
            .iter()
            .flat_map(|p| match p {
                Primitive::Stroke { points, .. } => points.clone(),
                Primitive::Fill { polygon, .. } => polygon.clone(),
                Primitive::Text { anchor, .. } => vec![*anchor],
            })
            .collect()
    }

    #[test]
    fn crowded_pie_stays_inside_its_box() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let drawing = ChartBlock::new(ChartKind::Pie, segments(&values), "nombre_clients")
            .with_labels(LabelChain::field("segment_client"))
            .to_drawing(&Palette::default(), &NumberFormat::default());
        let (width, height) = (drawing.width(), drawing.height());
        for point in all_points(&drawing) {
            assert!(
                (-1e-9..=width + 1e-9).contains(&point.x)
                    && (-1e-9..=height + 1e-9).contains(&point.y),
                "{point:?} outside {width} x {height}"
            );
        }

        let mut anchors: Vec<Point> = drawing
            .primitives()
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { anchor, text, .. } if text.starts_with("Segment client") => {
                    Some(*anchor)
                }
                _ => None,
            })
            .collect();
        assert_eq!(anchors.len(), 20);
        anchors.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        for pair in anchors.windows(2) {
            if pair[0].x == pair[1].x {
                assert!(pair[1].y - pair[0].y >= LEGEND_ROW - 1e-9, "{pair:?}");
            }
        }
    }

    #[test]
    fn bar_chart_draws_dashed_grid() {
        let drawing = ChartBlock::new(ChartKind::Bar, segments(&[10.0, 40.0]), "nombre_clients")
            .to_drawing(&Palette::default(), &NumberFormat::default());
        let dashes = drawing
            .primitives()
            .iter()
            .filter(|p| match p {
                Primitive::Stroke { points, color } => {
                    *color == GRID_COLOR
                        && points.len() == 2
                        && (points[1].x - points[0].x).abs() <= 3.0 + 1e-9
                }
                _ => false,
            })
            .count();
        assert!(dashes > 0);
        let fills = drawing
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Fill { .. }))
            .count();
        assert_eq!(fills, 2);
    }

    #[test]
    fn sector_comparison_has_legend() {
        let data = vec![DataPoint::new()
            .with("secteur", "Industrie")
            .with("encours", 12.0)
            .with("encours_n1", 9.0)];
        let drawing = ChartBlock::new(ChartKind::SectorComparison, data, "encours")
            .with_comparison("encours_n1", "2024", "2023")
            .with_labels(LabelChain::field("secteur"))
            .to_drawing(&Palette::default(), &NumberFormat::default());
        let texts: Vec<&str> = drawing.texts().collect();
        assert!(texts.contains(&"2024"));
        assert!(texts.contains(&"2023"));
        assert!(texts.contains(&"Industrie"));
    }
}
