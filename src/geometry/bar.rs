//! Bar chart layout for vertical, horizontal and grouped (comparison) bars.

use genpdf::style::Color;

use super::path::{rounded_bar_path, Path, RoundedEnd};
use super::{scale_length, Rect};
use crate::data::{DataPoint, LabelChain};

/// Direction in which bars grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Bars grow upwards from a baseline; categories run along the x axis.
    #[default]
    Vertical,
    /// Bars grow to the right; categories run down the y axis.
    Horizontal,
}

/// Sizing options for a bar chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarLayoutOptions {
    /// Chart box width.
    pub width: f64,
    /// Chart box height.
    pub height: f64,
    /// Growth direction.
    pub orientation: Orientation,
    /// Space reserved for category labels (left for horizontal, bottom for vertical).
    pub label_space: f64,
    /// Space reserved for value labels past the bar ends.
    pub value_space: f64,
    /// Fraction of each category slot left empty between bars, 0–1.
    pub gap_ratio: f64,
    /// Corner radius on the bars' growing end.
    pub corner_radius: f64,
}

impl Default for BarLayoutOptions {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 220.0,
            orientation: Orientation::Vertical,
            label_space: 24.0,
            value_space: 16.0,
            gap_ratio: 0.3,
            corner_radius: 3.0,
        }
    }
}

impl BarLayoutOptions {
    /// The region bars are drawn in, inside the reserved label areas.
    pub fn plot_area(&self) -> Rect {
        match self.orientation {
            Orientation::Vertical => Rect::new(
                0.0,
                self.value_space,
                self.width,
                self.height - self.value_space - self.label_space,
            ),
            Orientation::Horizontal => Rect::new(
                self.label_space,
                0.0,
                self.width - self.label_space - self.value_space,
                self.height,
            ),
        }
    }
}

/// One drawn bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    /// Index of the source record.
    pub index: usize,
    /// Index of the series for grouped charts, 0 otherwise.
    pub series: usize,
    /// Value after clamping negatives and non-numbers to zero.
    pub value: f64,
    /// Category label.
    pub label: String,
    /// Bar bounds.
    pub rect: Rect,
    /// Outline with rounded growing end.
    pub path: Path,
    /// Fill color.
    pub color: Color,
}

impl Bar {
    /// Extent along the growth direction.
    pub fn length(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.rect.height,
            Orientation::Horizontal => self.rect.width,
        }
    }
}

/// A laid out bar chart.
#[derive(Clone, Debug, PartialEq)]
pub struct BarChartLayout {
    /// Options the layout was computed with.
    pub options: BarLayoutOptions,
    /// Bars region.
    pub plot: Rect,
    /// Largest value across all bars; the full plot length corresponds to it.
    pub max_value: f64,
    /// Category slots, one per record: `(label, slot bounds)`.
    pub categories: Vec<(String, Rect)>,
    /// Bars in record order, series-major within a record.
    pub bars: Vec<Bar>,
}

impl BarChartLayout {
    /// Whether the chart has no records to show.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Lays out one bar per record.
///
/// Bar length is `value / max(values)` of the plot length; thickness is the plot's cross
/// extent divided by the record count, minus the configured gap.  A zero maximum yields
/// zero-length bars.
pub fn bar_layout(
    points: &[DataPoint],
    value_field: &str,
    labels: &LabelChain,
    color: Color,
    options: BarLayoutOptions,
) -> BarChartLayout {
    comparison_layout(points, &[(value_field, color)], labels, options)
}

/// Lays out one group of bars per record, one bar per `(field, color)` series.
///
/// All series share one scale whose maximum is the largest value of any series.
pub fn comparison_layout(
    points: &[DataPoint],
    series: &[(&str, Color)],
    labels: &LabelChain,
    options: BarLayoutOptions,
) -> BarChartLayout {
    let plot = options.plot_area();
    let value = |point: &DataPoint, field: &str| point.number_or_zero(field).max(0.0);
    let max_value = points
        .iter()
        .flat_map(|p| series.iter().map(move |(field, _)| value(p, *field)))
        .fold(0.0_f64, f64::max);

    let (cross_len, main_len) = match options.orientation {
        Orientation::Vertical => (plot.width, plot.height),
        Orientation::Horizontal => (plot.height, plot.width),
    };
    let slot = if points.is_empty() {
        0.0
    } else {
        cross_len / points.len() as f64
    };
    let gap = slot * options.gap_ratio.clamp(0.0, 0.9);
    let group = slot - gap;
    let thickness = if series.is_empty() {
        0.0
    } else {
        group / series.len() as f64
    };

    let mut categories = Vec::with_capacity(points.len());
    let mut bars = Vec::with_capacity(points.len() * series.len());

    for (index, point) in points.iter().enumerate() {
        let label = labels.resolve(point, index);
        let slot_start = index as f64 * slot;
        let slot_rect = match options.orientation {
            Orientation::Vertical => Rect::new(plot.x + slot_start, plot.y, slot, plot.height),
            Orientation::Horizontal => Rect::new(plot.x, plot.y + slot_start, plot.width, slot),
        };

        for (series_index, (field, color)) in series.iter().enumerate() {
            let v = value(point, *field);
            let length = scale_length(v, max_value, main_len);
            let offset = slot_start + gap / 2.0 + series_index as f64 * thickness;
            let (rect, end) = match options.orientation {
                Orientation::Vertical => (
                    Rect::new(plot.x + offset, plot.bottom() - length, thickness, length),
                    RoundedEnd::Top,
                ),
                Orientation::Horizontal => (
                    Rect::new(plot.x, plot.y + offset, length, thickness),
                    RoundedEnd::Right,
                ),
            };
            bars.push(Bar {
                index,
                series: series_index,
                value: v,
                label: label.clone(),
                rect,
                path: rounded_bar_path(rect, options.corner_radius, end),
                color: *color,
            });
        }
        categories.push((label, slot_rect));
    }

    BarChartLayout {
        options,
        plot,
        max_value,
        categories,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const BLUE: Color = Color::Rgb(0, 0, 255);
    const RED: Color = Color::Rgb(255, 0, 0);

    fn sectors(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                DataPoint::new()
                    .with("secteur", format!("Secteur {i}"))
                    .with("encours", *v)
            })
            .collect()
    }

    fn horizontal() -> BarLayoutOptions {
        BarLayoutOptions {
            width: 300.0,
            height: 120.0,
            orientation: Orientation::Horizontal,
            label_space: 80.0,
            value_space: 20.0,
            gap_ratio: 0.25,
            corner_radius: 2.0,
        }
    }

    #[test]
    fn longest_bar_fills_plot() {
        let layout = bar_layout(
            &sectors(&[50.0, 200.0, 100.0]),
            "encours",
            &LabelChain::field("secteur"),
            BLUE,
            horizontal(),
        );
        assert_eq!(layout.max_value, 200.0);
        assert_abs_diff_eq!(layout.bars[1].rect.width, 200.0);
        assert_abs_diff_eq!(layout.bars[0].rect.width, 50.0);
        assert_abs_diff_eq!(layout.bars[0].rect.x, 80.0);
        // 120 / 3 = 40 per slot, 25% gap.
        assert_abs_diff_eq!(layout.bars[2].rect.height, 30.0);
        assert_abs_diff_eq!(layout.bars[2].rect.y, 85.0);
    }

    #[test]
    fn lengths_are_monotonic_in_value() {
        let values = [5.0, 1.0, 9.0, 3.0, 9.0, 0.0];
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let layout = bar_layout(
                &sectors(&values),
                "encours",
                &LabelChain::field("secteur"),
                BLUE,
                BarLayoutOptions {
                    orientation,
                    ..BarLayoutOptions::default()
                },
            );
            for a in &layout.bars {
                for b in &layout.bars {
                    if a.value < b.value {
                        assert!(a.length(orientation) <= b.length(orientation));
                    }
                }
            }
        }
    }

    #[test]
    fn vertical_bars_sit_on_baseline() {
        let layout = bar_layout(
            &sectors(&[2.0, 4.0]),
            "encours",
            &LabelChain::field("secteur"),
            BLUE,
            BarLayoutOptions::default(),
        );
        for bar in &layout.bars {
            assert_abs_diff_eq!(bar.rect.bottom(), layout.plot.bottom(), epsilon = 1e-9);
        }
        assert_abs_diff_eq!(layout.bars[1].rect.height, layout.plot.height);
    }

    #[test]
    fn zero_max_gives_zero_length_bars() {
        let layout = bar_layout(
            &sectors(&[0.0, 0.0]),
            "encours",
            &LabelChain::field("secteur"),
            BLUE,
            horizontal(),
        );
        assert_eq!(layout.max_value, 0.0);
        assert!(layout.bars.iter().all(|b| b.rect.width == 0.0));
        assert!(layout.bars.iter().all(|b| !b.rect.y.is_nan()));
    }

    #[test]
    fn empty_dataset_has_no_bars() {
        let layout = bar_layout(&[], "encours", &LabelChain::default(), BLUE, horizontal());
        assert!(layout.is_empty());
        assert!(layout.bars.is_empty());
    }

    #[test]
    fn comparison_shares_one_scale() {
        let points = vec![
            DataPoint::new()
                .with("secteur", "BTP")
                .with("actuel", 40.0)
                .with("precedent", 80.0),
            DataPoint::new()
                .with("secteur", "Commerce")
                .with("actuel", 20.0)
                .with("precedent", 10.0),
        ];
        let layout = comparison_layout(
            &points,
            &[("actuel", BLUE), ("precedent", RED)],
            &LabelChain::field("secteur"),
            horizontal(),
        );
        assert_eq!(layout.bars.len(), 4);
        assert_eq!(layout.max_value, 80.0);
        assert_abs_diff_eq!(layout.bars[1].rect.width, 200.0);
        assert_abs_diff_eq!(layout.bars[0].rect.width, 100.0);
        assert_eq!(layout.bars[1].color, RED);
        assert!(layout.bars[1].rect.y > layout.bars[0].rect.y);
    }
}
