//! Pie chart slice geometry.

use genpdf::style::Color;

use super::path::{polar_to_cartesian, Path};
use super::Point;
use crate::data::{DataPoint, LabelChain};
use crate::palette::Palette;

/// Angle at which the first slice starts: twelve o'clock.
pub const START_ANGLE_DEG: f64 = -90.0;

/// Distance of slice labels from the center, relative to the radius.
pub const LABEL_RADIUS_FACTOR: f64 = 1.25;

/// One slice of a pie chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSegment {
    /// Value after clamping negatives and non-numbers to zero.
    pub value: f64,
    /// Share of the total, 0–100.
    pub percentage: f64,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// End angle in degrees; never smaller than `start_angle`.
    pub end_angle: f64,
    /// Sector outline.
    pub path: Path,
    /// Fill color.
    pub color: Color,
    /// Display label.
    pub label: String,
    /// Where the label is anchored: along the bisector at 125% of the radius.
    pub label_anchor: Point,
}

impl ChartSegment {
    /// Angular span in degrees.
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// A laid out pie chart.
#[derive(Clone, Debug, PartialEq)]
pub struct PieLayout {
    /// Circle center.
    pub center: Point,
    /// Circle radius.
    pub radius: f64,
    /// Sum of all (clamped) values.
    pub total: f64,
    /// One segment per input record, in input order.
    pub segments: Vec<ChartSegment>,
}

impl PieLayout {
    /// Whether there is nothing to draw: no records, or a zero total.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() || self.total <= 0.0
    }
}

/// Lays out the slices of a pie chart of diameter `size` placed at the top-left of its box.
///
/// Angles accumulate clockwise from twelve o'clock and each slice spans
/// `360 * value / total` degrees.  When the total is zero every slice is zero-sized with a
/// zero percentage; callers check [`PieLayout::is_empty`] and draw a placeholder instead.
pub fn pie_layout(
    points: &[DataPoint],
    value_field: &str,
    labels: &LabelChain,
    palette: &Palette,
    size: f64,
) -> PieLayout {
    let radius = (size / 2.0).max(0.0);
    let center = Point::new(radius, radius);
    let values: Vec<f64> = points
        .iter()
        .map(|p| p.number_or_zero(value_field).max(0.0))
        .collect();
    let total: f64 = values.iter().sum();

    let mut angle = START_ANGLE_DEG;
    let segments = points
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (point, value))| {
            let fraction = if total > 0.0 { value / total } else { 0.0 };
            let start_angle = angle;
            let end_angle = start_angle + 360.0 * fraction;
            angle = end_angle;

            let bisector = (start_angle + end_angle) / 2.0;
            ChartSegment {
                value,
                percentage: fraction * 100.0,
                start_angle,
                end_angle,
                path: sector_path(center, radius, start_angle, end_angle),
                color: palette.color(index),
                label: labels.resolve(point, index),
                label_anchor: polar_to_cartesian(center, radius * LABEL_RADIUS_FACTOR, bisector),
            }
        })
        .collect();

    PieLayout {
        center,
        radius,
        total,
        segments,
    }
}

/// Builds the outline of a circular sector.
///
/// A full circle is split into two half arcs: an SVG arc whose end point equals its start
/// point draws nothing.
pub fn sector_path(center: Point, radius: f64, start_deg: f64, end_deg: f64) -> Path {
    let span = end_deg - start_deg;
    if span <= 0.0 || radius <= 0.0 {
        return Path::new();
    }
    let start = polar_to_cartesian(center, radius, start_deg);
    if span >= 360.0 - 1e-9 {
        let middle = start_deg + 180.0;
        return Path::new()
            .move_to(start)
            .arc(center, radius, start_deg, middle)
            .arc(center, radius, middle, start_deg + 360.0)
            .close();
    }
    Path::new()
        .move_to(center)
        .line_to(start)
        .arc(center, radius, start_deg, end_deg)
        .close()
}
