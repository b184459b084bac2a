//! Display lists produced by the chart builders.
//!
//! A [`Drawing`] is a list of primitives in points, y-down, relative to the top-left corner of
//! the chart box.  The PDF element in [`super::element`] replays it; tests inspect it directly.

use genpdf::style::Color;

use crate::geometry::{LineSegment, Path, Point};

/// Spacing between fill scanlines, in points.
pub const FILL_STEP: f64 = 0.5;

/// Horizontal placement of a text primitive relative to its anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Text starts at the anchor.
    #[default]
    Left,
    /// Text is centered on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

/// A single drawable item.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// An open polyline.
    Stroke {
        /// Vertices in drawing order.
        points: Vec<Point>,
        /// Stroke color.
        color: Color,
    },
    /// A filled polygon.
    Fill {
        /// Polygon vertices; the polygon is implicitly closed.
        polygon: Vec<Point>,
        /// Fill color.
        color: Color,
    },
    /// A single line of text, vertically centered on `anchor.y`.
    Text {
        /// Reference point.
        anchor: Point,
        /// Text content.
        text: String,
        /// Font size in points.
        size: u8,
        /// Text color.
        color: Color,
        /// Horizontal alignment relative to `anchor.x`.
        align: TextAlign,
        /// Bold face.
        bold: bool,
    },
}

/// A sized list of primitives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drawing {
    width: f64,
    height: f64,
    primitives: Vec<Primitive>,
}

impl Drawing {
    /// Creates an empty drawing with the given box size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            primitives: Vec::new(),
        }
    }

    /// Box width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Box height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: f64) {
        self.height = height.max(0.0);
    }

    /// Recorded primitives, in paint order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Text primitives' contents, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Strokes a straight segment.
    pub fn line(&mut self, segment: LineSegment, color: Color) {
        self.primitives.push(Primitive::Stroke {
            points: vec![segment.start, segment.end],
            color,
        });
    }

    /// Fills every sub-path of `path`, shifted by `offset`.
    pub fn fill_path(&mut self, path: &Path, offset: Point, color: Color) {
        for polygon in path.flatten() {
            let polygon: Vec<Point> = polygon
                .into_iter()
                .map(|p| Point::new(p.x + offset.x, p.y + offset.y))
                .collect();
            if polygon.len() >= 3 {
                self.primitives.push(Primitive::Fill { polygon, color });
            }
        }
    }

    /// Adds a text label.
    pub fn text(
        &mut self,
        anchor: Point,
        text: impl Into<String>,
        size: u8,
        color: Color,
        align: TextAlign,
    ) {
        self.primitives.push(Primitive::Text {
            anchor,
            text: text.into(),
            size,
            color,
            align,
            bold: false,
        });
    }

    /// Adds a bold text label.
    pub fn bold_text(
        &mut self,
        anchor: Point,
        text: impl Into<String>,
        size: u8,
        color: Color,
        align: TextAlign,
    ) {
        self.primitives.push(Primitive::Text {
            anchor,
            text: text.into(),
            size,
            color,
            align,
            bold: true,
        });
    }

    /// Whether any coordinate is NaN or infinite.
    pub fn has_invalid_coordinates(&self) -> bool {
        let bad = |p: &Point| !p.x.is_finite() || !p.y.is_finite();
        self.primitives.iter().any(|primitive| match primitive {
            Primitive::Stroke { points, .. } => points.iter().any(bad),
            Primitive::Fill { polygon, .. } => polygon.iter().any(bad),
            Primitive::Text { anchor, .. } => bad(anchor),
        })
    }
}

/// Covers a polygon with horizontal segments `step` apart (even-odd rule).
///
/// Used to paint fills on a surface that can only stroke lines.
pub fn scanlines(polygon: &[Point], step: f64) -> Vec<LineSegment> {
    if polygon.len() < 3 || step <= 0.0 {
        return Vec::new();
    }
    let (min_y, max_y) = polygon
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    if max_y.is_nan() || max_y <= min_y {
        return Vec::new();
    }

    let rows = ((max_y - min_y) / step).ceil() as usize;
    let mut lines = Vec::new();
    let mut crossings = Vec::new();
    for row in 0..rows {
        let y = (min_y + (row as f64 + 0.5) * step).min(max_y);
        crossings.clear();
        for (i, a) in polygon.iter().enumerate() {
            let b = polygon[(i + 1) % polygon.len()];
            let crosses = (a.y <= y && y < b.y) || (b.y <= y && y < a.y);
            if crosses {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            if pair[1] > pair[0] {
                lines.push(LineSegment::new(
                    Point::new(pair[0], y),
                    Point::new(pair[1], y),
                ));
            }
        }
    }
    lines
}
