//! Pure layout computations for the dashboard charts.
//!
//! Everything in this module works in abstract drawing units (points when used by
//! [`crate::charts`]) in a y-down coordinate system whose origin is the top-left corner of the
//! chart box.  No function here touches the PDF renderer, which keeps the geometry easy to test.

pub mod bar;
pub mod grid;
pub mod path;
pub mod pie;

pub use bar::{bar_layout, comparison_layout, BarChartLayout, BarLayoutOptions, Orientation};
pub use grid::{dash_segments, dashed_line, nice_ticks, tick_positions, DashPattern};
pub use path::{polar_to_cartesian, rounded_bar_path, Path, PathCommand, RoundedEnd};
pub use pie::{pie_layout, ChartSegment, PieLayout};

/// A point in drawing units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    pub width: f64,
    /// Height, never negative.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle, clamping negative extents to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A straight stroke between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineSegment {
    /// First end point.
    pub start: Point,
    /// Second end point.
    pub end: Point,
}

impl LineSegment {
    /// Creates a segment.
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }
}

/// Scales `value` to a length on an axis of `available` units whose maximum is `max`.
///
/// Non-positive maxima and values yield zero, so empty or all-zero datasets never divide by
/// zero.
pub fn scale_length(value: f64, max: f64, available: f64) -> f64 {
    if max > 0.0 && value > 0.0 && available > 0.0 {
        (value / max).min(1.0) * available
    } else {
        0.0
    }
}
