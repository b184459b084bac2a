//! Path primitives shared by the chart shapes.
//!
//! Paths are kept as a list of commands so the same shape can be emitted as SVG path data and
//! flattened into a polygon for surfaces that can only stroke straight lines.

use std::f64::consts::PI;
use std::fmt::Write as _;

use super::{Point, Rect};

/// Maximum angular step, in degrees, used when flattening arcs.
const ARC_FLATTEN_STEP_DEG: f64 = 5.0;

/// A single drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum PathCommand {
    /// Starts a new sub-path.
    MoveTo(Point),
    /// Straight line to the point.
    LineTo(Point),
    /// Circular arc around `center`, from `start_deg` to `end_deg`.
    ///
    /// Angles are in degrees, measured clockwise from the positive x axis in a y-down
    /// coordinate system.  The arc runs clockwise when `end_deg > start_deg`.
    Arc {
        /// Arc center.
        center: Point,
        /// Arc radius.
        radius: f64,
        /// Start angle in degrees.
        start_deg: f64,
        /// End angle in degrees.
        end_deg: f64,
    },
    /// Closes the current sub-path.
    Close,
}

/// An ordered list of [`PathCommand`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the commands.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Whether the path has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Appends a move command.
    pub fn move_to(mut self, point: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(point));
        self
    }

    /// Appends a line command.
    pub fn line_to(mut self, point: Point) -> Self {
        self.commands.push(PathCommand::LineTo(point));
        self
    }

    /// Appends an arc command.
    pub fn arc(mut self, center: Point, radius: f64, start_deg: f64, end_deg: f64) -> Self {
        self.commands.push(PathCommand::Arc {
            center,
            radius,
            start_deg,
            end_deg,
        });
        self
    }

    /// Closes the current sub-path.
    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// A closed axis-aligned rectangle.
    pub fn rect(rect: Rect) -> Self {
        Self::new()
            .move_to(Point::new(rect.x, rect.y))
            .line_to(Point::new(rect.right(), rect.y))
            .line_to(Point::new(rect.right(), rect.bottom()))
            .line_to(Point::new(rect.x, rect.bottom()))
            .close()
    }

    /// Renders the path as SVG path data (`d` attribute).
    ///
    /// Arcs become `A` commands whose large-arc flag is set when the span exceeds 180°.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = match command {
                PathCommand::MoveTo(p) => write!(out, "M {} {}", fmt_coord(p.x), fmt_coord(p.y)),
                PathCommand::LineTo(p) => write!(out, "L {} {}", fmt_coord(p.x), fmt_coord(p.y)),
                PathCommand::Arc {
                    center,
                    radius,
                    start_deg,
                    end_deg,
                } => {
                    let end = polar_to_cartesian(*center, *radius, *end_deg);
                    let span = end_deg - start_deg;
                    let large_arc = u8::from(span.abs() > 180.0);
                    let sweep = u8::from(span >= 0.0);
                    write!(
                        out,
                        "A {} {} 0 {} {} {} {}",
                        fmt_coord(*radius),
                        fmt_coord(*radius),
                        large_arc,
                        sweep,
                        fmt_coord(end.x),
                        fmt_coord(end.y)
                    )
                }
                PathCommand::Close => write!(out, "Z"),
            };
        }
        out
    }

    /// Flattens the path into polygons, one per sub-path.
    ///
    /// Arcs are approximated with chords no wider than five degrees.  An arc starts at the
    /// current point, so the path should already be positioned on the arc's start.
    pub fn flatten(&self) -> Vec<Vec<Point>> {
        let mut polygons = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(*p);
                }
                PathCommand::LineTo(p) => current.push(*p),
                PathCommand::Arc {
                    center,
                    radius,
                    start_deg,
                    end_deg,
                } => {
                    let span = end_deg - start_deg;
                    let steps = (span.abs() / ARC_FLATTEN_STEP_DEG).ceil().max(1.0) as usize;
                    if current.is_empty() {
                        current.push(polar_to_cartesian(*center, *radius, *start_deg));
                    }
                    for step in 1..=steps {
                        let angle = start_deg + span * step as f64 / steps as f64;
                        current.push(polar_to_cartesian(*center, *radius, angle));
                    }
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                }
            }
        }

        if current.len() > 1 {
            polygons.push(current);
        }
        polygons
    }
}

/// Converts a polar coordinate (degrees, y-down) to a point.
pub fn polar_to_cartesian(center: Point, radius: f64, angle_deg: f64) -> Point {
    let radians = angle_deg * PI / 180.0;
    Point::new(
        center.x + radius * radians.cos(),
        center.y + radius * radians.sin(),
    )
}

fn fmt_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // Avoid "-0".
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Which end of a bar receives the rounded corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundedEnd {
    /// Rounded right corners, for bars growing to the right.
    Right,
    /// Rounded top corners, for bars growing upwards.
    Top,
}

/// Builds a bar outline with rounded corners on its growing end.
///
/// The radius is clamped to half the bar thickness.  When the bar is shorter than twice the
/// radius a plain rectangle is returned, since the two arcs would overlap.
pub fn rounded_bar_path(rect: Rect, radius: f64, end: RoundedEnd) -> Path {
    let (length, thickness) = match end {
        RoundedEnd::Right => (rect.width, rect.height),
        RoundedEnd::Top => (rect.height, rect.width),
    };
    let radius = radius.min(thickness / 2.0).max(0.0);
    if radius <= 0.0 || length < 2.0 * radius {
        return Path::rect(rect);
    }

    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());
    match end {
        RoundedEnd::Right => Path::new()
            .move_to(Point::new(x0, y0))
            .line_to(Point::new(x1 - radius, y0))
            .arc(Point::new(x1 - radius, y0 + radius), radius, -90.0, 0.0)
            .line_to(Point::new(x1, y1 - radius))
            .arc(Point::new(x1 - radius, y1 - radius), radius, 0.0, 90.0)
            .line_to(Point::new(x0, y1))
            .close(),
        RoundedEnd::Top => Path::new()
            .move_to(Point::new(x0, y1))
            .line_to(Point::new(x0, y0 + radius))
            .arc(Point::new(x0 + radius, y0 + radius), radius, 180.0, 270.0)
            .line_to(Point::new(x1 - radius, y0))
            .arc(Point::new(x1 - radius, y0 + radius), radius, 270.0, 360.0)
            .line_to(Point::new(x1, y1))
            .close(),
    }
}
