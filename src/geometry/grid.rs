//! Dashed grid lines and axis ticks.
//!
//! The PDF surface strokes solid lines only, so dashes are tessellated here: the axis is walked
//! in `dash + gap` increments and one short segment is emitted per increment.

use super::{LineSegment, Point};

/// Dash and gap lengths for tessellated lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashPattern {
    /// Length of each drawn segment.
    pub dash: f64,
    /// Length of each gap.
    pub gap: f64,
}

impl Default for DashPattern {
    fn default() -> Self {
        Self { dash: 3.0, gap: 3.0 }
    }
}

impl DashPattern {
    /// Creates a pattern.  Negative gaps are treated as zero.
    pub fn new(dash: f64, gap: f64) -> Self {
        Self {
            dash,
            gap: gap.max(0.0),
        }
    }

    fn period(&self) -> f64 {
        self.dash + self.gap
    }
}

/// Splits the interval `[start, end]` into dash intervals.
///
/// A run of length `L` yields `ceil(L / (dash + gap))` intervals, each at most `dash` long.  The
/// last interval is clipped to `end`.  Reversed bounds are swapped; a non-positive or non-finite
/// pattern yields nothing.
pub fn dash_segments(start: f64, end: f64, pattern: DashPattern) -> Vec<(f64, f64)> {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let length = end - start;
    let usable = pattern.dash > 0.0 && pattern.gap >= 0.0 && pattern.period().is_finite();
    if !usable || !length.is_finite() || length <= 0.0 {
        return Vec::new();
    }

    let period = pattern.period();
    let mut segments = Vec::with_capacity((length / period).ceil() as usize);
    let mut index = 0usize;
    loop {
        // Offsets come from the index to avoid accumulating rounding error.
        let offset = index as f64 * period;
        if offset >= length {
            break;
        }
        let from = start + offset;
        let to = (from + pattern.dash).min(end);
        segments.push((from, to));
        index += 1;
    }
    segments
}

/// Tessellates a dashed straight line from `from` to `to`.
///
/// Only horizontal and vertical lines are used by the charts, but any direction works: dashes
/// are laid out along the line's length.
pub fn dashed_line(from: Point, to: Point, pattern: DashPattern) -> Vec<LineSegment> {
    let line = LineSegment::new(from, to);
    let length = line.length();
    if length <= 0.0 {
        return Vec::new();
    }
    let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);
    dash_segments(0.0, length, pattern)
        .into_iter()
        .map(|(a, b)| {
            LineSegment::new(
                Point::new(from.x + ux * a, from.y + uy * a),
                Point::new(from.x + ux * b, from.y + uy * b),
            )
        })
        .collect()
}

/// Picks "nice" tick values from zero up to at least `max`.
///
/// Steps are 1, 2, 2.5 or 5 times a power of ten, chosen so that roughly `target_count`
/// intervals cover the range.  A non-positive `max` yields the single tick `0`.
pub fn nice_ticks(max: f64, target_count: usize) -> Vec<f64> {
    if max.is_nan() || max <= 0.0 || max.is_infinite() || target_count == 0 {
        return vec![0.0];
    }
    let raw_step = max / target_count as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|candidate| normalized <= *candidate)
        .unwrap_or(10.0);
    let step = nice * magnitude;
    let count = (max / step - 1e-9).ceil().max(1.0) as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

/// Maps tick values onto an axis of `length` units whose top value is `scale_max`.
///
/// Positions are offsets from the axis origin.  A non-positive `scale_max` maps every tick
/// to the origin.
pub fn tick_positions(ticks: &[f64], scale_max: f64, length: f64) -> Vec<f64> {
    ticks
        .iter()
        .map(|tick| {
            if scale_max > 0.0 {
                tick / scale_max * length
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dash_count_matches_ceiling() {
        let pattern = DashPattern::default();
        for length in [0.5, 3.0, 4.0, 6.0, 7.0, 12.0, 100.0, 101.3, 250.0] {
            let segments = dash_segments(10.0, 10.0 + length, pattern);
            assert_eq!(
                segments.len(),
                (length / 6.0).ceil() as usize,
                "length {length}"
            );
            for (from, to) in &segments {
                assert!(to - from <= 3.0 + 1e-9);
                assert!(*to <= 10.0 + length + 1e-9);
                assert!(from < to);
            }
        }
    }

    #[test]
    fn last_dash_is_clipped() {
        let segments = dash_segments(0.0, 7.5, DashPattern::default());
        assert_eq!(segments, vec![(0.0, 3.0), (6.0, 7.5)]);
    }

    #[test]
    fn reversed_and_empty_ranges() {
        assert_eq!(
            dash_segments(6.0, 0.0, DashPattern::default()),
            vec![(0.0, 3.0)]
        );
        assert!(dash_segments(5.0, 5.0, DashPattern::default()).is_empty());
        assert!(dash_segments(0.0, 10.0, DashPattern::new(0.0, 3.0)).is_empty());
    }

    #[test]
    fn non_finite_patterns_yield_nothing() {
        let nan_dash = DashPattern { dash: f64::NAN, gap: 3.0 };
        let nan_gap = DashPattern { dash: 3.0, gap: f64::NAN };
        let infinite = DashPattern { dash: f64::INFINITY, gap: 3.0 };
        for pattern in [nan_dash, nan_gap, infinite] {
            assert!(dash_segments(0.0, 10.0, pattern).is_empty(), "{pattern:?}");
        }
    }

    #[test]
    fn vertical_dashed_line() {
        let segments = dashed_line(
            Point::new(4.0, 0.0),
            Point::new(4.0, 13.0),
            DashPattern::default(),
        );
        assert_eq!(segments.len(), 3);
        let last = segments[2];
        assert_abs_diff_eq!(last.start.y, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.end.y, 13.0, epsilon = 1e-9);
        assert!(segments.iter().all(|s| s.start.x == 4.0 && s.end.x == 4.0));
    }

    #[test]
    fn nice_ticks_cover_max() {
        assert_eq!(nice_ticks(87.0, 4), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(nice_ticks(10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.0, 5), vec![0.0]);
        let ticks = nice_ticks(1234.0, 5);
        assert!(*ticks.last().unwrap_or(&0.0) >= 1234.0);
    }

    #[test]
    fn tick_positions_scale_linearly() {
        let positions = tick_positions(&[0.0, 50.0, 100.0], 100.0, 200.0);
        assert_eq!(positions, vec![0.0, 100.0, 200.0]);
        assert_eq!(tick_positions(&[0.0], 0.0, 200.0), vec![0.0]);
    }
}
