//! Chart color palettes.

use std::fmt;

use genpdf::style::Color;

/// Colors used by the dashboard charts, in assignment order.
pub const DEFAULT_COLORS: &[(u8, u8, u8)] = &[
    (59, 130, 246),
    (16, 185, 129),
    (245, 158, 11),
    (239, 68, 68),
    (139, 92, 246),
    (236, 72, 153),
    (20, 184, 166),
    (249, 115, 22),
];

/// Grid lines and axes.
pub const GRID_COLOR: Color = Color::Rgb(209, 213, 219);
/// Axis labels and secondary text.
pub const MUTED_TEXT_COLOR: Color = Color::Rgb(107, 114, 128);
/// Table header text.
pub const HEADER_TEXT_COLOR: Color = Color::Rgb(30, 64, 175);

/// A non-empty list of colors indexed cyclically.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Creates a palette; falls back to the default colors when `colors` is empty.
    pub fn new(colors: impl Into<Vec<Color>>) -> Self {
        let colors = colors.into();
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    /// Parses `#RRGGBB` strings.  Invalid entries are skipped with a warning.
    pub fn from_hex<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colors: Vec<Color> = values
            .into_iter()
            .filter_map(|value| match parse_hex_color(value.as_ref()) {
                Ok(color) => Some(color),
                Err(err) => {
                    log::warn!("ignoring palette entry: {err}");
                    None
                }
            })
            .collect();
        Self::new(colors)
    }

    /// Color for the item at `index`, wrapping around the palette.
    pub fn color(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|&(r, g, b)| Color::Rgb(r, g, b))
                .collect(),
        }
    }
}

/// Error returned by [`parse_hex_color`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorParseError {
    input: String,
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a #RRGGBB color", self.input)
    }
}

impl std::error::Error for ColorParseError {}

/// Parses `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(input: &str) -> Result<Color, ColorParseError> {
    let err = || ColorParseError {
        input: input.to_string(),
    };
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(err());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Color::Rgb(r, g, b)),
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        let palette = Palette::new(vec![Color::Rgb(1, 1, 1), Color::Rgb(2, 2, 2)]);
        assert_eq!(palette.color(0), Color::Rgb(1, 1, 1));
        assert_eq!(palette.color(3), Color::Rgb(2, 2, 2));
    }

    #[test]
    fn empty_palette_uses_defaults() {
        assert_eq!(Palette::new(Vec::new()).len(), DEFAULT_COLORS.len());
        assert_eq!(Palette::from_hex(["nope"]).len(), DEFAULT_COLORS.len());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#3B82F6"), Ok(Color::Rgb(59, 130, 246)));
        assert!(parse_hex_color("#12FG34").is_err());
        assert!(parse_hex_color("#123").is_err());
    }
}
