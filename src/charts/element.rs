//! `genpdf` element that replays a [`Drawing`].
//!
//! `genpdf` areas can only stroke polylines and print text, so fills are painted as dense
//! horizontal scanlines and every coordinate is converted from points to millimetres.

use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

use super::drawing::{scanlines, Drawing, Primitive, TextAlign, FILL_STEP};
use crate::geometry::Point;

const MM_PER_POINT: f64 = 25.4 / 72.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn position(point: Point) -> Position {
    Position::new(
        mm_from_f64(point.x * MM_PER_POINT),
        mm_from_f64(point.y * MM_PER_POINT),
    )
}

/// Renders a chart drawing at its natural size, left aligned.
pub struct DrawingElement {
    drawing: Drawing,
}

impl DrawingElement {
    /// Wraps a drawing.
    pub fn new(drawing: Drawing) -> Self {
        Self { drawing }
    }

    /// Rendered size in millimetres.
    pub fn size(&self) -> Size {
        Size::new(
            mm_from_f64(self.drawing.width() * MM_PER_POINT),
            mm_from_f64(self.drawing.height() * MM_PER_POINT),
        )
    }
}

impl Element for DrawingElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let size = self.size();
        let mut result = RenderResult::default();
        if size.height > area.size().height {
            // Let the layout move the chart to the next page.
            result.has_more = true;
            return Ok(result);
        }

        for primitive in self.drawing.primitives() {
            match primitive {
                Primitive::Stroke { points, color } => {
                    let line_style = Style::new().with_color(*color);
                    area.draw_line(points.iter().copied().map(position).collect(), line_style);
                }
                Primitive::Fill { polygon, color } => {
                    let line_style = Style::new().with_color(*color);
                    for line in scanlines(polygon, FILL_STEP) {
                        area.draw_line(vec![position(line.start), position(line.end)], line_style);
                    }
                }
                Primitive::Text {
                    anchor,
                    text,
                    size,
                    color,
                    align,
                    bold,
                } => {
                    let mut text_style = style.with_font_size(*size).with_color(*color);
                    if *bold {
                        text_style.set_bold();
                    }
                    let string = StyledString::new(text.clone(), text_style);
                    let width = mm_to_f64(string.width(&context.font_cache));
                    let height = mm_to_f64(text_style.line_height(&context.font_cache));

                    let anchor = position(*anchor);
                    let x = mm_to_f64(anchor.x)
                        - match align {
                            TextAlign::Left => 0.0,
                            TextAlign::Center => width / 2.0,
                            TextAlign::Right => width,
                        };
                    let y = mm_to_f64(anchor.y) - height / 2.0;
                    let origin = Position::new(mm_from_f64(x.max(0.0)), mm_from_f64(y.max(0.0)));
                    if let Some(mut section) =
                        area.text_section(&context.font_cache, origin, text_style)
                    {
                        section.print_str(&string.s, string.style)?;
                    } else {
                        log::debug!("chart label `{}` does not fit its area, skipped", text);
                    }
                }
            }
        }

        result.size = size;
        Ok(result)
    }
}
