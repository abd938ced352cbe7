//! Drawing surface abstraction for the render pipeline.
//!
//! The renderer only talks to [`Surface`], so it can be exercised against a
//! recording surface in tests and against an iced canvas frame at runtime.

use iced::alignment::{Horizontal, Vertical};
use iced::{Color, Point, Size};

/// A text label in device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub content: String,
    pub position: Point,
    pub color: Color,
    pub size: f32,
    pub align_x: Horizontal,
    pub align_y: Vertical,
}

impl Label {
    /// A label centered on `position`.
    pub fn centered(content: impl Into<String>, position: Point, color: Color, size: f32) -> Self {
        Self {
            content: content.into(),
            position,
            color,
            size,
            align_x: Horizontal::Center,
            align_y: Vertical::Center,
        }
    }

    /// A label whose top-left corner is at `position`.
    pub fn top_left(content: impl Into<String>, position: Point, color: Color, size: f32) -> Self {
        Self {
            content: content.into(),
            position,
            color,
            size,
            align_x: Horizontal::Left,
            align_y: Vertical::Top,
        }
    }
}

/// Minimal 2D drawing surface, in device pixels.
pub trait Surface {
    /// Device size of the surface.
    fn size(&self) -> Size;

    /// Paint the whole surface with one color.
    fn clear(&mut self, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32);

    /// Stroke a quadratic Bézier curve.
    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, color: Color, width: f32);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32);

    /// Fill a circle with a radial gradient from `inner` at the center to
    /// `outer` at the rim.
    fn fill_radial_gradient(&mut self, center: Point, radius: f32, inner: Color, outer: Color);

    fn draw_label(&mut self, label: Label);
}

/// A recorded drawing operation.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Line { from: Point, to: Point, color: Color, width: f32 },
    Quadratic { from: Point, control: Point, to: Point, color: Color, width: f32 },
    Polygon { points: Vec<Point>, color: Color },
    StrokeCircle { center: Point, radius: f32, color: Color, width: f32 },
    RadialGradient { center: Point, radius: f32, inner: Color, outer: Color },
    Text(Label),
}

/// Surface that records every call, for render tests.
#[cfg(test)]
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: Size,
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(label) => Some(label.content.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.ops.push(DrawOp::Line { from, to, color, width });
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, color: Color, width: f32) {
        self.ops.push(DrawOp::Quadratic {
            from,
            control,
            to,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32) {
        self.ops.push(DrawOp::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f32, inner: Color, outer: Color) {
        self.ops.push(DrawOp::RadialGradient {
            center,
            radius,
            inner,
            outer,
        });
    }

    fn draw_label(&mut self, label: Label) {
        self.ops.push(DrawOp::Text(label));
    }
}
