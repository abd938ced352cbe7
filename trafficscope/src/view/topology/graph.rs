//! Canvas-based topology graph widget.

use iced::mouse;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};

use super::render::render;
use super::surface::{Label, Surface};
use super::{TopologyState, node_at};
use crate::message::Message;
use crate::view::palette::mix;

/// Number of rings used to approximate a radial gradient.
const GRADIENT_STEPS: usize = 12;

/// Concentric discs from the rim inwards: the rim disc is `outer`, the
/// innermost disc is `inner`.
fn gradient_rings(radius: f32, inner: Color, outer: Color) -> Vec<(f32, Color)> {
    let last = (GRADIENT_STEPS - 1) as f32;
    (0..GRADIENT_STEPS)
        .map(|step| {
            let r = radius * (1.0 - step as f32 / GRADIENT_STEPS as f32);
            (r, mix(outer, inner, step as f32 / last))
        })
        .collect()
}

/// Interactive topology graph widget.
pub struct TopologyGraph;

impl TopologyGraph {
    /// Create the topology canvas.
    pub fn view(state: &TopologyState) -> Element<'_, Message> {
        Canvas::new(TopologyGraphProgram { state })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// Canvas program for the topology graph.
struct TopologyGraphProgram<'a> {
    state: &'a TopologyState,
}

impl<'a> canvas::Program<Message> for TopologyGraphProgram<'a> {
    type State = ();

    fn update(
        &self,
        _interaction: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let action = match event {
            canvas::Event::Mouse(mouse_event) => self.handle_mouse(mouse_event, bounds, cursor),
            canvas::Event::Keyboard(keyboard_event) => self.handle_keyboard(keyboard_event),
            _ => None,
        };

        action.or_else(|| {
            // Report new bounds so hit testing and the header stay in sync.
            (bounds.size() != self.state.view.viewport)
                .then(|| canvas::Action::publish(Message::ViewportResized(bounds.size())))
        })
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.state.cache.draw(renderer, bounds.size(), |frame| {
            render(frame, self.state.snapshot.as_deref(), &self.state.view);
        });

        vec![geometry]
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(position) if self.node_under(position, bounds.size()) => {
                mouse::Interaction::Pointer
            }
            _ => mouse::Interaction::default(),
        }
    }
}

impl<'a> TopologyGraphProgram<'a> {
    /// Handle mouse events.
    fn handle_mouse(
        &self,
        event: &mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let position = cursor.position_in(bounds)?;
                Some(canvas::Action::publish(Message::CanvasClicked {
                    position,
                    viewport: bounds.size(),
                }))
            }
            mouse::Event::WheelScrolled { delta } => {
                if !cursor.is_over(bounds) {
                    return None;
                }

                let scroll = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / 50.0,
                };

                if scroll > 0.0 {
                    Some(canvas::Action::publish(Message::ZoomIn))
                } else if scroll < 0.0 {
                    Some(canvas::Action::publish(Message::ZoomOut))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Handle keyboard events.
    fn handle_keyboard(&self, event: &iced::keyboard::Event) -> Option<canvas::Action<Message>> {
        use iced::keyboard::{Event, Key, key::Named};

        let Event::KeyPressed { key, .. } = event else {
            return None;
        };

        let message = match key {
            Key::Character(c) if c.as_str() == "+" || c.as_str() == "=" => Message::ZoomIn,
            Key::Character(c) if c.as_str() == "-" => Message::ZoomOut,
            Key::Character(c) if c.as_str() == "0" => Message::ZoomReset,
            Key::Named(Named::Escape) => Message::ClearSelection,
            _ => return None,
        };

        Some(canvas::Action::publish(message))
    }

    /// Whether a node sits under `position` (device pixels, canvas-relative).
    fn node_under(&self, position: Point, viewport: Size) -> bool {
        let Some(snapshot) = self.state.snapshot.as_deref() else {
            return false;
        };
        let projection = super::Projection::new(self.state.view.zoom, viewport);
        node_at(snapshot, projection.to_logical(position)).is_some()
    }
}

impl Surface for Frame {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    fn clear(&mut self, color: Color) {
        let size = Surface::size(self);
        self.fill_rectangle(Point::ORIGIN, size, color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.stroke(
            &Path::line(from, to),
            Stroke::default().with_color(color).with_width(width),
        );
    }

    fn stroke_quadratic(&mut self, from: Point, control: Point, to: Point, color: Color, width: f32) {
        let curve = Path::new(|b| {
            b.move_to(from);
            b.quadratic_curve_to(control, to);
        });
        self.stroke(&curve, Stroke::default().with_color(color).with_width(width));
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let polygon = Path::new(|b| {
            b.move_to(*first);
            for point in rest {
                b.line_to(*point);
            }
            b.close();
        });
        self.fill(&polygon, color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32) {
        self.stroke(
            &Path::circle(center, radius),
            Stroke::default().with_color(color).with_width(width),
        );
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f32, inner: Color, outer: Color) {
        for (r, color) in gradient_rings(radius, inner, outer) {
            self.fill(&Path::circle(center, r), color);
        }
    }

    fn draw_label(&mut self, label: Label) {
        self.fill_text(Text {
            content: label.content,
            position: label.position,
            color: label.color,
            size: label.size.into(),
            align_x: label.align_x.into(),
            align_y: label.align_y,
            ..Text::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_rings_span_outer_to_inner() {
        let inner = Color::from_rgb(1.0, 0.5, 0.0);
        let outer = Color::from_rgb(0.25, 0.25, 0.25);
        let rings = gradient_rings(24.0, inner, outer);

        assert_eq!(rings.len(), GRADIENT_STEPS);
        assert_eq!(rings[0], (24.0, outer));
        let (last_radius, last_color) = rings[GRADIENT_STEPS - 1];
        assert_eq!(last_color, inner);
        assert!(last_radius > 0.0);
        assert!(rings.windows(2).all(|pair| pair[1].0 < pair[0].0));
    }
}
