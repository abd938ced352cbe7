//! Render pipeline for the traffic topology.
//!
//! [`render`] repaints the whole surface from a snapshot and the view state.
//! Draw order, back to front: background, layer bands, edges, nodes,
//! overlays. Node and edge counts are small, so there is no incremental
//! diffing.

use std::f32::consts::FRAC_PI_6;

use iced::{Point, Vector};

use trafficscope_common::{
    HealthStatus, LOGICAL_WIDTH, Layer, Position, ServiceNode, Snapshot, TrafficEdge,
};

use super::ViewState;
use super::projection::Projection;
use super::surface::{Label, Surface};
use crate::view::palette::{Palette, with_alpha};

/// Node radius in logical units. Also the hit-test radius.
pub const NODE_RADIUS: f32 = 25.0;

/// Volume at which an edge reaches full intensity.
pub const INTENSITY_SATURATION: f64 = 200.0;

/// Curve parameter at which the arrowhead sits.
pub const ARROW_T: f32 = 0.7;

/// Upward offset of the Bézier control point from the edge midpoint.
pub const CONTROL_LIFT: f32 = 20.0;

/// Edges above this volume get a rate label.
pub const RATE_LABEL_THRESHOLD: f64 = 50.0;

/// Top of the first layer band, in logical units.
pub const BAND_ORIGIN: f32 = 20.0;

/// Height of each layer band, in logical units.
pub const BAND_HEIGHT: f32 = 100.0;

/// Maximum characters per word in node labels.
const LABEL_WORD_CHARS: usize = 6;

const LABEL_LINE_HEIGHT: f32 = 11.0;
const LABEL_FONT_SIZE: f32 = 9.0;
const BAND_FONT_SIZE: f32 = 11.0;
const RATE_FONT_SIZE: f32 = 9.0;

/// Traffic intensity in `[0, 1]`: `min(1, volume / 200)`.
pub fn intensity(volume: f64) -> f32 {
    if !volume.is_finite() || volume <= 0.0 {
        return 0.0;
    }
    (volume / INTENSITY_SATURATION).min(1.0) as f32
}

/// Visual weight of an edge, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub alpha: f32,
    pub width: f32,
    pub arrow_size: f32,
}

impl EdgeStyle {
    pub fn for_volume(volume: f64) -> Self {
        let i = intensity(volume);
        Self {
            alpha: i,
            width: 1.0 + 3.0 * i,
            arrow_size: 6.0 + 6.0 * i,
        }
    }
}

/// Control point of the curve between two logical points.
pub fn control_point(from: Position, to: Position) -> Position {
    Position::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0 - CONTROL_LIFT)
}

/// Point on a quadratic Bézier curve at parameter `t`.
pub fn quadratic_point(p0: Point, c: Point, p2: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * c.x + t * t * p2.x,
        u * u * p0.y + 2.0 * u * t * c.y + t * t * p2.y,
    )
}

/// Derivative of a quadratic Bézier curve at parameter `t`.
pub fn quadratic_tangent(p0: Point, c: Point, p2: Point, t: f32) -> Vector {
    let u = 1.0 - t;
    Vector::new(
        2.0 * u * (c.x - p0.x) + 2.0 * t * (p2.x - c.x),
        2.0 * u * (c.y - p0.y) + 2.0 * t * (p2.y - c.y),
    )
}

/// Triangle with its tip at `tip`, pointing along `direction`.
pub fn arrowhead(tip: Point, direction: Vector, size: f32) -> [Point; 3] {
    let angle = direction.y.atan2(direction.x);
    let wing = |a: f32| Point::new(tip.x - size * a.cos(), tip.y - size * a.sin());
    [tip, wing(angle - FRAC_PI_6), wing(angle + FRAC_PI_6)]
}

/// Split a display name into label lines, one word per line, each word cut
/// to six characters.
pub fn label_lines(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|word| word.chars().take(LABEL_WORD_CHARS).collect())
        .collect()
}

/// Format a traffic rate for edge labels.
pub fn format_rate(volume: f64) -> String {
    if volume >= 1_000_000.0 {
        format!("{:.1}M/s", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.1}k/s", volume / 1_000.0)
    } else {
        format!("{:.0}/s", volume)
    }
}

/// Ring width (logical units) for a health status.
fn health_ring_width(health: HealthStatus) -> f32 {
    match health {
        HealthStatus::Healthy => 3.0,
        HealthStatus::Unhealthy => 5.0,
        HealthStatus::Unknown => 2.0,
    }
}

/// Repaint the surface.
///
/// Zero-size surfaces are skipped; the next trigger will draw again.
pub fn render(surface: &mut impl Surface, snapshot: Option<&Snapshot>, view: &ViewState) {
    let projection = Projection::new(view.zoom, surface.size());
    if !projection.is_drawable() {
        tracing::trace!("Skipping render of zero-size surface");
        return;
    }

    let palette = Palette::default();

    surface.clear(palette.background);
    draw_bands(surface, &projection, &palette);

    match snapshot {
        Some(snapshot) => {
            for edge in &snapshot.edges {
                draw_edge(surface, &projection, &palette, snapshot, edge);
            }
            for node in &snapshot.nodes {
                let selected = view.selected_node.as_deref() == Some(node.id.as_str());
                draw_node(surface, &projection, &palette, node, selected);
            }
        }
        None => {
            let size = surface.size();
            surface.draw_label(Label::centered(
                "Waiting for topology snapshot...",
                Point::new(size.width / 2.0, size.height / 2.0),
                palette.text_muted,
                16.0,
            ));
        }
    }

    draw_zoom_indicator(surface, &projection, &palette);
}

/// Separator line and label for each layer band.
fn draw_bands(surface: &mut impl Surface, projection: &Projection, palette: &Palette) {
    for (i, layer) in Layer::BANDED.iter().enumerate() {
        let top = BAND_ORIGIN + i as f32 * BAND_HEIGHT;

        surface.stroke_line(
            projection.to_device(Position::new(0.0, top)),
            projection.to_device(Position::new(LOGICAL_WIDTH, top)),
            palette.band_line,
            projection.scale(1.0),
        );

        surface.draw_label(Label::top_left(
            layer.label(),
            projection.to_device(Position::new(8.0, top + 6.0)),
            with_alpha(palette.layer(*layer), 0.8),
            projection.scale(BAND_FONT_SIZE),
        ));
    }
}

fn draw_edge(
    surface: &mut impl Surface,
    projection: &Projection,
    palette: &Palette,
    snapshot: &Snapshot,
    edge: &TrafficEdge,
) {
    // Normalized snapshots have no dangling edges.
    let (Some(from), Some(to)) = (snapshot.node(&edge.source), snapshot.node(&edge.target)) else {
        return;
    };

    let style = EdgeStyle::for_volume(edge.volume);
    let color = with_alpha(palette.edge(edge.kind), style.alpha);

    let p0 = projection.to_device(from.position);
    let p2 = projection.to_device(to.position);
    let c = projection.to_device(control_point(from.position, to.position));

    surface.stroke_quadratic(p0, c, p2, color, projection.scale(style.width));

    let tip = quadratic_point(p0, c, p2, ARROW_T);
    let direction = quadratic_tangent(p0, c, p2, ARROW_T);
    surface.fill_polygon(
        &arrowhead(tip, direction, projection.scale(style.arrow_size)),
        color,
    );

    if edge.volume > RATE_LABEL_THRESHOLD {
        let mid = quadratic_point(p0, c, p2, 0.5);
        surface.draw_label(Label::centered(
            format_rate(edge.volume),
            Point::new(mid.x, mid.y - projection.scale(8.0)),
            palette.edge(edge.kind),
            projection.scale(RATE_FONT_SIZE),
        ));
    }
}

fn draw_node(
    surface: &mut impl Surface,
    projection: &Projection,
    palette: &Palette,
    node: &ServiceNode,
    selected: bool,
) {
    let center = projection.to_device(node.position);
    let radius = projection.scale(NODE_RADIUS);
    let layer_color = palette.layer(node.layer);

    if selected {
        surface.stroke_circle(
            center,
            radius + projection.scale(9.0),
            palette.selection,
            projection.scale(2.0),
        );
    }

    let ring_width = health_ring_width(node.health);
    surface.stroke_circle(
        center,
        radius + projection.scale(ring_width / 2.0 + 2.0),
        palette.health(node.health),
        projection.scale(ring_width),
    );

    surface.fill_radial_gradient(center, radius, layer_color, palette.background);
    surface.stroke_circle(center, radius, layer_color, projection.scale(2.0));

    let lines = label_lines(&node.display_name);
    let first_y = -(lines.len().saturating_sub(1) as f32) * LABEL_LINE_HEIGHT / 2.0;
    for (i, line) in lines.into_iter().enumerate() {
        let offset = first_y + i as f32 * LABEL_LINE_HEIGHT;
        surface.draw_label(Label::centered(
            line,
            Point::new(center.x, center.y + projection.scale(offset)),
            palette.text,
            projection.scale(LABEL_FONT_SIZE),
        ));
    }
}

fn draw_zoom_indicator(surface: &mut impl Surface, projection: &Projection, palette: &Palette) {
    let size = surface.size();
    surface.draw_label(Label::top_left(
        format!("Zoom: {:.0}%", projection.zoom() * 100.0),
        Point::new(10.0, size.height - 20.0),
        palette.text_muted,
        12.0,
    ));
}
