//! Colors used by the topology canvas.
//!
//! Semantic colors stay fixed across themes so traffic kinds and layers
//! are recognizable at a glance.

use iced::Color;

use trafficscope_common::{EdgeKind, HealthStatus, Layer};

/// Canvas color palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub text_muted: Color,
    pub band_line: Color,
    pub selection: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: Color::from_rgb(0.08, 0.08, 0.1),
        text: Color::WHITE,
        text_muted: Color::from_rgb(0.5, 0.5, 0.55),
        band_line: Color::from_rgb(0.22, 0.22, 0.27),
        selection: Color::from_rgb(1.0, 0.8, 0.2),
    };

    /// Fill color of a layer.
    pub fn layer(&self, layer: Layer) -> Color {
        match layer {
            Layer::Frontend => Color::from_rgb(0.35, 0.65, 0.95),
            Layer::Gateway => Color::from_rgb(0.6, 0.45, 0.9),
            Layer::Platform => Color::from_rgb(0.3, 0.75, 0.7),
            Layer::Business => Color::from_rgb(0.95, 0.6, 0.3),
            Layer::Infrastructure => Color::from_rgb(0.55, 0.6, 0.65),
            Layer::Unknown => Color::from_rgb(0.5, 0.5, 0.5),
        }
    }

    /// Stroke color of an edge kind (before intensity alpha).
    pub fn edge(&self, kind: EdgeKind) -> Color {
        match kind {
            EdgeKind::Http => Color::from_rgb(0.3, 0.6, 1.0),
            EdgeKind::Message => Color::from_rgb(1.0, 0.55, 0.15),
        }
    }

    /// Ring color of a health status.
    pub fn health(&self, health: HealthStatus) -> Color {
        match health {
            HealthStatus::Healthy => Color::from_rgb(0.2, 0.8, 0.3),
            HealthStatus::Unhealthy => Color::from_rgb(0.9, 0.2, 0.2),
            HealthStatus::Unknown => Color::from_rgb(0.5, 0.5, 0.5),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DARK
    }
}

/// Same color with a different alpha.
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color {
        a: alpha.clamp(0.0, 1.0),
        ..color
    }
}

/// Linear interpolation between two colors (`t` = 0 gives `from`).
pub fn mix(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color {
        r: from.r + (to.r - from.r) * t,
        g: from.g + (to.g - from.g) * t,
        b: from.b + (to.b - from.b) * t,
        a: from.a + (to.a - from.a) * t,
    }
}
