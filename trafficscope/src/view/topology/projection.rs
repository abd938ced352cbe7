//! Logical ↔ device coordinate mapping.
//!
//! The topology is laid out on a fixed 800 × 600 logical canvas. On screen
//! it is centered horizontally, offset 20 px from the top and scaled by the
//! zoom factor. Drawing and hit testing both go through [`Projection`].

use iced::{Point, Size};

use trafficscope_common::{LOGICAL_WIDTH, Position};

/// Fixed vertical offset of the logical canvas, in device pixels.
pub const TOP_OFFSET: f32 = 20.0;

/// Zoom level, stored in tenths so that repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zoom(u8);

impl Zoom {
    /// 50%.
    pub const MIN: Zoom = Zoom(5);
    /// 200%.
    pub const MAX: Zoom = Zoom(20);
    /// 100%.
    pub const DEFAULT: Zoom = Zoom(10);

    /// Zoom from a number of tenths, clamped to the allowed range.
    pub fn from_tenths(tenths: u8) -> Self {
        Zoom(tenths.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// One step (0.1) larger, clamped.
    pub fn zoomed_in(self) -> Self {
        Self::from_tenths(self.0.saturating_add(1))
    }

    /// One step (0.1) smaller, clamped.
    pub fn zoomed_out(self) -> Self {
        Self::from_tenths(self.0.saturating_sub(1))
    }

    pub fn factor(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    pub fn percent(self) -> u32 {
        u32::from(self.0) * 10
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mapping between logical canvas units and device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    zoom: f32,
    viewport: Size,
}

impl Projection {
    pub fn new(zoom: Zoom, viewport: Size) -> Self {
        Self {
            zoom: zoom.factor(),
            viewport,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Whether there is anything to draw on.
    pub fn is_drawable(&self) -> bool {
        self.viewport.width > 0.0 && self.viewport.height > 0.0
    }

    /// Horizontal offset that centers the scaled logical canvas.
    pub fn offset_x(&self) -> f32 {
        (self.viewport.width - LOGICAL_WIDTH * self.zoom) / 2.0
    }

    /// Logical point to device pixels.
    pub fn to_device(&self, p: Position) -> Point {
        Point::new(
            self.offset_x() + p.x * self.zoom,
            TOP_OFFSET + p.y * self.zoom,
        )
    }

    /// Device pixels back to a logical point. Exact inverse of [`to_device`].
    ///
    /// [`to_device`]: Projection::to_device
    pub fn to_logical(&self, p: Point) -> Position {
        Position::new(
            (p.x - self.offset_x()) / self.zoom,
            (p.y - TOP_OFFSET) / self.zoom,
        )
    }

    /// Scale a logical length to device pixels.
    pub fn scale(&self, length: f32) -> f32 {
        length * self.zoom
    }
}
