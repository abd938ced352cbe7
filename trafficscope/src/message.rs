use std::sync::Arc;

use iced::{Point, Size};

use trafficscope_common::{ServiceId, Snapshot};

/// Messages for the TrafficScope application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Poll interval elapsed.
    PollTick,

    /// User asked for an immediate refresh.
    RefreshNow,

    /// A snapshot fetch finished (normalized snapshot or error message).
    SnapshotFetched(Result<Arc<Snapshot>, String>),

    /// User toggled periodic polling.
    ToggleAutoRefresh,

    /// Zoom in by one step.
    ZoomIn,

    /// Zoom out by one step.
    ZoomOut,

    /// Reset zoom to 100%.
    ZoomReset,

    /// Left click on the canvas, in device coordinates relative to the canvas.
    CanvasClicked {
        position: Point,
        viewport: Size,
    },

    /// Canvas bounds changed.
    ViewportResized(Size),

    /// Select a service by id.
    SelectNode(ServiceId),

    /// Clear the current selection.
    ClearSelection,
}
