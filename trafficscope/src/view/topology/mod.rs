//! Service traffic topology.
//!
//! Displays the services of the platform on fixed layer bands, with curved
//! edges whose weight follows the observed request or message rate.

pub mod graph;
pub mod projection;
pub mod render;
pub mod surface;

use std::sync::Arc;

use iced::widget::canvas::Cache;
use iced::widget::{button, column, container, row, rule, text};
use iced::{Alignment, Element, Length, Point, Size};

use trafficscope_common::{
    PollGate, Position, ServiceId, ServiceNode, Snapshot, current_timestamp_millis,
};

use crate::message::Message;
use crate::view::palette::Palette;

pub use graph::TopologyGraph;
pub use projection::{Projection, Zoom};
pub use render::{NODE_RADIUS, format_rate};

/// Process-local view state of the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub zoom: Zoom,
    pub selected_node: Option<ServiceId>,
    pub auto_refresh: bool,
    /// Last known canvas size, in device pixels.
    pub viewport: Size,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: Zoom::DEFAULT,
            selected_node: None,
            auto_refresh: true,
            viewport: Size::ZERO,
        }
    }
}

/// State for the topology view.
#[derive(Debug)]
pub struct TopologyState {
    /// Latest normalized snapshot, replaced wholesale on each successful poll.
    pub snapshot: Option<Arc<Snapshot>>,
    pub view: ViewState,
    /// Rendering cache.
    pub cache: Cache,
}

impl Default for TopologyState {
    fn default() -> Self {
        Self {
            snapshot: None,
            view: ViewState::default(),
            cache: Cache::new(),
        }
    }
}

impl TopologyState {
    pub fn new(auto_refresh: bool) -> Self {
        Self {
            view: ViewState {
                auto_refresh,
                ..ViewState::default()
            },
            ..Self::default()
        }
    }

    /// Replace the current snapshot.
    ///
    /// A selection whose node is gone from the new snapshot is cleared.
    pub fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        if let Some(selected) = &self.view.selected_node
            && !snapshot.contains(selected)
        {
            tracing::debug!(node = %selected, "Selected service left the topology");
            self.view.selected_node = None;
        }

        self.snapshot = Some(snapshot);
        self.cache.clear();
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.view.zoom.zoomed_in());
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.view.zoom.zoomed_out());
    }

    /// Reset zoom to 100%.
    pub fn reset_zoom(&mut self) {
        self.set_zoom(Zoom::DEFAULT);
    }

    fn set_zoom(&mut self, zoom: Zoom) {
        if zoom != self.view.zoom {
            self.view.zoom = zoom;
            self.cache.clear();
        }
    }

    /// Handle a click at `position` (device pixels) on a canvas of `viewport`.
    ///
    /// Selects the node under the pointer or clears the selection.
    pub fn click(&mut self, position: Point, viewport: Size) {
        self.set_viewport(viewport);

        let logical = self.projection().to_logical(position);
        let hit = self
            .snapshot
            .as_deref()
            .and_then(|snapshot| node_at(snapshot, logical))
            .map(|node| node.id.clone());

        match hit {
            Some(id) => self.select_node(id),
            None => self.clear_selection(),
        }
    }

    pub fn select_node(&mut self, id: ServiceId) {
        if self.view.selected_node.as_ref() != Some(&id) {
            self.view.selected_node = Some(id);
            self.cache.clear();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.view.selected_node.take().is_some() {
            self.cache.clear();
        }
    }

    /// Record new canvas bounds. Zoom and selection are kept.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.view.viewport = viewport;
    }

    /// Flip periodic polling. Returns the new setting.
    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.view.auto_refresh = !self.view.auto_refresh;
        self.view.auto_refresh
    }

    /// Projection for the current zoom and viewport.
    pub fn projection(&self) -> Projection {
        Projection::new(self.view.zoom, self.view.viewport)
    }

    /// The selected node, if it is part of the current snapshot.
    pub fn selected(&self) -> Option<&ServiceNode> {
        let id = self.view.selected_node.as_deref()?;
        self.snapshot.as_deref()?.node(id)
    }
}

/// First node in snapshot order whose center is closer than [`NODE_RADIUS`].
pub fn node_at(snapshot: &Snapshot, position: Position) -> Option<&ServiceNode> {
    snapshot
        .nodes
        .iter()
        .find(|node| node.position.distance(position) < NODE_RADIUS)
}

/// Render the topology view.
pub fn topology_view<'a>(state: &'a TopologyState, gate: &'a PollGate) -> Element<'a, Message> {
    let header = render_header(state, gate);
    let graph = TopologyGraph::view(state);

    // Show selection panel if a node is selected
    let selection = state.selected().zip(state.snapshot.as_deref());
    let main_content: Element<'a, Message> = match selection {
        Some((node, snapshot)) => {
            let panel = render_node_info_panel(node, snapshot);
            row![graph, panel].spacing(10).into()
        }
        None => graph,
    };

    let content = column![header, main_content].spacing(10).padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Services sharing an edge with `id`, in snapshot order, without `id` itself.
pub fn connected_services<'a>(snapshot: &'a Snapshot, id: &str) -> Vec<&'a ServiceNode> {
    snapshot
        .nodes
        .iter()
        .filter(|node| node.id != id)
        .filter(|node| snapshot.edges_of(id).any(|e| e.source == node.id || e.target == node.id))
        .collect()
}

/// Render the node info panel (shown when a node is selected).
fn render_node_info_panel<'a>(
    node: &'a ServiceNode,
    snapshot: &'a Snapshot,
) -> Element<'a, Message> {
    let palette = Palette::default();

    let header = column![
        text(&node.display_name).size(16),
        text(&node.id).size(10).color(palette.text_muted),
    ]
    .spacing(2);

    let health = text(format!("Health: {}", node.health))
        .size(11)
        .color(palette.health(node.health));
    let layer = text(format!("Layer: {}", node.layer.label()))
        .size(11)
        .color(palette.layer(node.layer));

    let (inbound, outbound) = snapshot
        .edges_of(&node.id)
        .fold((0usize, 0usize), |(i, o), edge| {
            (
                i + usize::from(edge.target == node.id),
                o + usize::from(edge.source == node.id),
            )
        });

    let traffic = column![
        text("Traffic").size(12),
        text(format!(
            "In: {} ({} edges)",
            format_rate(snapshot.inbound_volume(&node.id)),
            inbound
        ))
        .size(11),
        text(format!(
            "Out: {} ({} edges)",
            format_rate(snapshot.outbound_volume(&node.id)),
            outbound
        ))
        .size(11),
    ]
    .spacing(4);

    let connected = connected_services(snapshot, &node.id).into_iter().fold(
        column![text("Connected").size(12)].spacing(4),
        |col, peer| {
            col.push(
                button(text(&peer.display_name).size(11))
                    .on_press(Message::SelectNode(peer.id.clone()))
                    .style(button::text)
                    .padding(2),
            )
        },
    );

    let clear_btn = button(text("Clear Selection").size(11))
        .on_press(Message::ClearSelection)
        .style(button::secondary)
        .width(Length::Fill);

    let info_items = column![
        header,
        health,
        layer,
        rule::horizontal(1),
        traffic,
        rule::horizontal(1),
        connected,
        rule::horizontal(1),
        clear_btn,
    ]
    .spacing(8);

    container(info_items)
        .padding(15)
        .width(Length::Fixed(220.0))
        .style(container::rounded_box)
        .into()
}

/// Human-readable age of a capture timestamp.
pub fn format_age(captured_at: i64, now: i64) -> String {
    let secs = now.saturating_sub(captured_at).max(0) / 1000;
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Time since the last successful fetch.
pub fn last_update(gate: &PollGate, now: i64) -> String {
    match gate.last_success() {
        Some(at) => format!("Last update: {}", format_age(at, now)),
        None => "Last update: never".to_string(),
    }
}

/// One-line poll status for the header.
pub fn poll_status(gate: &PollGate, auto_refresh: bool) -> String {
    if let Some(error) = gate.last_error() {
        return format!(
            "Fetch failed ({}x): {}",
            gate.consecutive_failures(),
            error
        );
    }
    if gate.in_flight() {
        "Fetching...".to_string()
    } else if auto_refresh {
        "Live".to_string()
    } else {
        "Paused".to_string()
    }
}

/// Render the topology header.
fn render_header<'a>(state: &'a TopologyState, gate: &PollGate) -> Element<'a, Message> {
    let title = text("Traffic Topology").size(24);

    let now = current_timestamp_millis();

    let (services, edges, total, provenance) = match state.snapshot.as_deref() {
        Some(snapshot) => (
            snapshot.nodes.len(),
            snapshot.edges.len(),
            snapshot.total_volume(),
            format!(
                "{} · {}",
                snapshot.origin,
                format_age(snapshot.captured_at, now)
            ),
        ),
        None => (0, 0, 0.0, "no data".to_string()),
    };

    let service_count = text(format!("{} services", services)).size(14);
    let edge_count = text(format!("{} edges", edges)).size(14);
    let total_rate = text(format!("{} total", format_rate(total))).size(14);
    let provenance = text(provenance).size(10);
    let updated = text(last_update(gate, now))
        .size(10)
        .color(Palette::default().text_muted);

    let status_color = if gate.last_error().is_some() {
        Palette::default().health(trafficscope_common::HealthStatus::Unhealthy)
    } else {
        Palette::default().text_muted
    };
    let status = text(poll_status(gate, state.view.auto_refresh))
        .size(10)
        .color(status_color);

    let zoom_label = text(format!("{}%", state.view.zoom.percent())).size(12);

    let zoom_out_btn = button(text("-").size(14))
        .on_press(Message::ZoomOut)
        .style(button::secondary);

    let zoom_in_btn = button(text("+").size(14))
        .on_press(Message::ZoomIn)
        .style(button::secondary);

    let reset_btn = button(text("Reset").size(12))
        .on_press(Message::ZoomReset)
        .style(button::secondary);

    let refresh_btn = button(text("Refresh").size(12))
        .on_press(Message::RefreshNow)
        .style(button::secondary);

    let auto_refresh_btn = button(
        text(if state.view.auto_refresh {
            "Auto Refresh: ON"
        } else {
            "Auto Refresh: OFF"
        })
        .size(12),
    )
    .on_press(Message::ToggleAutoRefresh)
    .style(if state.view.auto_refresh {
        button::primary
    } else {
        button::secondary
    });

    row![
        title,
        service_count,
        edge_count,
        total_rate,
        column![provenance, updated, status].spacing(2),
        zoom_out_btn,
        zoom_label,
        zoom_in_btn,
        reset_btn,
        refresh_btn,
        auto_refresh_btn,
    ]
    .spacing(15)
    .align_y(Alignment::Center)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficscope_common::{EdgeKind, HealthStatus, Layer, TrafficEdge};

    fn service(id: &str, x: f32, y: f32) -> ServiceNode {
        ServiceNode {
            id: id.to_string(),
            display_name: trafficscope_common::display_name(id),
            health: HealthStatus::Healthy,
            layer: Layer::Platform,
            position: Position::new(x, y),
        }
    }

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(Snapshot {
            nodes: vec![service("a", 400.0, 300.0), service("b", 410.0, 300.0)],
            edges: vec![TrafficEdge {
                source: "a".to_string(),
                target: "b".to_string(),
                volume: 10.0,
                kind: EdgeKind::Http,
            }],
            captured_at: 0,
            origin: "real_time".to_string(),
        })
    }

    #[test]
    fn test_topology_state_default() {
        let state = TopologyState::default();
        assert!(state.snapshot.is_none());
        assert_eq!(state.view.zoom, Zoom::DEFAULT);
        assert!(state.view.auto_refresh);
        assert!(state.view.selected_node.is_none());
    }

    #[test]
    fn test_hit_radius() {
        let snapshot = Snapshot {
            nodes: vec![service("a", 100.0, 100.0)],
            ..Default::default()
        };

        assert!(node_at(&snapshot, Position::new(124.0, 100.0)).is_some());
        assert!(node_at(&snapshot, Position::new(100.0, 76.0)).is_some());
        assert!(node_at(&snapshot, Position::new(125.0, 100.0)).is_none());
        assert!(node_at(&snapshot, Position::new(126.0, 100.0)).is_none());
    }

    #[test]
    fn test_hit_prefers_snapshot_order() {
        // (405, 300) is inside both a and b.
        let snapshot = snapshot();
        let hit = node_at(&snapshot, Position::new(405.0, 300.0)).map(|n| n.id.as_str());
        assert_eq!(hit, Some("a"));
    }

    #[test]
    fn test_click_selects_through_projection() {
        let mut state = TopologyState::default();
        state.apply_snapshot(Arc::new(Snapshot {
            nodes: vec![service("a", 100.0, 100.0)],
            ..Default::default()
        }));

        let viewport = Size::new(1000.0, 700.0);
        state.zoom_in();
        state.zoom_in();
        let projection = Projection::new(state.view.zoom, viewport);

        // 24 logical units to the right of the center.
        let inside = projection.to_device(Position::new(124.0, 100.0));
        state.click(inside, viewport);
        assert_eq!(state.view.selected_node.as_deref(), Some("a"));
        assert_eq!(state.view.viewport, viewport);

        let outside = projection.to_device(Position::new(126.0, 100.0));
        state.click(outside, viewport);
        assert!(state.view.selected_node.is_none());
    }

    #[test]
    fn test_zoom_limits() {
        let mut state = TopologyState::default();

        for _ in 0..6 {
            state.zoom_in();
        }
        assert_eq!(state.view.zoom.factor(), 1.6);

        for _ in 0..20 {
            state.zoom_in();
        }
        assert_eq!(state.view.zoom, Zoom::MAX);

        for _ in 0..40 {
            state.zoom_out();
        }
        assert_eq!(state.view.zoom, Zoom::MIN);

        state.reset_zoom();
        assert_eq!(state.view.zoom.factor(), 1.0);
    }

    #[test]
    fn test_selection_cleared_when_node_disappears() {
        let mut state = TopologyState::default();
        state.apply_snapshot(snapshot());
        state.select_node("b".to_string());
        assert_eq!(state.selected().map(|n| n.id.as_str()), Some("b"));

        state.apply_snapshot(Arc::new(Snapshot {
            nodes: vec![service("a", 400.0, 300.0)],
            ..Default::default()
        }));
        assert!(state.view.selected_node.is_none());
    }

    #[test]
    fn test_selection_kept_when_node_remains() {
        let mut state = TopologyState::default();
        state.apply_snapshot(snapshot());
        state.select_node("a".to_string());
        state.apply_snapshot(snapshot());
        assert_eq!(state.view.selected_node.as_deref(), Some("a"));
    }

    #[test]
    fn test_resize_keeps_zoom_and_selection() {
        let mut state = TopologyState::default();
        state.apply_snapshot(snapshot());
        state.zoom_in();
        state.select_node("a".to_string());

        state.set_viewport(Size::new(640.0, 480.0));
        state.set_viewport(Size::new(1920.0, 1080.0));

        assert_eq!(state.view.zoom, Zoom::from_tenths(11));
        assert_eq!(state.view.selected_node.as_deref(), Some("a"));
        assert_eq!(state.view.viewport, Size::new(1920.0, 1080.0));
    }

    #[test]
    fn test_toggle_auto_refresh_keeps_snapshot() {
        let mut state = TopologyState::default();
        state.apply_snapshot(snapshot());
        assert!(!state.toggle_auto_refresh());
        assert!(state.snapshot.is_some());
        assert!(state.toggle_auto_refresh());
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0, 5_000), "5s ago");
        assert_eq!(format_age(0, 120_000), "2m ago");
        assert_eq!(format_age(0, 7_200_000), "2h ago");
        assert_eq!(format_age(10_000, 0), "0s ago");
        assert_eq!(format_age(i64::MIN, 5_000), "2562047788015h ago");
        assert_eq!(format_age(i64::MAX, i64::MIN), "0s ago");
    }

    #[test]
    fn test_last_update() {
        let mut gate = PollGate::new();
        assert_eq!(last_update(&gate, 10_000), "Last update: never");

        assert!(gate.try_begin());
        gate.succeed(4_000);
        assert_eq!(last_update(&gate, 10_000), "Last update: 6s ago");

        assert!(gate.try_begin());
        gate.fail("HTTP 500");
        assert_eq!(last_update(&gate, 70_000), "Last update: 1m ago");
    }

    #[test]
    fn test_connected_services() {
        let snapshot = snapshot();
        let ids = |id: &str| -> Vec<String> {
            connected_services(&snapshot, id)
                .into_iter()
                .map(|node| node.id.clone())
                .collect()
        };

        assert_eq!(ids("a"), vec!["b".to_string()]);
        assert_eq!(ids("b"), vec!["a".to_string()]);
        assert!(ids("missing").is_empty());
    }

    #[test]
    fn test_poll_status() {
        let mut gate = PollGate::new();
        assert_eq!(poll_status(&gate, true), "Live");
        assert_eq!(poll_status(&gate, false), "Paused");

        assert!(gate.try_begin());
        assert_eq!(poll_status(&gate, true), "Fetching...");

        gate.fail("HTTP 500");
        assert_eq!(poll_status(&gate, true), "Fetch failed (1x): HTTP 500");
    }
}
