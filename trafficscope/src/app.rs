//! TrafficScope Iced application.

use std::time::Duration;

use iced::{Element, Subscription, Task, Theme};

use trafficscope_common::{PollGate, current_timestamp_millis};

use crate::message::Message;
use crate::subscription::{SnapshotSource, fetch_snapshot, poll_subscription};
use crate::view::topology::{TopologyState, topology_view};

/// The main TrafficScope application.
pub struct TrafficScope {
    /// Snapshot source (HTTP endpoint or demo simulation).
    source: SnapshotSource,
    /// Interval between poll ticks while auto-refresh is on.
    poll_interval: Duration,
    /// Topology state.
    topology: TopologyState,
    /// In-flight guard and failure accounting.
    gate: PollGate,
}

impl TrafficScope {
    /// Create the application without starting a fetch.
    pub fn new(source: SnapshotSource, poll_interval: Duration, auto_refresh: bool) -> Self {
        Self {
            source,
            poll_interval,
            topology: TopologyState::new(auto_refresh),
            gate: PollGate::new(),
        }
    }

    /// Boot the application (called by iced::application).
    ///
    /// The first snapshot is requested immediately.
    pub fn boot(
        source: SnapshotSource,
        poll_interval: Duration,
        auto_refresh: bool,
    ) -> (Self, Task<Message>) {
        tracing::info!(
            source = %source.describe(),
            interval_ms = poll_interval.as_millis() as u64,
            auto_refresh,
            "Starting TrafficScope"
        );

        let mut app = Self::new(source, poll_interval, auto_refresh);
        let task = app.request_fetch();
        (app, task)
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        match self.topology.snapshot.as_deref() {
            Some(snapshot) => format!("TrafficScope - {} services", snapshot.nodes.len()),
            None => "TrafficScope".to_string(),
        }
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PollTick | Message::RefreshNow => {
                return self.request_fetch();
            }

            Message::SnapshotFetched(Ok(snapshot)) => {
                tracing::debug!(
                    services = snapshot.nodes.len(),
                    edges = snapshot.edges.len(),
                    origin = %snapshot.origin,
                    "Snapshot received"
                );
                self.gate.succeed(current_timestamp_millis());
                self.topology.apply_snapshot(snapshot);
            }

            Message::SnapshotFetched(Err(error)) => {
                tracing::debug!(
                    error = %error,
                    failures = self.gate.consecutive_failures() + 1,
                    "Keeping previous snapshot"
                );
                self.gate.fail(error);
            }

            Message::ToggleAutoRefresh => {
                let enabled = self.topology.toggle_auto_refresh();
                tracing::info!(enabled, "Auto refresh toggled");
            }

            Message::ZoomIn => self.topology.zoom_in(),
            Message::ZoomOut => self.topology.zoom_out(),
            Message::ZoomReset => self.topology.reset_zoom(),

            Message::CanvasClicked { position, viewport } => {
                self.topology.click(position, viewport);
            }

            Message::ViewportResized(size) => {
                tracing::trace!(width = size.width, height = size.height, "Viewport resized");
                self.topology.set_viewport(size);
            }

            Message::SelectNode(id) => {
                tracing::info!(service = %id, "Selected service");
                self.topology.select_node(id);
            }

            Message::ClearSelection => self.topology.clear_selection(),
        }

        Task::none()
    }

    /// Poll ticks exist only while auto-refresh is on.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.topology.view.auto_refresh {
            poll_subscription(self.poll_interval)
        } else {
            Subscription::none()
        }
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        topology_view(&self.topology, &self.gate)
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn topology(&self) -> &TopologyState {
        &self.topology
    }

    pub fn gate(&self) -> &PollGate {
        &self.gate
    }

    /// Start a fetch unless one is already in flight.
    fn request_fetch(&mut self) -> Task<Message> {
        if !self.gate.try_begin() {
            return Task::none();
        }
        Task::perform(fetch_snapshot(self.source.clone()), Message::SnapshotFetched)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use iced::{Point, Size};
    use trafficscope_common::{
        EdgeKind, HealthStatus, Layer, LayoutRegistry, Position, ServiceNode, Snapshot,
        TrafficEdge,
    };

    use super::*;
    use crate::view::topology::Zoom;

    fn app() -> TrafficScope {
        TrafficScope::new(
            SnapshotSource::demo(Arc::new(LayoutRegistry::builtin())),
            Duration::from_millis(2000),
            true,
        )
    }

    fn snapshot() -> Arc<Snapshot> {
        let node = |id: &str, x: f32| ServiceNode {
            id: id.to_string(),
            display_name: trafficscope_common::display_name(id),
            health: HealthStatus::Healthy,
            layer: Layer::Platform,
            position: Position::new(x, 270.0),
        };
        Arc::new(Snapshot {
            nodes: vec![node("a", 200.0), node("b", 600.0)],
            edges: vec![TrafficEdge {
                source: "a".to_string(),
                target: "b".to_string(),
                volume: 120.0,
                kind: EdgeKind::Http,
            }],
            captured_at: 1_000,
            origin: "real_time".to_string(),
        })
    }

    #[test]
    fn test_ticks_are_skipped_while_fetch_in_flight() {
        let mut app = app();

        let _ = app.update(Message::PollTick);
        assert!(app.gate().in_flight());

        let _ = app.update(Message::PollTick);
        let _ = app.update(Message::RefreshNow);
        assert_eq!(app.gate().skipped(), 2);

        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));
        assert!(!app.gate().in_flight());

        let _ = app.update(Message::PollTick);
        assert!(app.gate().in_flight());
        assert_eq!(app.gate().skipped(), 2);
    }

    #[test]
    fn test_failure_keeps_previous_snapshot_and_view() {
        let mut app = app();

        let _ = app.update(Message::PollTick);
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));
        let _ = app.update(Message::ZoomIn);
        let _ = app.update(Message::SelectNode("a".to_string()));
        let view_before = app.topology().view.clone();

        let _ = app.update(Message::PollTick);
        let _ = app.update(Message::SnapshotFetched(Err(
            "HTTP 500 from http://localhost:8080".to_string(),
        )));

        assert_eq!(app.topology().snapshot.as_deref(), Some(&*snapshot()));
        assert_eq!(app.topology().view, view_before);
        assert_eq!(app.gate().consecutive_failures(), 1);
        assert!(!app.gate().in_flight());

        let _ = app.update(Message::PollTick);
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));
        assert_eq!(app.gate().consecutive_failures(), 0);
        assert!(app.gate().last_error().is_none());
    }

    /// Counts events per level.
    #[derive(Default)]
    struct LevelCounter {
        warn: std::sync::atomic::AtomicUsize,
        debug: std::sync::atomic::AtomicUsize,
    }

    struct CountingSubscriber(Arc<LevelCounter>);

    impl tracing::Subscriber for CountingSubscriber {
        fn register_callsite(
            &self,
            _: &'static tracing::Metadata<'static>,
        ) -> tracing::subscriber::Interest {
            tracing::subscriber::Interest::always()
        }

        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            use std::sync::atomic::Ordering;
            match *event.metadata().level() {
                tracing::Level::WARN => self.0.warn.fetch_add(1, Ordering::SeqCst),
                tracing::Level::DEBUG => self.0.debug.fetch_add(1, Ordering::SeqCst),
                _ => 0,
            };
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_failed_fetch_message_logs_at_debug() {
        use std::sync::atomic::Ordering;

        let counter = Arc::new(LevelCounter::default());
        let mut app = app();

        tracing::subscriber::with_default(CountingSubscriber(counter.clone()), || {
            let _ = app.update(Message::PollTick);
            let _ = app.update(Message::SnapshotFetched(Err("HTTP 502".to_string())));
        });

        assert_eq!(counter.warn.load(Ordering::SeqCst), 0);
        assert!(counter.debug.load(Ordering::SeqCst) >= 1);
        assert_eq!(app.gate().last_error(), Some("HTTP 502"));
    }

    #[test]
    fn test_zoom_messages() {
        let mut app = app();
        for _ in 0..6 {
            let _ = app.update(Message::ZoomIn);
        }
        assert_eq!(app.topology().view.zoom.factor(), 1.6);

        let _ = app.update(Message::ZoomReset);
        assert_eq!(app.topology().view.zoom, Zoom::DEFAULT);
    }

    #[test]
    fn test_canvas_click_selects_and_clears() {
        let mut app = app();
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));

        // Node "a" at logical (200, 270) on an 800 x 600 canvas at 100%.
        let viewport = Size::new(800.0, 600.0);
        let _ = app.update(Message::CanvasClicked {
            position: Point::new(210.0, 290.0),
            viewport,
        });
        assert_eq!(app.topology().view.selected_node.as_deref(), Some("a"));

        let _ = app.update(Message::CanvasClicked {
            position: Point::new(400.0, 50.0),
            viewport,
        });
        assert!(app.topology().view.selected_node.is_none());
    }

    #[test]
    fn test_toggle_auto_refresh() {
        let mut app = app();
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));

        let _ = app.update(Message::ToggleAutoRefresh);
        assert!(!app.topology().view.auto_refresh);
        assert!(app.topology().snapshot.is_some());

        let _ = app.update(Message::ToggleAutoRefresh);
        assert!(app.topology().view.auto_refresh);
    }

    #[test]
    fn test_select_node_message() {
        let mut app = app();
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));

        let _ = app.update(Message::SelectNode("b".to_string()));
        assert_eq!(app.topology().view.selected_node.as_deref(), Some("b"));

        let _ = app.update(Message::ClearSelection);
        assert!(app.topology().view.selected_node.is_none());
    }

    #[test]
    fn test_title() {
        let mut app = app();
        assert_eq!(app.title(), "TrafficScope");
        let _ = app.update(Message::SnapshotFetched(Ok(snapshot())));
        assert_eq!(app.title(), "TrafficScope - 2 services");
    }
}
