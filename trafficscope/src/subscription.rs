use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::Subscription;

use trafficscope_common::{
    LayoutRegistry, Snapshot, SnapshotClient, current_timestamp_millis, normalize,
};

use crate::demo::DemoSimulator;
use crate::message::Message;

/// Where snapshots come from.
#[derive(Clone)]
pub enum SnapshotSource {
    /// HTTP snapshot endpoint.
    Remote(SnapshotClient),
    /// Local simulation, normalized with the given registry.
    Demo {
        simulator: Arc<Mutex<DemoSimulator>>,
        registry: Arc<LayoutRegistry>,
    },
}

impl SnapshotSource {
    /// A demo source over a fresh simulator.
    pub fn demo(registry: Arc<LayoutRegistry>) -> Self {
        SnapshotSource::Demo {
            simulator: Arc::new(Mutex::new(DemoSimulator::new())),
            registry,
        }
    }

    /// Short description for logs and the window title.
    pub fn describe(&self) -> String {
        match self {
            SnapshotSource::Remote(client) => client.url().to_string(),
            SnapshotSource::Demo { .. } => "demo".to_string(),
        }
    }
}

impl std::fmt::Debug for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSource::Remote(client) => f.debug_tuple("Remote").field(client).finish(),
            SnapshotSource::Demo { registry, .. } => f
                .debug_struct("Demo")
                .field("services", &registry.len())
                .finish(),
        }
    }
}

/// Fetch one normalized snapshot from `source`.
///
/// Errors are flattened to strings so they can travel inside a `Message`.
pub async fn fetch_snapshot(source: SnapshotSource) -> Result<Arc<Snapshot>, String> {
    match source {
        SnapshotSource::Remote(client) => client.fetch().await.map(Arc::new).map_err(|e| {
            tracing::warn!(
                error = %e,
                url = %client.url(),
                transient = e.is_transient(),
                "Snapshot fetch failed"
            );
            e.to_string()
        }),
        SnapshotSource::Demo {
            simulator,
            registry,
        } => {
            let now = current_timestamp_millis();
            // The simulator has no invariants a panic could break.
            let raw = simulator
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .tick(now);
            Ok(Arc::new(normalize(&raw, &registry, now)))
        }
    }
}

/// Create a poll subscription that ticks every `interval`.
pub fn poll_subscription(interval: Duration) -> Subscription<Message> {
    iced::time::every(interval).map(|_| Message::PollTick)
}
