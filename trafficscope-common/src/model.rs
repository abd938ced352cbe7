use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Width of the logical canvas, independent of device pixels.
pub const LOGICAL_WIDTH: f32 = 800.0;

/// Height of the logical canvas.
pub const LOGICAL_HEIGHT: f32 = 600.0;

/// Unique identifier for a service node.
pub type ServiceId = String;

/// A point in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Center of the logical canvas, used for services with no known layout.
    pub const fn canvas_center() -> Self {
        Self::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0)
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Health of a service as reported by the snapshot source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Parse a status string leniently (unrecognized values are `Unknown`).
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "healthy" | "up" => HealthStatus::Healthy,
            "unhealthy" | "down" => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architectural tier a service belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Infrastructure,
    Platform,
    Gateway,
    Business,
    Frontend,
    #[default]
    Unknown,
}

impl Layer {
    /// Layers that own a horizontal band on the canvas, top to bottom.
    pub const BANDED: [Layer; 5] = [
        Layer::Frontend,
        Layer::Gateway,
        Layer::Platform,
        Layer::Business,
        Layer::Infrastructure,
    ];

    /// Parse a layer string leniently (unrecognized values are `Unknown`).
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "infrastructure" => Layer::Infrastructure,
            "platform" => Layer::Platform,
            "gateway" => Layer::Gateway,
            "business" => Layer::Business,
            "frontend" => Layer::Frontend,
            _ => Layer::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Infrastructure => "infrastructure",
            Layer::Platform => "platform",
            Layer::Gateway => "gateway",
            Layer::Business => "business",
            Layer::Frontend => "frontend",
            Layer::Unknown => "unknown",
        }
    }

    /// Human-readable band label.
    pub fn label(&self) -> &'static str {
        match self {
            Layer::Infrastructure => "Infrastructure",
            Layer::Platform => "Platform",
            Layer::Gateway => "Gateway",
            Layer::Business => "Business",
            Layer::Frontend => "Frontend",
            Layer::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport of a traffic edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Http,
    Message,
}

impl EdgeKind {
    /// `"message"` maps to `Message`; anything else is treated as HTTP.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("message") {
            EdgeKind::Message
        } else {
            EdgeKind::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Http => "http",
            EdgeKind::Message => "message",
        }
    }
}

/// A service in the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNode {
    /// Stable service identifier, unique within a snapshot.
    pub id: ServiceId,
    /// Display name shown on the canvas.
    pub display_name: String,
    /// Reported health.
    pub health: HealthStatus,
    /// Architectural tier.
    pub layer: Layer,
    /// Position in logical canvas units.
    pub position: Position,
}

/// Directed traffic between two services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEdge {
    /// Calling service.
    pub source: ServiceId,
    /// Called service.
    pub target: ServiceId,
    /// Non-negative traffic rate.
    pub volume: f64,
    /// HTTP call or message flow.
    pub kind: EdgeKind,
}

impl TrafficEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// One immutable, normalized capture of the topology.
///
/// Every edge endpoint refers to a node in `nodes`; consumers rely on this
/// and do not re-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<ServiceNode>,
    pub edges: Vec<TrafficEdge>,
    /// Unix epoch milliseconds when the snapshot was captured.
    pub captured_at: i64,
    /// Provenance tag (e.g. "real_time", "baseline").
    pub origin: String,
}

impl Snapshot {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&ServiceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Sum of volumes on edges targeting `id`.
    pub fn inbound_volume(&self, id: &str) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.volume)
            .sum()
    }

    /// Sum of volumes on edges originating at `id`.
    pub fn outbound_volume(&self, id: &str) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.volume)
            .sum()
    }

    /// Sum of all edge volumes.
    pub fn total_volume(&self) -> f64 {
        self.edges.iter().map(|e| e.volume).sum()
    }

    /// Edges touching `id` in either direction.
    pub fn edges_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TrafficEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id || e.target == id)
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
