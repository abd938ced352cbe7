//! Topology normalization.
//!
//! Turns a [`RawSnapshot`] into a [`Snapshot`] whose nodes all have a
//! position and a layer and whose edges only reference existing nodes.
//! The function is pure in (raw snapshot, registry, fetch time).

use std::collections::HashSet;

use crate::model::{
    EdgeKind, HealthStatus, Layer, Position, ServiceNode, Snapshot, TrafficEdge,
};
use crate::registry::LayoutRegistry;
use crate::wire::{RawEdge, RawNode, RawSnapshot};

/// Origin tag used when the document does not say where it came from.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Normalize a raw snapshot.
///
/// `fetched_at` is used as the capture time when the document carries no
/// usable timestamp.
pub fn normalize(raw: &RawSnapshot, registry: &LayoutRegistry, fetched_at: i64) -> Snapshot {
    let edges: Vec<(String, String, &RawEdge)> = raw
        .links
        .iter()
        .filter_map(|e| match (&e.source, &e.target) {
            (Some(source), Some(target)) => Some((source.clone(), target.clone(), e)),
            _ => None,
        })
        .collect();

    let malformed = raw.links.len() - edges.len();
    if malformed > 0 {
        tracing::debug!(count = malformed, "Dropped edges without source or target");
    }

    let nodes = match raw.nodes.as_deref() {
        Some(nodes) if !nodes.is_empty() => nodes_from_metadata(nodes, registry),
        _ => nodes_from_edges(&edges, registry),
    };

    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let retained: Vec<TrafficEdge> = edges
        .iter()
        .filter(|(source, target, _)| {
            known.contains(source.as_str()) && known.contains(target.as_str())
        })
        .map(|(source, target, raw_edge)| TrafficEdge {
            source: source.clone(),
            target: target.clone(),
            volume: sanitize_volume(raw_edge.value),
            kind: raw_edge
                .kind
                .as_deref()
                .map(EdgeKind::parse)
                .unwrap_or_default(),
        })
        .collect();

    let dangling = edges.len() - retained.len();
    if dangling > 0 {
        tracing::debug!(count = dangling, "Dropped edges referencing unknown services");
    }

    Snapshot {
        nodes,
        edges: retained,
        captured_at: raw
            .timestamp
            .as_ref()
            .and_then(|ts| ts.to_millis())
            .unwrap_or(fetched_at),
        origin: raw
            .source
            .clone()
            .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string()),
    }
}

/// Build nodes from explicit node metadata, filling gaps from the registry.
fn nodes_from_metadata(raw_nodes: &[RawNode], registry: &LayoutRegistry) -> Vec<ServiceNode> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(raw_nodes.len());

    for raw in raw_nodes {
        if !seen.insert(raw.id.as_str()) {
            tracing::debug!(id = %raw.id, "Ignoring duplicate node");
            continue;
        }

        let entry = registry.get(&raw.id);
        let fallback = entry
            .map(|e| e.position)
            .unwrap_or_else(Position::canvas_center);

        let position = Position::new(raw.x.unwrap_or(fallback.x), raw.y.unwrap_or(fallback.y));

        let layer = match raw.layer.as_deref() {
            Some(layer) => Layer::parse(layer),
            None => entry.map(|e| e.layer).unwrap_or(Layer::Unknown),
        };

        nodes.push(ServiceNode {
            id: raw.id.clone(),
            display_name: raw
                .name
                .clone()
                .unwrap_or_else(|| display_name(&raw.id)),
            health: raw
                .status
                .as_deref()
                .map(HealthStatus::parse)
                .unwrap_or_default(),
            layer,
            position,
        });
    }

    nodes
}

/// Synthesize nodes from the union of edge endpoints, in first-seen order.
fn nodes_from_edges(
    edges: &[(String, String, &RawEdge)],
    registry: &LayoutRegistry,
) -> Vec<ServiceNode> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for id in edges.iter().flat_map(|(s, t, _)| [s, t]) {
        if !seen.insert(id.as_str()) {
            continue;
        }

        let (position, layer) = match registry.get(id) {
            Some(entry) => (entry.position, entry.layer),
            None => (Position::canvas_center(), Layer::Unknown),
        };

        nodes.push(ServiceNode {
            id: id.clone(),
            display_name: display_name(id),
            health: HealthStatus::Unknown,
            layer,
            position,
        });
    }

    nodes
}

fn sanitize_volume(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Derive a display name from a service id.
///
/// Separators (`-`, `_`, `.`) become spaces and each word is capitalized:
/// `"auth-service"` becomes `"Auth Service"`.
pub fn display_name(id: &str) -> String {
    let mut name = String::with_capacity(id.len());
    let mut word_start = true;

    for c in id.chars() {
        if matches!(c, '-' | '_' | '.') || c == ' ' {
            name.push(' ');
            word_start = true;
        } else if word_start {
            name.extend(c.to_uppercase());
            word_start = false;
        } else {
            name.push(c);
        }
    }

    name
}
