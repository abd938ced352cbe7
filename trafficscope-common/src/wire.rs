//! JSON wire format of the snapshot endpoint.
//!
//! Everything except the edge list is optional; gaps are filled in by
//! [`crate::normalize`]. Decoding is lenient below the top level: a field of
//! the wrong type reads as absent and an unreadable node or edge entry never
//! rejects the whole document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Snapshot;

/// A snapshot document as served by the traffic endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Node metadata; may be absent entirely.
    #[serde(
        default,
        deserialize_with = "lenient_nodes",
        skip_serializing_if = "Option::is_none"
    )]
    pub nodes: Option<Vec<RawNode>>,

    /// Traffic edges (`links` or `edges`).
    #[serde(alias = "edges", deserialize_with = "lenient_edges")]
    pub links: Vec<RawEdge>,

    /// Capture time: epoch milliseconds or an RFC 3339 string.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<RawTimestamp>,

    /// Provenance tag.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
}

/// Node entry of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

/// Edge entry of the wire format. Endpoints are optional so a malformed
/// edge can be dropped without rejecting the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// Timestamp as found on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Unix epoch milliseconds.
    Millis(i64),
    /// Fractional epoch milliseconds.
    FractionalMillis(f64),
    /// RFC 3339 date-time string.
    Text(String),
}

impl RawTimestamp {
    /// Resolve to epoch milliseconds, if parseable.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            RawTimestamp::Millis(ms) => Some(*ms),
            // `as` saturates at the i64 bounds.
            RawTimestamp::FractionalMillis(ms) if ms.is_finite() => Some(ms.trunc() as i64),
            RawTimestamp::FractionalMillis(_) => None,
            RawTimestamp::Text(s) => chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.timestamp_millis()),
        }
    }
}

impl RawSnapshot {
    /// Decode a snapshot document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Optional field that reads as `None` when the value has the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Edge list where an unreadable entry becomes an empty edge, which the
/// normalizer then drops and counts as malformed.
fn lenient_edges<'de, D>(deserializer: D) -> std::result::Result<Vec<RawEdge>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

/// Node list where entries without a usable `id` are skipped.
fn lenient_nodes<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<RawNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(entries) = lenient::<D, Vec<serde_json::Value>>(deserializer)? else {
        return Ok(None);
    };

    let total = entries.len();
    let nodes: Vec<RawNode> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if nodes.len() < total {
        tracing::debug!(count = total - nodes.len(), "Dropped unreadable node entries");
    }

    Ok(Some(nodes))
}

impl From<&Snapshot> for RawSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|n| RawNode {
                id: n.id.clone(),
                name: Some(n.display_name.clone()),
                status: Some(n.health.as_str().to_string()),
                x: Some(n.position.x),
                y: Some(n.position.y),
                layer: Some(n.layer.as_str().to_string()),
            })
            .collect();

        let links = snapshot
            .edges
            .iter()
            .map(|e| RawEdge {
                source: Some(e.source.clone()),
                target: Some(e.target.clone()),
                value: Some(e.volume),
                kind: Some(e.kind.as_str().to_string()),
            })
            .collect();

        Self {
            nodes: Some(nodes),
            links,
            timestamp: Some(RawTimestamp::Millis(snapshot.captured_at)),
            source: Some(snapshot.origin.clone()),
        }
    }
}
