//! Static service layout registry.
//!
//! Maps well-known service ids to a default canvas position and layer. The
//! normalizer falls back to it when a snapshot carries no node metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Layer, Position};

/// Default placement of a known service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub position: Position,
    pub layer: Layer,
}

/// A service placement as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub layer: Layer,
}

/// Immutable id → placement lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRegistry {
    entries: HashMap<String, LayoutEntry>,
}

/// Built-in placements: (id, x, y, layer).
const DEFAULT_SERVICES: &[(&str, f32, f32, Layer)] = &[
    ("web-app", 250.0, 70.0, Layer::Frontend),
    ("admin-console", 550.0, 70.0, Layer::Frontend),
    ("api-gateway", 300.0, 170.0, Layer::Gateway),
    ("auth-gateway", 500.0, 170.0, Layer::Gateway),
    ("config-service", 150.0, 270.0, Layer::Platform),
    ("observability-service", 400.0, 270.0, Layer::Platform),
    ("scheduler", 650.0, 270.0, Layer::Platform),
    ("conversation-service", 120.0, 370.0, Layer::Business),
    ("kpi-service", 320.0, 370.0, Layer::Business),
    ("entity-resolution", 500.0, 370.0, Layer::Business),
    ("notification-service", 680.0, 370.0, Layer::Business),
    ("postgres", 150.0, 470.0, Layer::Infrastructure),
    ("redis", 320.0, 470.0, Layer::Infrastructure),
    ("kafka", 500.0, 470.0, Layer::Infrastructure),
    ("elasticsearch", 670.0, 470.0, Layer::Infrastructure),
];

impl LayoutRegistry {
    /// An empty registry: every service falls back to the canvas center.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry of the built-in platform services.
    pub fn builtin() -> Self {
        DEFAULT_SERVICES
            .iter()
            .map(|&(id, x, y, layer)| {
                (
                    id.to_string(),
                    LayoutEntry {
                        position: Position::new(x, y),
                        layer,
                    },
                )
            })
            .collect()
    }

    /// Build a registry from configured placements, optionally on top of the
    /// built-in one. Configured entries win on conflict.
    pub fn from_config(services: &[ServiceLayout], replace_defaults: bool) -> Self {
        let mut entries = if replace_defaults {
            HashMap::new()
        } else {
            Self::builtin().entries
        };

        for service in services {
            entries.insert(
                service.id.clone(),
                LayoutEntry {
                    position: Position::new(service.x, service.y),
                    layer: service.layer,
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&LayoutEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, LayoutEntry)> for LayoutRegistry {
    fn from_iter<I: IntoIterator<Item = (String, LayoutEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
