//! TrafficScope Common Library
//!
//! This crate provides the GUI-independent parts of TrafficScope:
//!
//! - [`model`] - Topology data model (`Snapshot`, `ServiceNode`, `TrafficEdge`)
//! - [`wire`] - JSON wire format of the snapshot endpoint
//! - [`registry`] - Static service layout registry
//! - [`normalize`] - Raw snapshot to normalized `Snapshot`
//! - [`client`] - HTTP snapshot client
//! - [`poll`] - In-flight guard for polling
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod poll;
pub mod registry;
pub mod wire;

// Re-export commonly used types at the crate root
pub use client::SnapshotClient;
pub use config::{
    EndpointConfig, LayoutConfig, LogFormat, LoggingConfig, PollConfig, TrafficScopeConfig,
    load_config, parse_config,
};
pub use error::{Error, Result};
pub use model::{
    EdgeKind, HealthStatus, LOGICAL_HEIGHT, LOGICAL_WIDTH, Layer, Position, ServiceId,
    ServiceNode, Snapshot, TrafficEdge, current_timestamp_millis,
};
pub use normalize::{display_name, normalize};
pub use poll::PollGate;
pub use registry::{LayoutEntry, LayoutRegistry, ServiceLayout};
pub use wire::{RawEdge, RawNode, RawSnapshot, RawTimestamp};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
