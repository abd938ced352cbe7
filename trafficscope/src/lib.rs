//! TrafficScope - Live service traffic topology viewer.
//!
//! This library exposes the core components for testing.

pub mod app;
pub mod demo;
pub mod message;
pub mod subscription;
pub mod view;

// Re-export commonly used types
pub use app::TrafficScope;
pub use message::Message;
pub use subscription::SnapshotSource;
