//! View components for the TrafficScope application.

pub mod palette;
pub mod topology;
