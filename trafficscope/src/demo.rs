//! Demo mode simulation engine.
//!
//! Produces a realistic, time-varying traffic snapshot over the built-in
//! platform services, so TrafficScope can run without a backend. The output
//! is a wire-format [`RawSnapshot`] and goes through the same normalizer as
//! fetched data.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use trafficscope_common::{RawEdge, RawNode, RawSnapshot, RawTimestamp};

/// Provenance tag of simulated snapshots.
pub const DEMO_ORIGIN: &str = "demo";

/// Baseline traffic: (source, target, base rate, kind).
const BASELINE_LINKS: &[(&str, &str, f64, &str)] = &[
    ("web-app", "api-gateway", 180.0, "http"),
    ("admin-console", "auth-gateway", 25.0, "http"),
    ("web-app", "auth-gateway", 60.0, "http"),
    ("api-gateway", "conversation-service", 110.0, "http"),
    ("api-gateway", "kpi-service", 70.0, "http"),
    ("api-gateway", "entity-resolution", 45.0, "http"),
    ("auth-gateway", "config-service", 30.0, "http"),
    ("conversation-service", "kafka", 140.0, "message"),
    ("kafka", "notification-service", 90.0, "message"),
    ("kafka", "observability-service", 60.0, "message"),
    ("entity-resolution", "elasticsearch", 55.0, "http"),
    ("kpi-service", "postgres", 80.0, "http"),
    ("kpi-service", "redis", 150.0, "http"),
    ("conversation-service", "postgres", 65.0, "http"),
    ("scheduler", "kafka", 20.0, "message"),
    ("scheduler", "scheduler", 10.0, "message"),
    ("observability-service", "elasticsearch", 35.0, "http"),
    ("notification-service", "redis", 15.0, "http"),
];

/// A service outage affecting health and inbound traffic.
#[derive(Debug, Clone)]
struct Outage {
    service: &'static str,
    start_tick: u64,
    duration_ticks: u64,
}

impl Outage {
    fn is_active(&self, tick: u64) -> bool {
        tick >= self.start_tick && tick < self.start_tick + self.duration_ticks
    }
}

/// Demo simulation state.
pub struct DemoSimulator {
    rng: SmallRng,
    tick: u64,
    /// Per-link phase, so links do not oscillate in lockstep.
    phases: Vec<f64>,
    outages: Vec<Outage>,
}

impl DemoSimulator {
    /// Create a new demo simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_os_rng())
    }

    /// Create a deterministic simulator.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: SmallRng) -> Self {
        let phases = BASELINE_LINKS
            .iter()
            .map(|_| rng.random_range(0.0..2.0 * PI))
            .collect();

        Self {
            rng,
            tick: 0,
            phases,
            outages: Vec::new(),
        }
    }

    /// Services known to the simulation, in first-appearance order.
    pub fn services() -> Vec<&'static str> {
        let mut services: Vec<&'static str> = Vec::new();
        for (source, target, _, _) in BASELINE_LINKS {
            for id in [*source, *target] {
                if !services.contains(&id) {
                    services.push(id);
                }
            }
        }
        services
    }

    /// Advance the simulation and produce the next snapshot.
    pub fn tick(&mut self, timestamp: i64) -> RawSnapshot {
        self.tick += 1;
        self.schedule_outages();

        let tick = self.tick;
        let down: Vec<&'static str> = self
            .outages
            .iter()
            .filter(|o| o.is_active(tick))
            .map(|o| o.service)
            .collect();

        let nodes = Self::services()
            .into_iter()
            .map(|id| RawNode {
                id: id.to_string(),
                status: Some(if down.contains(&id) { "down" } else { "up" }.to_string()),
                ..RawNode::default()
            })
            .collect();

        let links = BASELINE_LINKS
            .iter()
            .zip(self.phases.clone())
            .map(|(&(source, target, base, kind), phase)| {
                let value = if down.contains(&target) {
                    // Callers back off from an unavailable service.
                    base * 0.05
                } else {
                    self.oscillating_rate(base, phase)
                };

                RawEdge {
                    source: Some(source.to_string()),
                    target: Some(target.to_string()),
                    value: Some(value),
                    kind: Some(kind.to_string()),
                }
            })
            .collect();

        RawSnapshot {
            nodes: Some(nodes),
            links,
            timestamp: Some(RawTimestamp::Millis(timestamp)),
            source: Some(DEMO_ORIGIN.to_string()),
        }
    }

    /// Base rate with a slow oscillation and some noise. Never negative.
    fn oscillating_rate(&mut self, base: f64, phase: f64) -> f64 {
        let oscillation = base * 0.4 * (self.tick as f64 * 0.15 + phase).sin();
        let noise = self.rng.random_range(-0.1..0.1) * base;
        (base + oscillation + noise).max(0.0)
    }

    /// Occasionally take a random service down for a while.
    fn schedule_outages(&mut self) {
        let tick = self.tick;
        self.outages.retain(|o| tick < o.start_tick + o.duration_ticks);

        if !self.outages.is_empty() || self.rng.random_range(0..20) != 0 {
            return;
        }

        let services = Self::services();
        let service = services[self.rng.random_range(0..services.len())];
        let duration_ticks = self.rng.random_range(3..10);
        tracing::debug!(service, duration_ticks, "Simulating outage");

        self.outages.push(Outage {
            service,
            start_tick: tick,
            duration_ticks,
        });
    }
}

impl Default for DemoSimulator {
    fn default() -> Self {
        Self::new()
    }
}
