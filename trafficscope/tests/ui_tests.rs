//! UI tests using iced_test Simulator.
//!
//! These tests verify the UI behavior without needing a snapshot endpoint.

use std::sync::Arc;

use iced_test::simulator;

use trafficscope::message::Message;
use trafficscope::view::topology::{TopologyState, topology_view};
use trafficscope_common::{
    LayoutRegistry, PollGate, RawEdge, RawSnapshot, current_timestamp_millis, normalize,
};

fn edge(source: &str, target: &str, value: f64) -> RawEdge {
    RawEdge {
        source: Some(source.to_string()),
        target: Some(target.to_string()),
        value: Some(value),
        kind: None,
    }
}

/// Topology state holding a normalized snapshot of three services.
fn populated_state() -> TopologyState {
    let raw = RawSnapshot {
        links: vec![
            edge("web-app", "api-gateway", 180.0),
            edge("api-gateway", "kpi-service", 40.0),
        ],
        source: Some("real_time".to_string()),
        ..RawSnapshot::default()
    };

    let mut state = TopologyState::default();
    state.apply_snapshot(Arc::new(normalize(&raw, &LayoutRegistry::builtin(), 0)));
    state
}

/// Test that the topology view renders correctly with no snapshot.
#[test]
fn test_topology_view_empty() {
    let state = TopologyState::default();
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("Traffic Topology").is_ok());
    assert!(ui.find("0 services").is_ok());
    assert!(ui.find("0 edges").is_ok());
    assert!(ui.find("no data").is_ok());
}

/// Test that the header reflects the snapshot.
#[test]
fn test_topology_header_counts() {
    let state = populated_state();
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("3 services").is_ok());
    assert!(ui.find("2 edges").is_ok());
    assert!(ui.find("220/s total").is_ok());
    assert!(ui.find("100%").is_ok());
    assert!(ui.find("Live").is_ok());
    assert!(ui.find("Last update: never").is_ok());
}

/// Test that the last successful fetch is shown after a failure.
#[test]
fn test_topology_last_update_after_failure() {
    let state = populated_state();
    let mut gate = PollGate::new();
    assert!(gate.try_begin());
    gate.succeed(current_timestamp_millis());
    assert!(gate.try_begin());
    gate.fail("HTTP 503");

    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("Last update: 0s ago").is_ok());
    assert!(ui.find("Fetch failed (1x): HTTP 503").is_ok());
}

/// Test topology zoom buttons.
#[test]
fn test_topology_zoom_controls() {
    let state = TopologyState::default();
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    let _ = ui.click("+");
    let _ = ui.click("-");
    let _ = ui.click("Reset");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::ZoomIn)));
    assert!(messages.iter().any(|m| matches!(m, Message::ZoomOut)));
    assert!(messages.iter().any(|m| matches!(m, Message::ZoomReset)));
}

/// Test the refresh and auto-refresh buttons.
#[test]
fn test_topology_refresh_controls() {
    let state = TopologyState::default();
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    let _ = ui.click("Refresh");
    let _ = ui.click("Auto Refresh: ON");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::RefreshNow)));
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::ToggleAutoRefresh))
    );
}

/// Test that the auto-refresh label follows the state.
#[test]
fn test_topology_auto_refresh_off_label() {
    let mut state = TopologyState::default();
    state.toggle_auto_refresh();
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("Auto Refresh: OFF").is_ok());
    assert!(ui.find("Paused").is_ok());
}

/// Test that fetch failures show up in the header.
#[test]
fn test_topology_failure_status() {
    let state = populated_state();
    let mut gate = PollGate::new();
    assert!(gate.try_begin());
    gate.fail("HTTP 500");

    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("Fetch failed (1x): HTTP 500").is_ok());
    // The previous snapshot is still shown.
    assert!(ui.find("3 services").is_ok());
}

/// Test the node info panel of a selected service.
#[test]
fn test_topology_node_info_panel() {
    let mut state = populated_state();
    state.select_node("api-gateway".to_string());
    let gate = PollGate::new();
    let mut ui = simulator(topology_view(&state, &gate));

    assert!(ui.find("Api Gateway").is_ok());
    assert!(ui.find("api-gateway").is_ok());
    assert!(ui.find("Layer: Gateway").is_ok());
    assert!(ui.find("In: 180/s (1 edges)").is_ok());
    assert!(ui.find("Out: 40/s (1 edges)").is_ok());
    assert!(ui.find("Connected").is_ok());

    let _ = ui.click("Kpi Service");
    let _ = ui.click("Clear Selection");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::SelectNode(id) if id == "kpi-service"))
    );
    assert!(messages.iter().any(|m| matches!(m, Message::ClearSelection)));
}
