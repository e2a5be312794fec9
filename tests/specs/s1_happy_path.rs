// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S1 — happy path: Run with a same-host plugin and a 1-group,
//! 1-collection, 6-task topology, then Configure+Start to `Running`.

use super::support::{auto_confirm_all, registry_with_plugin, write_topology};
use odc_adapters::{FakeAgentFabric, FakeDeviceChannel};
use odc_core::{AggregatedState, CommonParams, DeviceState, RunNr, StatusCode};
use odc_daemon::{Phase, PartitionOrchestrator};
use std::time::Duration;

const TOPOLOGY: &str = r#"<topology>
    <collection name="readout">
        <task path="readout/0"/>
        <task path="readout/1"/>
        <task path="readout/2"/>
        <task path="readout/3"/>
        <task path="readout/4"/>
        <task path="readout/5"/>
    </collection>
</topology>"#;

fn common() -> CommonParams {
    CommonParams::new("p1", RunNr(1), Some(Duration::from_secs(5)))
}

#[tokio::test]
async fn run_then_configure_and_start_reaches_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plugins = registry_with_plugin("same", "<config><rms>localhost</rms><agents>1</agents><slots>36</slots></config>");
    let fabric = FakeAgentFabric::new();
    let channel = FakeDeviceChannel::new();
    let orchestrator = PartitionOrchestrator::new("p1", fabric, channel.clone(), plugins);

    let topo_path = write_topology(&dir, "topo.xml", TOPOLOGY);
    let run = orchestrator.exec_run(common(), None, "same", "{}", Some(topo_path)).await;
    assert_eq!(run.status_code, StatusCode::Ok, "Run failed: {run:?}");
    assert_eq!(orchestrator.phase(), Some(Phase::Active));

    let auto_ack = auto_confirm_all(channel.clone());

    let configure = orchestrator.exec_configure(common(), "*".to_string()).await;
    assert_eq!(configure.status_code, StatusCode::Ok, "Configure failed: {configure:?}");
    assert_eq!(configure.aggregated_state, AggregatedState::State(DeviceState::Ready));

    let start = orchestrator.exec_start(common(), "*".to_string()).await;
    assert_eq!(start.status_code, StatusCode::Ok, "Start failed: {start:?}");
    assert_eq!(start.aggregated_state, AggregatedState::State(DeviceState::Running));

    auto_ack.abort();

    let session = orchestrator.session_snapshot();
    assert_eq!(session.task_details.len(), 6, "all six tasks should be known to the session");
}
