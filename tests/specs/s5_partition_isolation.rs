// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S5 — partition isolation: two partitions run the S1 happy path
//! concurrently under one `Controller` and never observe each other —
//! distinct session IDs, and each only ever appears in its own row of
//! `Status`.

use super::support::{auto_confirm_all, controller_with_channels, registry_with_plugin, write_topology, ChannelRegistry};
use odc_core::{AggregatedState, CommonParams, DeviceState, RunNr, StatusCode};
use odc_daemon::protocol::{Request, Response};

const TOPOLOGY: &str = r#"<topology>
    <collection name="readout">
        <task path="readout/0"/>
        <task path="readout/1"/>
    </collection>
</topology>"#;

fn common(partition: &str) -> CommonParams {
    CommonParams::new(partition, RunNr(1), Some(std::time::Duration::from_secs(5)))
}

#[tokio::test]
async fn two_partitions_run_independently_and_stay_isolated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plugins = registry_with_plugin("same", "<config><rms>localhost</rms><agents>1</agents><slots>36</slots></config>");
    let channels = ChannelRegistry::new();
    let controller = controller_with_channels(&dir, plugins, Some("r1"), &channels);

    let topo_p1 = write_topology(&dir, "p1.xml", TOPOLOGY);
    let topo_p2 = write_topology(&dir, "p2.xml", TOPOLOGY);

    // Initialize both partitions first, one at a time, so `ChannelRegistry`
    // records their device channels in a known order before anything runs
    // concurrently.
    let run_p1 = controller
        .handle(Request::Run {
            common: common("p1"),
            session_id: None,
            plugin_name: "same".to_string(),
            resources_json: "{}".to_string(),
            topo_file: Some(topo_p1),
        })
        .await;
    let run_p2 = controller
        .handle(Request::Run {
            common: common("p2"),
            session_id: None,
            plugin_name: "same".to_string(),
            resources_json: "{}".to_string(),
            topo_file: Some(topo_p2),
        })
        .await;

    let Response::Result(run_p1) = run_p1 else { panic!("expected Result") };
    let Response::Result(run_p2) = run_p2 else { panic!("expected Result") };
    assert_eq!(run_p1.status_code, StatusCode::Ok, "p1 Run failed: {run_p1:?}");
    assert_eq!(run_p2.status_code, StatusCode::Ok, "p2 Run failed: {run_p2:?}");
    assert_ne!(run_p1.session_id, run_p2.session_id, "each partition gets its own agent-fabric session");

    let channel_p1 = channels.nth(0);
    let channel_p2 = channels.nth(1);
    let auto_p1 = auto_confirm_all(channel_p1);
    let auto_p2 = auto_confirm_all(channel_p2);

    let (configure_p1, configure_p2) = tokio::join!(
        controller.handle(Request::Configure { common: common("p1"), path: "*".to_string(), detailed: false }),
        controller.handle(Request::Configure { common: common("p2"), path: "*".to_string(), detailed: false }),
    );
    auto_p1.abort();
    auto_p2.abort();

    let Response::Result(configure_p1) = configure_p1 else { panic!("expected Result") };
    let Response::Result(configure_p2) = configure_p2 else { panic!("expected Result") };
    assert_eq!(configure_p1.aggregated_state, AggregatedState::State(DeviceState::Ready));
    assert_eq!(configure_p2.aggregated_state, AggregatedState::State(DeviceState::Ready));

    let status = controller.handle(Request::Status { running_only: false }).await;
    let Response::StatusResult(status) = status else { panic!("expected StatusResult") };
    assert_eq!(status.partitions.len(), 2);

    let p1_row = status.partitions.iter().find(|p| p.partition_id.as_str() == "p1").expect("p1 in status");
    let p2_row = status.partitions.iter().find(|p| p.partition_id.as_str() == "p2").expect("p2 in status");
    assert_ne!(p1_row.session_id, p2_row.session_id);
    assert_eq!(p1_row.session_id, run_p1.session_id);
    assert_eq!(p2_row.session_id, run_p2.session_id);
}
