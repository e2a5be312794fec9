// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S6 — restore: the daemon restarts with `--restore r1`, the restore
//! file names a session that no longer exists on the agent fabric (killed
//! out from under the daemon), and the daemon must come back up with zero
//! partitions and an emptied restore file rather than a stuck reference.

use odc_adapters::{FakeAgentFabric, FakeDeviceChannel};
use odc_daemon::persistence::{self, RestoreData, RestorePartition};
use odc_daemon::protocol::{Request, Response};
use odc_daemon::{Controller, ControllerConfig};
use odc_plugin::PluginRegistry;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn restore_drops_a_session_killed_out_from_under_the_daemon() {
    let dir = tempfile::tempdir().expect("tempdir");
    let restore_dir = dir.path().join("restore");

    persistence::write_restore(
        &restore_dir,
        "r1",
        &RestoreData { sessions: vec![RestorePartition { partition: "p1".to_string(), session: "sidA".to_string() }] },
    );

    let config = ControllerConfig {
        history_dir: dir.path().join("history"),
        restore_dir: restore_dir.clone(),
        restore_id: Some("r1".to_string()),
        agent_wait_timeout: Duration::from_millis(50),
    };
    let controller: Controller<FakeAgentFabric, FakeDeviceChannel> = Controller::new(
        config,
        Arc::new(PluginRegistry::new()),
        || {
            let fabric = FakeAgentFabric::new();
            // `sidA` was killed externally: re-attaching it must fail.
            fabric.set_fail_attach(true);
            fabric
        },
        FakeDeviceChannel::new,
    );

    controller.restore().await;

    let status = controller.handle(Request::Status { running_only: false }).await;
    let Response::StatusResult(status) = status else { panic!("expected StatusResult") };
    assert!(status.partitions.is_empty(), "the dead session must not surface as a live partition");

    let rewritten = persistence::read_restore(&restore_dir, "r1");
    assert!(rewritten.sessions.is_empty(), "the restore file must be rewritten without the dead session");
}
