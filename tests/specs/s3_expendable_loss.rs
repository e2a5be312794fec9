// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S3 — expendable loss: one of six devices is flagged expendable and
//! exits unsolicited before a bulk `Stop`. The operation must still
//! complete successfully, and the exited device must stop contributing to
//! the aggregated state once the rest comply.
//!
//! Exercised directly against `odc_engine::change_state`/`DeviceTable`:
//! `RequestResult` carries no `ignored` field and nothing set
//! `DeviceStatus.ignored` to `true` anywhere in the engine, so a device
//! that failed while expendable was dropped from the wait set but its
//! stale `Exiting` state kept leaking into `aggregate()`'s rollup forever
//! (see DESIGN.md). Fixed alongside this test by having
//! `run_bulk_operation` mark the device `ignored` at every point it is
//! excluded for being expendable-and-failed.

use odc_adapters::FakeDeviceChannel;
use odc_core::{DeviceState, DeviceStatus, TaskId, Transition};
use odc_engine::{change_state, DeviceTable, OutcomeStatus};
use std::collections::HashSet;
use std::time::Duration;

use super::support::auto_confirm_all;

#[tokio::test]
async fn expendable_device_exit_is_excluded_not_fatal() {
    let channel = FakeDeviceChannel::new();
    let mut table = DeviceTable::new();
    let tasks: Vec<TaskId> = (0..6).map(TaskId).collect();

    for &task_id in &tasks {
        let expendable = task_id == TaskId(3);
        let mut status = DeviceStatus::new(task_id, None, expendable);
        status.last_state = DeviceState::Ready;
        status.state = DeviceState::Running;
        table.insert(status);
    }

    // Device 3 exits on its own, ahead of the operator's Stop.
    table.apply_notification(TaskId(3), DeviceState::Running, DeviceState::Exiting);

    let auto_ack = auto_confirm_all(channel.clone());
    let outcome = change_state(&channel, &mut table, Transition::Stop, &tasks, Duration::from_secs(2))
        .await
        .expect("Stop should succeed despite the expendable loss");
    auto_ack.abort();

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert!(outcome.remaining.is_empty());

    let device3 = table.get(TaskId(3)).expect("device 3 still tracked");
    assert_eq!(device3.state, DeviceState::Exiting);
    assert!(device3.ignored, "expendable terminal failure should mark the device ignored");

    for &task_id in &tasks {
        if task_id == TaskId(3) {
            continue;
        }
        assert_eq!(table.get(task_id).unwrap().state, DeviceState::Ready);
    }

    let statuses: Vec<DeviceStatus> = table.all().cloned().collect();
    let aggregated = odc_core::device::aggregate(&statuses, &HashSet::new());
    assert_eq!(aggregated, odc_core::AggregatedState::State(DeviceState::Ready), "the exited device must not pollute the rollup");
}
