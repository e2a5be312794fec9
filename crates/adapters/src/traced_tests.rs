// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;
use crate::fake_device_channel::FakeDeviceChannel;
use crate::fake_fabric::FakeAgentFabric;
use odc_core::{DeviceState, TaskId, Transition};

#[tokio::test]
async fn traced_fabric_delegates_create_session() {
    let fabric = TracedFabric::new(FakeAgentFabric::new());
    let id = fabric.create_session().await.unwrap();
    assert!(id.starts_with("fake-session-"));
}

#[tokio::test]
async fn traced_fabric_surfaces_inner_errors() {
    let inner = FakeAgentFabric::new();
    inner.set_fail_create(true);
    let fabric = TracedFabric::new(inner);
    assert!(fabric.create_session().await.is_err());
}

#[tokio::test]
async fn traced_device_channel_delegates_change_state() {
    let channel = TracedDeviceChannel::new(FakeDeviceChannel::new());
    channel.change_state(TaskId(1), Transition::Run).await.unwrap();
}

#[tokio::test]
async fn traced_device_channel_surfaces_notifications() {
    let channel = TracedDeviceChannel::new(FakeDeviceChannel::new());
    let mut rx = channel.subscribe(TaskId(1));
    channel.inner.notify(TaskId(1), DeviceState::Ready, DeviceState::Running);
    let event = rx.recv().await.unwrap();
    assert_eq!(event.state, DeviceState::Running);
}
