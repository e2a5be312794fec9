// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! odc-adapters: the `AgentFabricAdapter` and `DeviceChannel` traits plus
//! their fake and traced implementations.

pub mod device_channel;
pub mod fabric;
pub mod traced;

pub use device_channel::{DeviceChannel, StateNotification};
pub use fabric::{AgentFabricAdapter, AgentInfo, TaskDoneEvent, TopologyUpdateType, POLL_INTERVAL};
pub use traced::{TracedDeviceChannel, TracedFabric};

#[cfg(any(test, feature = "test-support"))]
pub mod fake_device_channel;
#[cfg(any(test, feature = "test-support"))]
pub mod fake_fabric;

#[cfg(any(test, feature = "test-support"))]
pub use fake_device_channel::{DeviceChannelCall, FakeDeviceChannel};
#[cfg(any(test, feature = "test-support"))]
pub use fake_fabric::{FabricCall, FakeAgentFabric};
