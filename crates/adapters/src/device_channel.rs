// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Device Channel: per-device request/reply and unsolicited state
//! notifications (§4.6 "Device Channel").

use async_trait::async_trait;
use odc_core::{DeviceState, OdcError, TaskId, Transition};
use tokio::sync::mpsc;

/// Unsolicited `(taskID, lastState, state)` notification. Emissions may be
/// out of order across devices but are in order per device; on exit a
/// terminal `state = Exiting` event is guaranteed (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNotification {
    pub task_id: TaskId,
    pub last_state: DeviceState,
    pub state: DeviceState,
}

/// Per-device request/reply channel plus a notification stream.
#[async_trait]
pub trait DeviceChannel: Clone + Send + Sync + 'static {
    /// Requests a transition on one device.
    async fn change_state(&self, task_id: TaskId, transition: Transition) -> Result<(), OdcError>;

    async fn get_properties(&self, task_id: TaskId, keys: &[String]) -> Result<Vec<(String, String)>, OdcError>;

    async fn set_properties(&self, task_id: TaskId, props: &[(String, String)]) -> Result<(), OdcError>;

    /// Subscribes to this device's unsolicited state notifications. The
    /// returned receiver yields events until the device exits.
    fn subscribe(&self, task_id: TaskId) -> mpsc::UnboundedReceiver<StateNotification>;
}

#[cfg(test)]
#[path = "device_channel_tests.rs"]
mod tests;
