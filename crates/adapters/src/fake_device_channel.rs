// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Fake Device Channel for testing.

use crate::device_channel::{DeviceChannel, StateNotification};
use async_trait::async_trait;
use odc_core::{DeviceState, ErrorCode, OdcError, TaskId, Transition};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Recorded device-channel call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceChannelCall {
    ChangeState { task_id: TaskId, transition: Transition },
    GetProperties { task_id: TaskId, keys: Vec<String> },
    SetProperties { task_id: TaskId, props: Vec<(String, String)> },
}

struct FakeDeviceChannelState {
    calls: Vec<DeviceChannelCall>,
    properties: HashMap<TaskId, HashMap<String, String>>,
    fail_tasks: std::collections::HashSet<TaskId>,
    subscribers: HashMap<TaskId, mpsc::UnboundedSender<StateNotification>>,
}

/// In-memory stand-in for the external per-device control channel. Tests
/// drive device state transitions by calling [`FakeDeviceChannel::notify`]
/// directly, mirroring how the real channel delivers unsolicited updates.
#[derive(Clone)]
pub struct FakeDeviceChannel {
    inner: Arc<Mutex<FakeDeviceChannelState>>,
}

impl Default for FakeDeviceChannel {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeDeviceChannelState {
                calls: Vec::new(),
                properties: HashMap::new(),
                fail_tasks: std::collections::HashSet::new(),
                subscribers: HashMap::new(),
            })),
        }
    }
}

impl FakeDeviceChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeviceChannelCall> {
        self.inner.lock().calls.clone()
    }

    /// Makes every call for `task_id` fail, for exercising partial-failure
    /// and expendable-device paths.
    pub fn set_fail(&self, task_id: TaskId) {
        self.inner.lock().fail_tasks.insert(task_id);
    }

    /// Delivers an unsolicited notification to every live subscriber of
    /// `task_id`.
    pub fn notify(&self, task_id: TaskId, last_state: DeviceState, state: DeviceState) {
        let inner = self.inner.lock();
        if let Some(tx) = inner.subscribers.get(&task_id) {
            let _ = tx.send(StateNotification { task_id, last_state, state });
        }
    }
}

#[async_trait]
impl DeviceChannel for FakeDeviceChannel {
    async fn change_state(&self, task_id: TaskId, transition: Transition) -> Result<(), OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceChannelCall::ChangeState { task_id, transition });
        if inner.fail_tasks.contains(&task_id) {
            return Err(OdcError::new(
                ErrorCode::DeviceChangeStateFailed,
                format!("fake: task {task_id} refused {transition:?}"),
            ));
        }
        Ok(())
    }

    async fn get_properties(&self, task_id: TaskId, keys: &[String]) -> Result<Vec<(String, String)>, OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceChannelCall::GetProperties { task_id, keys: keys.to_vec() });
        if inner.fail_tasks.contains(&task_id) {
            return Err(OdcError::new(
                ErrorCode::DeviceGetPropertiesFailed,
                format!("fake: task {task_id} get_properties failed"),
            ));
        }
        let props = inner.properties.entry(task_id).or_default();
        Ok(keys
            .iter()
            .filter_map(|k| props.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set_properties(&self, task_id: TaskId, props: &[(String, String)]) -> Result<(), OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceChannelCall::SetProperties { task_id, props: props.to_vec() });
        if inner.fail_tasks.contains(&task_id) {
            return Err(OdcError::new(
                ErrorCode::DeviceSetPropertiesFailed,
                format!("fake: task {task_id} set_properties failed"),
            ));
        }
        let entry = inner.properties.entry(task_id).or_default();
        for (k, v) in props {
            entry.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn subscribe(&self, task_id: TaskId) -> mpsc::UnboundedReceiver<StateNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscribers.insert(task_id, tx);
        rx
    }
}

#[cfg(test)]
#[path = "fake_device_channel_tests.rs"]
mod tests;
