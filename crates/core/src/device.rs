// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Device state machine data (owned by each device; the core only issues
//! transitions and observes notifications — §1 Non-goals).

use crate::id::{CollectionId, TaskId};
use std::collections::HashSet;

/// A device's lifecycle state. The controller never invents states, only
/// forwards operator-initiated transitions and observes notifications
/// (§4.6, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DeviceState {
    Idle,
    InitializingDevice,
    Initialized,
    Bound,
    DeviceReady,
    Ready,
    Running,
    Error,
    Exiting,
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceState::Idle => "Idle",
            DeviceState::InitializingDevice => "InitializingDevice",
            DeviceState::Initialized => "Initialized",
            DeviceState::Bound => "Bound",
            DeviceState::DeviceReady => "DeviceReady",
            DeviceState::Ready => "Ready",
            DeviceState::Running => "Running",
            DeviceState::Error => "Error",
            DeviceState::Exiting => "Exiting",
        };
        write!(f, "{s}")
    }
}

impl DeviceState {
    /// Devices in these states are excluded from in-flight bulk operations
    /// unless expendable (§4.7 pre-filtering).
    pub fn is_terminal_failure(self) -> bool {
        matches!(self, DeviceState::Error | DeviceState::Exiting)
    }
}

/// A named arc in the device state machine (§4.7 state-machine target map).
/// The engine never invents transitions, only forwards operator-initiated
/// ones (Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Transition {
    InitDevice,
    CompleteInit,
    Bind,
    Connect,
    InitTask,
    Run,
    Stop,
    ResetTask,
    ResetDevice,
    End,
}

impl Transition {
    /// The target *current-state* reached by a successful transition.
    pub fn target_state(self) -> DeviceState {
        match self {
            Transition::InitDevice => DeviceState::InitializingDevice,
            Transition::CompleteInit => DeviceState::Initialized,
            Transition::Bind => DeviceState::Bound,
            Transition::Connect => DeviceState::DeviceReady,
            Transition::InitTask => DeviceState::Ready,
            Transition::Run => DeviceState::Running,
            Transition::Stop => DeviceState::Ready,
            Transition::ResetTask => DeviceState::DeviceReady,
            Transition::ResetDevice => DeviceState::Idle,
            Transition::End => DeviceState::Exiting,
        }
    }

    /// Configure is the composite `InitDevice -> CompleteInit -> Bind ->
    /// Connect -> InitTask` (§4.7).
    pub fn configure_sequence() -> &'static [Transition] {
        &[
            Transition::InitDevice,
            Transition::CompleteInit,
            Transition::Bind,
            Transition::Connect,
            Transition::InitTask,
        ]
    }

    /// Reset is the composite `ResetTask -> ResetDevice` (§4.7).
    pub fn reset_sequence() -> &'static [Transition] {
        &[Transition::ResetTask, Transition::ResetDevice]
    }
}

/// Mutable per-device record (§3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeviceStatus {
    pub task_id: TaskId,
    pub collection_id: Option<CollectionId>,
    pub last_state: DeviceState,
    pub state: DeviceState,
    pub ignored: bool,
    pub expendable: bool,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub subscribed_to_state_changes: bool,
}

impl DeviceStatus {
    pub fn new(task_id: TaskId, collection_id: Option<CollectionId>, expendable: bool) -> Self {
        Self {
            task_id,
            collection_id,
            last_state: DeviceState::Idle,
            state: DeviceState::Idle,
            ignored: false,
            expendable,
            exit_code: None,
            signal: None,
            subscribed_to_state_changes: false,
        }
    }

    /// Apply an unsolicited state-update notification (§4.6). Notifications
    /// may arrive out of order across devices but are in order per device;
    /// the caller is responsible for serializing calls per device.
    pub fn apply_notification(&mut self, last_state: DeviceState, state: DeviceState) {
        self.last_state = last_state;
        self.state = state;
    }
}

/// Roll-up of per-device states into a single status (Glossary:
/// `Undefined` if empty; `Mixed` if the state set has cardinality > 1;
/// otherwise the single shared state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AggregatedState {
    Undefined,
    Mixed,
    State(DeviceState),
}

impl std::fmt::Display for AggregatedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregatedState::Undefined => write!(f, "Undefined"),
            AggregatedState::Mixed => write!(f, "Mixed"),
            AggregatedState::State(s) => write!(f, "{s}"),
        }
    }
}

/// Pure function: aggregated state depends only on the current per-device
/// states and the set of ignored devices (invariant 5, invariant 6).
pub fn aggregate(devices: &[DeviceStatus], ignored: &HashSet<TaskId>) -> AggregatedState {
    let mut states: HashSet<DeviceState> = HashSet::new();
    for d in devices {
        if ignored.contains(&d.task_id) || d.ignored {
            continue;
        }
        states.insert(d.state);
    }

    let mut iter = states.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => AggregatedState::Undefined,
        (Some(only), None) => AggregatedState::State(only),
        (Some(_), Some(_)) => AggregatedState::Mixed,
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
