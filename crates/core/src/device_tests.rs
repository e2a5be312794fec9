// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;

fn status(task: u64, state: DeviceState) -> DeviceStatus {
    let mut s = DeviceStatus::new(TaskId(task), None, false);
    s.state = state;
    s
}

#[test]
fn aggregate_of_empty_set_is_undefined() {
    assert_eq!(aggregate(&[], &HashSet::new()), AggregatedState::Undefined);
}

#[test]
fn aggregate_of_single_shared_state_is_that_state() {
    let devices = vec![status(1, DeviceState::Running), status(2, DeviceState::Running)];
    assert_eq!(
        aggregate(&devices, &HashSet::new()),
        AggregatedState::State(DeviceState::Running)
    );
}

#[test]
fn aggregate_of_differing_states_is_mixed() {
    let devices = vec![status(1, DeviceState::Running), status(2, DeviceState::Ready)];
    assert_eq!(aggregate(&devices, &HashSet::new()), AggregatedState::Mixed);
}

#[test]
fn ignored_devices_are_excluded_from_aggregation() {
    let devices = vec![status(1, DeviceState::Running), status(2, DeviceState::Error)];
    let mut ignored = HashSet::new();
    ignored.insert(TaskId(2));
    assert_eq!(
        aggregate(&devices, &ignored),
        AggregatedState::State(DeviceState::Running)
    );
}

#[test]
fn per_device_ignored_flag_is_also_excluded() {
    let mut devices = vec![status(1, DeviceState::Running), status(2, DeviceState::Error)];
    devices[1].ignored = true;
    assert_eq!(
        aggregate(&devices, &HashSet::new()),
        AggregatedState::State(DeviceState::Running)
    );
}

#[test]
fn all_devices_ignored_is_undefined() {
    let devices = vec![status(1, DeviceState::Running)];
    let mut ignored = HashSet::new();
    ignored.insert(TaskId(1));
    assert_eq!(aggregate(&devices, &ignored), AggregatedState::Undefined);
}

#[yare::parameterized(
    init_device = { Transition::InitDevice, DeviceState::InitializingDevice },
    complete_init = { Transition::CompleteInit, DeviceState::Initialized },
    bind = { Transition::Bind, DeviceState::Bound },
    connect = { Transition::Connect, DeviceState::DeviceReady },
    init_task = { Transition::InitTask, DeviceState::Ready },
    run = { Transition::Run, DeviceState::Running },
    stop = { Transition::Stop, DeviceState::Ready },
    reset_task = { Transition::ResetTask, DeviceState::DeviceReady },
    reset_device = { Transition::ResetDevice, DeviceState::Idle },
    end = { Transition::End, DeviceState::Exiting },
)]
fn transition_target_state_matches_table(transition: Transition, expected: DeviceState) {
    assert_eq!(transition.target_state(), expected);
}

#[test]
fn configure_sequence_ends_at_ready() {
    let seq = Transition::configure_sequence();
    let last = seq.last().copied().unwrap();
    assert_eq!(last.target_state(), DeviceState::Ready);
}

#[test]
fn reset_sequence_ends_at_idle() {
    let seq = Transition::reset_sequence();
    let last = seq.last().copied().unwrap();
    assert_eq!(last.target_state(), DeviceState::Idle);
}

#[test]
fn apply_notification_updates_last_and_current_state() {
    let mut s = status(1, DeviceState::Ready);
    s.apply_notification(DeviceState::Ready, DeviceState::Running);
    assert_eq!(s.last_state, DeviceState::Ready);
    assert_eq!(s.state, DeviceState::Running);
}

#[test]
fn error_and_exiting_are_terminal_failures() {
    assert!(DeviceState::Error.is_terminal_failure());
    assert!(DeviceState::Exiting.is_terminal_failure());
    assert!(!DeviceState::Running.is_terminal_failure());
}
