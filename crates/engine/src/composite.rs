// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! `Configure` and `Reset` composites: fixed sequences of `changeState`
//! bulk operations, short-circuiting on the first failed step (§4.7).

use crate::engine::{change_state, DeviceTable, OperationOutcome, OutcomeStatus};
use odc_adapters::DeviceChannel;
use odc_core::{OdcError, TaskId, Transition};
use std::time::Duration;

/// Runs `transitions` in order against `selected`, stopping at the first
/// transition that does not reach `Success`. Each step gets the full
/// `per_step_timeout` budget; the original does not subdivide a single
/// request timeout across composite steps, and neither do we.
async fn run_sequence<D: DeviceChannel>(
    channel: &D,
    table: &mut DeviceTable,
    transitions: &[Transition],
    selected: &[TaskId],
    per_step_timeout: Duration,
) -> Result<OperationOutcome, OdcError> {
    let mut last = OperationOutcome { status: OutcomeStatus::Success, remaining: Vec::new() };
    for &transition in transitions {
        last = change_state(channel, table, transition, selected, per_step_timeout).await?;
        if last.status != OutcomeStatus::Success {
            return Ok(last);
        }
    }
    Ok(last)
}

/// `InitDevice -> CompleteInit -> Bind -> Connect -> InitTask`, taking
/// every selected device from `Idle` through to `Ready`.
pub async fn configure<D: DeviceChannel>(
    channel: &D,
    table: &mut DeviceTable,
    selected: &[TaskId],
    per_step_timeout: Duration,
) -> Result<OperationOutcome, OdcError> {
    run_sequence(channel, table, Transition::configure_sequence(), selected, per_step_timeout).await
}

/// `ResetTask -> ResetDevice`, taking every selected device back to `Idle`.
pub async fn reset<D: DeviceChannel>(
    channel: &D,
    table: &mut DeviceTable,
    selected: &[TaskId],
    per_step_timeout: Duration,
) -> Result<OperationOutcome, OdcError> {
    run_sequence(channel, table, Transition::reset_sequence(), selected, per_step_timeout).await
}

#[cfg(test)]
#[path = "composite_tests.rs"]
mod tests;
