// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Topology Engine: the four bulk device operations, each an asynchronous
//! object with pre-filter / dispatch / progress / ignore / completion /
//! timeout semantics (§4.7).

use odc_adapters::DeviceChannel;
use odc_core::{DeviceState, DeviceStatus, ErrorCode, OdcError, TaskId, Transition};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

/// Live per-device state table for one activation, plus the in-flight
/// operation bookkeeping the bulk operations need (§4.7 "Owns the mutable
/// `DeviceStatus[]` table").
#[derive(Debug)]
pub struct DeviceTable {
    devices: std::collections::HashMap<TaskId, DeviceStatus>,
    /// Broadcasts `ignore(taskId)` (§4.7) to whichever bulk operation is
    /// currently in flight, since that operation holds this table for its
    /// whole `await` and cannot be reached by taking a second lock.
    ignore_tx: broadcast::Sender<TaskId>,
}

impl DeviceTable {
    pub fn new() -> Self {
        let (ignore_tx, _) = broadcast::channel(64);
        Self { devices: std::collections::HashMap::new(), ignore_tx }
    }

    pub fn insert(&mut self, status: DeviceStatus) {
        self.devices.insert(status.task_id, status);
    }

    pub fn get(&self, task_id: TaskId) -> Option<&DeviceStatus> {
        self.devices.get(&task_id)
    }

    pub fn get_mut(&mut self, task_id: TaskId) -> Option<&mut DeviceStatus> {
        self.devices.get_mut(&task_id)
    }

    pub fn apply_notification(&mut self, task_id: TaskId, last_state: DeviceState, state: DeviceState) {
        if let Some(device) = self.devices.get_mut(&task_id) {
            device.apply_notification(last_state, state);
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &DeviceStatus> {
        self.devices.values()
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    /// Marks `task_id` ignored, if tracked (§4.7 "expendable: mark the
    /// task ignored").
    pub fn mark_ignored(&mut self, task_id: TaskId) {
        if let Some(device) = self.devices.get_mut(&task_id) {
            device.ignored = true;
        }
    }

    /// The sender side of this table's ignore broadcast. Cloning it lets a
    /// caller outside the table's lock (e.g. an orchestrator task reacting
    /// to a task-done event) reach an in-flight bulk operation without
    /// contending for the table itself.
    pub fn ignore_sender(&self) -> broadcast::Sender<TaskId> {
        self.ignore_tx.clone()
    }

    /// Applies `ignore(taskId)` directly, for when nothing is currently
    /// waiting on the broadcast channel (§4.7 "Ignore", at any time).
    pub fn ignore(&mut self, task_id: TaskId) {
        self.mark_ignored(task_id);
        let _ = self.ignore_tx.send(task_id);
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a completed bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Errored,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub status: OutcomeStatus,
    /// Task IDs still outstanding at completion (non-empty only on timeout).
    pub remaining: Vec<TaskId>,
}

/// Drives one bulk `changeState` operation to completion (§4.7 steps
/// 1-6). `table` is locked for the duration by the caller (the
/// orchestrator holds the per-partition mutex across this call).
pub async fn change_state<D: DeviceChannel>(
    channel: &D,
    table: &mut DeviceTable,
    transition: Transition,
    selected: &[TaskId],
    timeout: Duration,
) -> Result<OperationOutcome, OdcError> {
    let target = transition.target_state();
    run_bulk_operation(
        channel,
        table,
        selected,
        timeout,
        target,
        ErrorCode::DeviceChangeStateFailed,
        move |channel, task_id| {
            let channel = channel.clone();
            async move { channel.change_state(task_id, transition).await }
        },
    )
    .await
}

/// Drives one bulk `waitForState` operation: no dispatch step, devices are
/// simply awaited against their current state (§4.7 item 2).
pub async fn wait_for_state<D: DeviceChannel>(
    channel: &D,
    table: &mut DeviceTable,
    target_state: DeviceState,
    selected: &[TaskId],
    timeout: Duration,
) -> Result<OperationOutcome, OdcError> {
    run_bulk_operation(
        channel,
        table,
        selected,
        timeout,
        target_state,
        ErrorCode::DeviceWaitForStateFailed,
        |_channel, _task_id| async { Ok(()) },
    )
    .await
}

/// Drives one bulk `setProperties` operation: dispatch is the property
/// write itself; there is no "success state" notification path, so
/// completion is determined purely by the dispatch replies (§4.7 item 3).
pub async fn set_properties<D: DeviceChannel>(
    channel: &D,
    selected: &[TaskId],
    props: &[(String, String)],
    expendable: &HashSet<TaskId>,
    timeout: Duration,
) -> Result<Vec<TaskId>, OdcError> {
    let deadline = Instant::now() + timeout;
    let mut failed = Vec::new();
    let mut futures = Vec::new();
    for &task_id in selected {
        let channel = channel.clone();
        let props = props.to_vec();
        futures.push(async move { (task_id, channel.set_properties(task_id, &props).await) });
    }

    let results = match tokio::time::timeout_at(deadline, futures_util::future::join_all(futures)).await {
        Ok(results) => results,
        Err(_) => {
            return Err(OdcError::new(
                ErrorCode::OperationTimeout,
                "setProperties timed out before all devices replied".to_string(),
            ))
        }
    };

    for (task_id, result) in results {
        if let Err(e) = result {
            if expendable.contains(&task_id) {
                tracing::warn!(%task_id, error = %e, "expendable device failed setProperties");
            } else {
                failed.push(task_id);
            }
        }
    }

    if failed.is_empty() {
        Ok(Vec::new())
    } else {
        Err(OdcError::new(
            ErrorCode::DeviceSetPropertiesFailed,
            format!("setProperties failed for {} device(s)", failed.len()),
        ))
    }
}

/// Drives one bulk `getProperties` operation (§4.7 item 4).
pub async fn get_properties<D: DeviceChannel>(
    channel: &D,
    selected: &[TaskId],
    keys: &[String],
    timeout: Duration,
) -> Result<Vec<(TaskId, Vec<(String, String)>)>, OdcError> {
    let deadline = Instant::now() + timeout;
    let mut futures = Vec::new();
    for &task_id in selected {
        let channel = channel.clone();
        let keys = keys.to_vec();
        futures.push(async move { (task_id, channel.get_properties(task_id, &keys).await) });
    }

    let results = match tokio::time::timeout_at(deadline, futures_util::future::join_all(futures)).await {
        Ok(results) => results,
        Err(_) => {
            return Err(OdcError::new(
                ErrorCode::OperationTimeout,
                "getProperties timed out before all devices replied".to_string(),
            ))
        }
    };

    let mut out = Vec::new();
    for (task_id, result) in results {
        match result {
            Ok(props) => out.push((task_id, props)),
            Err(e) => {
                return Err(OdcError::new(
                    ErrorCode::DeviceGetPropertiesFailed,
                    format!("task {task_id} getProperties failed: {e}"),
                ))
            }
        }
    }
    Ok(out)
}

/// Shared implementation of the pre-filter/dispatch/progress/completion
/// contract for `changeState` and `waitForState`, which both reduce to
/// "wait until every selected device reaches `target_state`".
async fn run_bulk_operation<D, Dispatch, Fut>(
    channel: &D,
    table: &mut DeviceTable,
    selected: &[TaskId],
    timeout: Duration,
    target_state: DeviceState,
    error_code: ErrorCode,
    dispatch: Dispatch,
) -> Result<OperationOutcome, OdcError>
where
    D: DeviceChannel,
    Dispatch: Fn(&D, TaskId) -> Fut,
    Fut: std::future::Future<Output = Result<(), OdcError>>,
{
    // Pre-filter (§4.7 step 1).
    let mut remaining: HashSet<TaskId> = HashSet::new();
    let mut errored = false;
    for &task_id in selected {
        let Some(device) = table.get(task_id) else { continue };
        if device.state == target_state {
            continue;
        }
        if device.state.is_terminal_failure() {
            if device.expendable {
                table.mark_ignored(task_id);
            } else {
                errored = true;
            }
            continue;
        }
        remaining.insert(task_id);
    }

    if remaining.is_empty() {
        return Ok(complete(errored, Vec::new()));
    }

    // Dispatch (§4.7 step 2). A device whose dispatch itself failed will
    // never send a matching notification, so it is dropped from the
    // remaining set right away instead of being waited on until timeout.
    let dispatch_results = futures_util::future::join_all(
        remaining.iter().map(|&task_id| {
            let fut = dispatch(channel, task_id);
            async move { (task_id, fut.await) }
        }),
    )
    .await;
    for (task_id, result) in dispatch_results {
        if result.is_err() {
            let expendable = table.get(task_id).map(|d| d.expendable).unwrap_or(false);
            if expendable {
                table.mark_ignored(task_id);
            } else {
                errored = true;
            }
            remaining.remove(&task_id);
        }
    }

    if remaining.is_empty() {
        return if errored {
            Err(OdcError::new(error_code, format!("operation failed to reach {target_state} for all devices")))
        } else {
            Ok(complete(false, Vec::new()))
        };
    }

    // Progress: fan in every remaining device's notification stream into
    // one channel (§4.7 step 3). `ignore_rx` lets `ignore(taskId)` reach
    // this operation while it exclusively holds `table` across this await
    // (§4.7 "Ignore", at any time).
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ignore_rx = table.ignore_sender().subscribe();
    let mut forwarders = Vec::new();
    for &task_id in &remaining {
        let mut device_rx = channel.subscribe(task_id);
        let tx = tx.clone();
        forwarders.push(tokio::spawn(async move {
            while let Some(notification) = device_rx.recv().await {
                if tx.send(notification).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    loop {
        if remaining.is_empty() {
            break;
        }
        tokio::select! {
            result = tokio::time::timeout_at(deadline, rx.recv()) => match result {
                Ok(Some(notification)) => {
                    if !remaining.contains(&notification.task_id) {
                        continue;
                    }
                    table.apply_notification(notification.task_id, notification.last_state, notification.state);
                    if notification.state == target_state {
                        remaining.remove(&notification.task_id);
                    } else if notification.state.is_terminal_failure() {
                        let expendable = table.get(notification.task_id).map(|d| d.expendable).unwrap_or(false);
                        remaining.remove(&notification.task_id);
                        if expendable {
                            table.mark_ignored(notification.task_id);
                        } else {
                            errored = true;
                        }
                    }
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    for handle in &forwarders {
                        handle.abort();
                    }
                    return Err(OdcError::new(
                        ErrorCode::OperationTimeout,
                        format!("{} device(s) did not reach {target_state} before the deadline", remaining.len()),
                    ));
                }
            },
            ignored = ignore_rx.recv() => {
                if let Ok(task_id) = ignored {
                    if remaining.remove(&task_id) {
                        table.mark_ignored(task_id);
                    }
                }
            }
        }
    }

    for handle in forwarders {
        handle.abort();
    }

    if errored {
        return Err(OdcError::new(error_code, format!("operation failed to reach {target_state} for all devices")));
    }

    Ok(complete(false, Vec::new()))
}

fn complete(errored: bool, remaining: Vec<TaskId>) -> OperationOutcome {
    OperationOutcome {
        status: if errored { OutcomeStatus::Errored } else { OutcomeStatus::Success },
        remaining,
    }
}

/// Owns one partition's live device-status table and drives the bulk
/// operations against it. Thin facade over the free functions above so
/// callers (the orchestrator) hold one handle per partition instead of
/// threading the table through every call site.
pub struct TopologyEngine {
    table: DeviceTable,
}

impl TopologyEngine {
    pub fn new() -> Self {
        Self { table: DeviceTable::new() }
    }

    pub fn table(&self) -> &DeviceTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DeviceTable {
        &mut self.table
    }

    pub async fn change_state<D: DeviceChannel>(
        &mut self,
        channel: &D,
        transition: Transition,
        selected: &[TaskId],
        timeout: Duration,
    ) -> Result<OperationOutcome, OdcError> {
        change_state(channel, &mut self.table, transition, selected, timeout).await
    }

    pub async fn wait_for_state<D: DeviceChannel>(
        &mut self,
        channel: &D,
        target_state: DeviceState,
        selected: &[TaskId],
        timeout: Duration,
    ) -> Result<OperationOutcome, OdcError> {
        wait_for_state(channel, &mut self.table, target_state, selected, timeout).await
    }

    /// A clonable handle to this engine's ignore broadcast, for reaching an
    /// in-flight bulk operation from outside the partition lock.
    pub fn ignore_sender(&self) -> broadcast::Sender<TaskId> {
        self.table.ignore_sender()
    }

    /// Applies `ignore(taskId)` directly against the table (§4.7 "Ignore").
    /// Only safe to call when no bulk operation is currently holding this
    /// engine; callers racing a live operation should send on
    /// [`TopologyEngine::ignore_sender`] instead.
    pub fn ignore(&mut self, task_id: TaskId) {
        self.table.ignore(task_id);
    }
}

impl Default for TopologyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
