// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Request envelope types: result assembly, timeout accounting inputs, and
//! error formatting (§2 "Request Envelope", §3 `CommonParams`).

use crate::device::AggregatedState;
use crate::error::Error;
use crate::id::{PartitionId, RunNr, TaskId};
use std::time::Duration;

/// Common parameters carried by every per-partition request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommonParams {
    pub partition_id: PartitionId,
    pub run_nr: RunNr,
    /// Request timeout; `None` means "not set" (no budget enforced).
    pub timeout: Option<Duration>,
}

impl CommonParams {
    pub fn new(partition_id: impl Into<PartitionId>, run_nr: RunNr, timeout: Option<Duration>) -> Self {
        Self {
            partition_id: partition_id.into(),
            run_nr,
            timeout,
        }
    }
}

/// Outcome of a request, orthogonal to the error detail (§2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StatusCode {
    Unknown,
    Ok,
    Error,
}

/// Agent-fabric session lifecycle status, surfaced to operators (mirrors
/// the underlying DDS-style session status in the original source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionStatus {
    Unknown,
    Running,
    Stopped,
}

/// Per-partition status line returned by the aggregate `Status` call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartitionStatus {
    pub partition_id: PartitionId,
    pub session_id: String,
    pub session_status: SessionStatus,
    pub aggregated_state: AggregatedState,
}

/// Result of a single per-partition request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestResult {
    pub status_code: StatusCode,
    pub msg: String,
    pub exec_time: Duration,
    pub error: Option<Error>,
    pub partition_id: PartitionId,
    pub run_nr: RunNr,
    pub session_id: String,
    pub aggregated_state: AggregatedState,
    /// Tasks excluded from `aggregated_state` because they are expendable
    /// and reached a terminal failure (§4.7 "ignore" step).
    pub ignored: Vec<TaskId>,
}

impl RequestResult {
    pub fn success(
        partition_id: PartitionId,
        run_nr: RunNr,
        session_id: impl Into<String>,
        exec_time: Duration,
        aggregated_state: AggregatedState,
    ) -> Self {
        Self {
            status_code: StatusCode::Ok,
            msg: String::new(),
            exec_time,
            error: None,
            partition_id,
            run_nr,
            session_id: session_id.into(),
            aggregated_state,
            ignored: Vec::new(),
        }
    }

    /// Attaches the set of tasks excluded from `aggregated_state`.
    pub fn with_ignored(mut self, ignored: Vec<TaskId>) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn failure(
        partition_id: PartitionId,
        run_nr: RunNr,
        session_id: impl Into<String>,
        exec_time: Duration,
        error: Error,
    ) -> Self {
        Self {
            status_code: StatusCode::Error,
            msg: error.details.clone(),
            exec_time,
            error: Some(error),
            partition_id,
            run_nr,
            session_id: session_id.into(),
            aggregated_state: AggregatedState::Undefined,
            ignored: Vec::new(),
        }
    }
}

/// Result of the aggregate `Status` request across every partition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusRequestResult {
    pub status_code: StatusCode,
    pub msg: String,
    pub exec_time: Duration,
    pub error: Option<Error>,
    pub partitions: Vec<PartitionStatus>,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
