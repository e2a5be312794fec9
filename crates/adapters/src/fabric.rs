// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Agent Fabric Adapter: create/attach/shutdown sessions, submit agents,
//! activate/update topology, stream task-done events (§4.4).

use async_trait::async_trait;
use odc_core::{AgentId, OdcError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The kind of topology change an `activate_topology` call applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyUpdateType {
    Activate,
    Update,
    Stop,
}

/// One agent in the fabric's current roster (§4.4 `agentInfo`).
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInfo {
    pub agent_id: AgentId,
    pub slots: u32,
    pub host: String,
    pub group: String,
    pub zone: String,
}

/// A task-done event emitted on the subscription stream (§4.4
/// `subscribeTaskDone`).
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDoneEvent {
    pub task_id: odc_core::TaskId,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
}

/// External cluster agent manager, abstracted behind an async trait so the
/// orchestrator can be driven by a fake in tests. The adapter never owns
/// the per-partition lock; every call's timeout is the caller's remaining
/// request budget (§5).
#[async_trait]
pub trait AgentFabricAdapter: Clone + Send + Sync + 'static {
    async fn create_session(&self) -> Result<String, OdcError>;

    async fn attach_session(&self, session_id: &str) -> Result<(), OdcError>;

    async fn submit(&self, session_id: &str, resources: &str) -> Result<(), OdcError>;

    /// Polls agent counts until `active >= required` or `deadline` passes
    /// (§4.4: "on deadline returns shortfall as failure").
    async fn wait_for_active_slots(
        &self,
        session_id: &str,
        required: u32,
        deadline: Instant,
    ) -> Result<(), OdcError>;

    async fn activate_topology(
        &self,
        session_id: &str,
        xml_file: &str,
        update_type: TopologyUpdateType,
    ) -> Result<(), OdcError>;

    /// Best-effort: never returns a fatal error to the caller (§4.4).
    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId);

    async fn shutdown_session(&self, session_id: &str) -> Result<(), OdcError>;

    /// Subscribes to this session's task-done events (§4.4
    /// `subscribeTaskDone`, §4.8 "on each task-done event"). The returned
    /// receiver yields events until the session is torn down, mirroring
    /// [`odc_adapters::DeviceChannel::subscribe`]'s non-fallible shape.
    fn subscribe_task_done(&self, session_id: &str) -> mpsc::UnboundedReceiver<TaskDoneEvent>;

    async fn agent_info(&self, session_id: &str) -> Result<Vec<AgentInfo>, OdcError>;
}

/// Default poll interval used by adapter implementations of
/// `wait_for_active_slots`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[cfg(test)]
#[path = "fabric_tests.rs"]
mod tests;
