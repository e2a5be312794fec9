// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Fake Agent Fabric Adapter for testing.

use crate::fabric::{AgentFabricAdapter, AgentInfo, TaskDoneEvent, TopologyUpdateType};
use async_trait::async_trait;
use odc_core::{AgentId, ErrorCode, OdcError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Recorded fabric call, in the order it occurred (mirrors the `SessionCall`
/// log pattern used by fake adapters elsewhere in this workspace).
#[derive(Debug, Clone, PartialEq)]
pub enum FabricCall {
    CreateSession,
    AttachSession { session_id: String },
    Submit { session_id: String, resources: String },
    WaitForActiveSlots { session_id: String, required: u32 },
    ActivateTopology { session_id: String, xml_file: String, update_type: TopologyUpdateType },
    ShutdownAgent { session_id: String, agent_id: AgentId },
    ShutdownSession { session_id: String },
    SubscribeTaskDone { session_id: String },
    AgentInfo { session_id: String },
}

struct FakeFabricState {
    calls: Vec<FabricCall>,
    sessions: HashMap<String, Vec<AgentInfo>>,
    next_session: u64,
    fail_create: bool,
    fail_attach: bool,
    fail_submit: bool,
    active_slots: u32,
    task_done_subscribers: HashMap<String, mpsc::UnboundedSender<TaskDoneEvent>>,
}

/// In-memory stand-in for the external agent fabric, recording every call
/// for assertions and letting tests script specific failures.
#[derive(Clone)]
pub struct FakeAgentFabric {
    inner: Arc<Mutex<FakeFabricState>>,
}

impl Default for FakeAgentFabric {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeFabricState {
                calls: Vec::new(),
                sessions: HashMap::new(),
                next_session: 0,
                fail_create: false,
                fail_attach: false,
                fail_submit: false,
                active_slots: u32::MAX,
                task_done_subscribers: HashMap::new(),
            })),
        }
    }
}

impl FakeAgentFabric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FabricCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.inner.lock().fail_create = fail;
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.inner.lock().fail_attach = fail;
    }

    pub fn set_fail_submit(&self, fail: bool) {
        self.inner.lock().fail_submit = fail;
    }

    /// Caps the number of slots `wait_for_active_slots` reports as active,
    /// so tests can exercise the nMin-shortfall timeout path.
    pub fn set_active_slots(&self, n: u32) {
        self.inner.lock().active_slots = n;
    }

    pub fn seed_agent_info(&self, session_id: &str, agents: Vec<AgentInfo>) {
        self.inner.lock().sessions.insert(session_id.to_string(), agents);
    }

    /// Delivers a task-done event to `session_id`'s live subscriber, if
    /// any, mirroring [`crate::FakeDeviceChannel::notify`].
    pub fn emit_task_done(&self, session_id: &str, event: TaskDoneEvent) {
        let inner = self.inner.lock();
        if let Some(tx) = inner.task_done_subscribers.get(session_id) {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl AgentFabricAdapter for FakeAgentFabric {
    async fn create_session(&self) -> Result<String, OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::CreateSession);
        if inner.fail_create {
            return Err(OdcError::new(ErrorCode::DdsCreateSessionFailed, "fake: create_session failed"));
        }
        inner.next_session += 1;
        Ok(format!("fake-session-{}", inner.next_session))
    }

    async fn attach_session(&self, session_id: &str) -> Result<(), OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::AttachSession { session_id: session_id.to_string() });
        if inner.fail_attach {
            return Err(OdcError::new(
                ErrorCode::DdsAttachToSessionFailed,
                format!("fake: session {session_id:?} is gone"),
            ));
        }
        Ok(())
    }

    async fn submit(&self, session_id: &str, resources: &str) -> Result<(), OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::Submit {
            session_id: session_id.to_string(),
            resources: resources.to_string(),
        });
        if inner.fail_submit {
            return Err(OdcError::new(ErrorCode::DdsSubmitAgentsFailed, "fake: submit failed"));
        }
        Ok(())
    }

    async fn wait_for_active_slots(
        &self,
        session_id: &str,
        required: u32,
        deadline: Instant,
    ) -> Result<(), OdcError> {
        {
            let mut inner = self.inner.lock();
            inner.calls.push(FabricCall::WaitForActiveSlots {
                session_id: session_id.to_string(),
                required,
            });
        }
        loop {
            let active = self.inner.lock().active_slots;
            if active >= required {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(OdcError::new(
                    ErrorCode::DdsSubmitAgentsFailed,
                    format!("only {active} of {required} required slots became active"),
                ));
            }
            tokio::time::sleep(crate::fabric::POLL_INTERVAL).await;
        }
    }

    async fn activate_topology(
        &self,
        session_id: &str,
        xml_file: &str,
        update_type: TopologyUpdateType,
    ) -> Result<(), OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::ActivateTopology {
            session_id: session_id.to_string(),
            xml_file: xml_file.to_string(),
            update_type,
        });
        Ok(())
    }

    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId) {
        self.inner.lock().calls.push(FabricCall::ShutdownAgent {
            session_id: session_id.to_string(),
            agent_id,
        });
    }

    async fn shutdown_session(&self, session_id: &str) -> Result<(), OdcError> {
        self.inner
            .lock()
            .calls
            .push(FabricCall::ShutdownSession { session_id: session_id.to_string() });
        Ok(())
    }

    fn subscribe_task_done(&self, session_id: &str) -> mpsc::UnboundedReceiver<TaskDoneEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::SubscribeTaskDone { session_id: session_id.to_string() });
        inner.task_done_subscribers.insert(session_id.to_string(), tx);
        rx
    }

    async fn agent_info(&self, session_id: &str) -> Result<Vec<AgentInfo>, OdcError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FabricCall::AgentInfo { session_id: session_id.to_string() });
        Ok(inner.sessions.get(session_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_fabric_tests.rs"]
mod tests;
