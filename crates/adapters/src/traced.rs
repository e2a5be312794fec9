// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Traced adapter wrappers for consistent observability.

use crate::device_channel::{DeviceChannel, StateNotification};
use crate::fabric::{AgentFabricAdapter, AgentInfo, TaskDoneEvent, TopologyUpdateType};
use async_trait::async_trait;
use odc_core::{AgentId, OdcError, TaskId, Transition};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wrapper that adds tracing to any `AgentFabricAdapter`.
#[derive(Clone)]
pub struct TracedFabric<A> {
    inner: A,
}

impl<A> TracedFabric<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AgentFabricAdapter> AgentFabricAdapter for TracedFabric<A> {
    async fn create_session(&self) -> Result<String, OdcError> {
        async {
            let start = Instant::now();
            let result = self.inner.create_session().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(id) => tracing::info!(session_id = id.as_str(), elapsed_ms, "session created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create_session failed"),
            }
            result
        }
        .instrument(tracing::info_span!("fabric.create_session"))
        .await
    }

    async fn attach_session(&self, session_id: &str) -> Result<(), OdcError> {
        let result = self.inner.attach_session(session_id).await;
        if let Err(ref e) = result {
            tracing::error!(session_id, error = %e, "attach_session failed");
        }
        result
    }

    async fn submit(&self, session_id: &str, resources: &str) -> Result<(), OdcError> {
        async {
            tracing::info!(resources, "submitting agents");
            let result = self.inner.submit(session_id, resources).await;
            if let Err(ref e) = result {
                tracing::error!(error = %e, "submit failed");
            }
            result
        }
        .instrument(tracing::info_span!("fabric.submit", session_id))
        .await
    }

    async fn wait_for_active_slots(
        &self,
        session_id: &str,
        required: u32,
        deadline: Instant,
    ) -> Result<(), OdcError> {
        let result = self.inner.wait_for_active_slots(session_id, required, deadline).await;
        tracing::info_span!("fabric.wait_for_active_slots", session_id, required).in_scope(|| {
            match &result {
                Ok(()) => tracing::info!("slots became active"),
                Err(e) => tracing::warn!(error = %e, "slot shortfall at deadline"),
            }
        });
        result
    }

    async fn activate_topology(
        &self,
        session_id: &str,
        xml_file: &str,
        update_type: TopologyUpdateType,
    ) -> Result<(), OdcError> {
        async {
            let result = self.inner.activate_topology(session_id, xml_file, update_type).await;
            match &result {
                Ok(()) => tracing::info!("topology activated"),
                Err(e) => tracing::error!(error = %e, "activate_topology failed"),
            }
            result
        }
        .instrument(tracing::info_span!("fabric.activate_topology", session_id, ?update_type))
        .await
    }

    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId) {
        tracing::info_span!("fabric.shutdown_agent", session_id, %agent_id)
            .in_scope(|| tracing::info!("shutting down agent (best-effort)"));
        self.inner.shutdown_agent(session_id, agent_id).await;
    }

    async fn shutdown_session(&self, session_id: &str) -> Result<(), OdcError> {
        let result = self.inner.shutdown_session(session_id).await;
        tracing::info_span!("fabric.shutdown_session", session_id).in_scope(|| match &result {
            Ok(()) => tracing::info!("session shut down"),
            Err(e) => tracing::warn!(error = %e, "shutdown_session failed (session removed regardless)"),
        });
        result
    }

    fn subscribe_task_done(&self, session_id: &str) -> mpsc::UnboundedReceiver<TaskDoneEvent> {
        tracing::info_span!("fabric.subscribe_task_done", session_id)
            .in_scope(|| tracing::debug!("subscribing to task-done events"));
        self.inner.subscribe_task_done(session_id)
    }

    async fn agent_info(&self, session_id: &str) -> Result<Vec<AgentInfo>, OdcError> {
        self.inner.agent_info(session_id).await
    }
}

/// Wrapper that adds tracing to any `DeviceChannel`.
#[derive(Clone)]
pub struct TracedDeviceChannel<D> {
    inner: D,
}

impl<D> TracedDeviceChannel<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DeviceChannel> DeviceChannel for TracedDeviceChannel<D> {
    async fn change_state(&self, task_id: TaskId, transition: Transition) -> Result<(), OdcError> {
        let result = self.inner.change_state(task_id, transition).await;
        tracing::info_span!("device.change_state", %task_id, ?transition).in_scope(|| match &result {
            Ok(()) => tracing::debug!("transition accepted"),
            Err(e) => tracing::error!(error = %e, "transition rejected"),
        });
        result
    }

    async fn get_properties(&self, task_id: TaskId, keys: &[String]) -> Result<Vec<(String, String)>, OdcError> {
        let result = self.inner.get_properties(task_id, keys).await;
        if let Err(ref e) = result {
            tracing::error!(%task_id, error = %e, "get_properties failed");
        }
        result
    }

    async fn set_properties(&self, task_id: TaskId, props: &[(String, String)]) -> Result<(), OdcError> {
        let result = self.inner.set_properties(task_id, props).await;
        if let Err(ref e) = result {
            tracing::error!(%task_id, error = %e, "set_properties failed");
        }
        result
    }

    fn subscribe(&self, task_id: TaskId) -> mpsc::UnboundedReceiver<StateNotification> {
        self.inner.subscribe(task_id)
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
