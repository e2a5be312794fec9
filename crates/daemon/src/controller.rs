// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Controller: the top-level partition table and request router (§4.9).

use crate::orchestrator::PartitionOrchestrator;
use crate::persistence::{self, RestoreData, RestorePartition};
use crate::protocol::{Request, Response};
use odc_adapters::{AgentFabricAdapter, DeviceChannel};
use odc_core::{AggregatedState, PartitionStatus, RequestResult, Session, SessionStatus, StatusRequestResult};
use odc_plugin::PluginRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Directories and fixed parameters the controller was started with
/// (§4.9 `defaultTimeout`, `agentWaitTimeout`, `historyDir`, `restoreDir`).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub history_dir: PathBuf,
    pub restore_dir: PathBuf,
    pub restore_id: Option<String>,
    pub agent_wait_timeout: std::time::Duration,
}

/// Top-level object holding the partition table and routing requests to the
/// correct [`PartitionOrchestrator`], creating one lazily on
/// Initialize/Run (§4.9).
pub struct Controller<F, D> {
    config: ControllerConfig,
    plugins: Arc<PluginRegistry>,
    fabric_factory: Arc<dyn Fn() -> F + Send + Sync>,
    channel_factory: Arc<dyn Fn() -> D + Send + Sync>,
    partitions: RwLock<HashMap<String, Arc<PartitionOrchestrator<F, D>>>>,
}

impl<F: AgentFabricAdapter, D: DeviceChannel> Controller<F, D> {
    pub fn new(
        config: ControllerConfig,
        plugins: Arc<PluginRegistry>,
        fabric_factory: impl Fn() -> F + Send + Sync + 'static,
        channel_factory: impl Fn() -> D + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            plugins,
            fabric_factory: Arc::new(fabric_factory),
            channel_factory: Arc::new(channel_factory),
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Reads the restore file and attempts to re-adopt every listed
    /// `(partitionID, sessionID)` pair, dropping ones whose agent-fabric
    /// session no longer exists (§4.9, §8 scenario S6).
    pub async fn restore(&self) {
        let Some(restore_id) = self.config.restore_id.clone() else { return };
        let data = persistence::read_restore(&self.config.restore_dir, &restore_id);

        for entry in data.sessions {
            let fabric = (self.fabric_factory)();
            match fabric.attach_session(&entry.session).await {
                Ok(()) => {
                    let mut session = Session::new(entry.partition.clone());
                    session.session_id = entry.session.clone();
                    let channel = (self.channel_factory)();
                    let orchestrator = Arc::new(
                        PartitionOrchestrator::from_session(session, fabric, channel, self.plugins.clone())
                            .with_agent_wait_timeout(self.config.agent_wait_timeout),
                    );
                    self.partitions.write().insert(entry.partition.clone(), orchestrator);
                    tracing::info!(partition = entry.partition.as_str(), session = entry.session.as_str(), "restored session");
                }
                Err(e) => {
                    tracing::warn!(
                        partition = entry.partition.as_str(),
                        session = entry.session.as_str(),
                        error = %e,
                        "failed to re-attach restored session, dropping"
                    );
                }
            }
        }

        self.rewrite_restore_file();
    }

    fn rewrite_restore_file(&self) {
        let Some(restore_id) = self.config.restore_id.clone() else { return };
        let sessions = self
            .partitions
            .read()
            .iter()
            .map(|(partition, orchestrator)| RestorePartition {
                partition: partition.clone(),
                session: orchestrator.session_snapshot().session_id,
            })
            .collect();
        persistence::write_restore(&self.config.restore_dir, &restore_id, &RestoreData { sessions });
    }

    fn orchestrator_for(&self, partition_id: &str) -> Arc<PartitionOrchestrator<F, D>> {
        if let Some(existing) = self.partitions.read().get(partition_id) {
            return existing.clone();
        }
        let mut partitions = self.partitions.write();
        partitions
            .entry(partition_id.to_string())
            .or_insert_with(|| {
                Arc::new(
                    PartitionOrchestrator::new(
                        partition_id,
                        (self.fabric_factory)(),
                        (self.channel_factory)(),
                        self.plugins.clone(),
                    )
                    .with_agent_wait_timeout(self.config.agent_wait_timeout),
                )
            })
            .clone()
    }

    fn record_history(&self, result: &RequestResult) {
        if result.status_code == odc_core::StatusCode::Ok {
            persistence::append_history(&self.config.history_dir, result.partition_id.as_str(), &result.session_id);
        }
    }

    /// Routes one decoded [`Request`] to the correct partition and returns
    /// the [`Response`] to send back over the wire.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Initialize { common, session_id } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                let result = orchestrator.exec_initialize(common, session_id).await;
                self.record_history(&result);
                self.rewrite_restore_file();
                Response::Result(Box::new(result))
            }

            Request::Submit { common, plugin_name, resources_json, topo_file } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                let result = orchestrator.exec_submit(common, &plugin_name, &resources_json, topo_file.as_deref()).await;
                Response::Result(Box::new(result))
            }

            Request::Activate { common, topo_file } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                let result = orchestrator.exec_activate(common, topo_file).await;
                Response::Result(Box::new(result))
            }

            Request::Run { common, session_id, plugin_name, resources_json, topo_file } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                let result = orchestrator.exec_run(common, session_id, &plugin_name, &resources_json, topo_file).await;
                self.record_history(&result);
                self.rewrite_restore_file();
                Response::Result(Box::new(result))
            }

            Request::Update { common, topo_file } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                let result = orchestrator.exec_update(common, topo_file).await;
                Response::Result(Box::new(result))
            }

            Request::Configure { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_configure(common, path).await))
            }

            Request::Start { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_start(common, path).await))
            }

            Request::Stop { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_stop(common, path).await))
            }

            Request::Reset { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_reset(common, path).await))
            }

            Request::Terminate { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_terminate(common, path).await))
            }

            Request::GetState { common, path, .. } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_get_state(common, path).await))
            }

            Request::SetProperties { common, path, props } => {
                let orchestrator = self.orchestrator_for(common.partition_id.as_str());
                Response::Result(Box::new(orchestrator.exec_set_properties(common, path, props).await))
            }

            Request::Shutdown { common } => {
                let partition_id = common.partition_id.as_str().to_string();
                let orchestrator = self.orchestrator_for(&partition_id);
                let result = orchestrator.exec_shutdown(common).await;
                self.partitions.write().remove(&partition_id);
                self.rewrite_restore_file();
                Response::Result(Box::new(result))
            }

            Request::Status { running_only } => {
                let snapshot: Vec<_> = self.partitions.read().values().cloned().collect();
                let partitions = snapshot
                    .into_iter()
                    .map(|orchestrator| {
                        let session = orchestrator.session_snapshot();
                        let status = if session.topo_file_path.is_some() { SessionStatus::Running } else { SessionStatus::Stopped };
                        PartitionStatus {
                            partition_id: session.partition_id,
                            session_id: session.session_id,
                            session_status: status,
                            aggregated_state: AggregatedState::Undefined,
                        }
                    })
                    .filter(|p| !running_only || p.session_status == SessionStatus::Running)
                    .collect();

                Response::StatusResult(Box::new(StatusRequestResult {
                    status_code: odc_core::StatusCode::Ok,
                    msg: String::new(),
                    exec_time: std::time::Duration::ZERO,
                    error: None,
                    partitions,
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
