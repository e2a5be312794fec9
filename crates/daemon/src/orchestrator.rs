// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Partition Orchestrator: one instance per live Session, implementing the
//! `exec*` API and the state machine of §4.8.

use odc_adapters::{AgentFabricAdapter, DeviceChannel, TaskDoneEvent, TopologyUpdateType};
use odc_core::{
    AgentGroupInfo, AggregatedState, CollectionInfo, CommonParams, DeviceStatus, ErrorCode, NMinInfo,
    OdcError, RequestResult, Session, StatusCode, TaskDetails, TaskId, Transition, ZoneGroup,
};
use odc_engine::{DeviceTable, TopologyEngine};
use odc_plugin::{cross_join_zones, parse_plugin_output, PluginRegistry, ZoneDemand};
use odc_topology::{parse as parse_topology, TopologyIndex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex as AsyncMutex};

/// Where a Session currently sits in the §4.8 state diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Submitted,
    Active,
}

/// Default per-request timeout when the caller does not supply one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default wall-clock budget for waiting on agents to become active.
pub const DEFAULT_AGENT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// One instance per live Session (§4.8). `F`/`D` are the agent-fabric and
/// device-channel adapters, generic so the daemon can be driven against
/// fakes in tests exactly as it is against the real external collaborators.
pub struct PartitionOrchestrator<F, D> {
    fabric: F,
    channel: D,
    plugins: Arc<PluginRegistry>,
    agent_wait_timeout: Duration,
    /// Serializes every request against this partition (invariant 2).
    guard: AsyncMutex<()>,
    session: Arc<parking_lot::Mutex<Session>>,
    phase: parking_lot::Mutex<Option<Phase>>,
    engine: Arc<parking_lot::Mutex<TopologyEngine>>,
    index: Arc<parking_lot::Mutex<Option<TopologyIndex>>>,
    /// Set on Activate/Update to the live engine's ignore broadcast, so an
    /// ignore can reach an in-flight bulk operation without taking
    /// `engine`'s lock (§4.8 "Activation").
    ignore_tx: Arc<parking_lot::Mutex<Option<broadcast::Sender<TaskId>>>>,
}

impl<F: AgentFabricAdapter, D: DeviceChannel> PartitionOrchestrator<F, D> {
    pub fn new(partition_id: impl Into<String>, fabric: F, channel: D, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            fabric,
            channel,
            plugins,
            agent_wait_timeout: DEFAULT_AGENT_WAIT_TIMEOUT,
            guard: AsyncMutex::new(()),
            session: Arc::new(parking_lot::Mutex::new(Session::new(partition_id.into()))),
            phase: parking_lot::Mutex::new(None),
            engine: Arc::new(parking_lot::Mutex::new(TopologyEngine::new())),
            index: Arc::new(parking_lot::Mutex::new(None)),
            ignore_tx: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    /// Adopts an already-populated Session, used when reattaching from the
    /// restore file (§9 "Persisted state").
    pub fn from_session(session: Session, fabric: F, channel: D, plugins: Arc<PluginRegistry>) -> Self {
        let phase = if session.topo_file_path.is_some() {
            Some(Phase::Active)
        } else if session.run_attempted {
            Some(Phase::Submitted)
        } else {
            Some(Phase::Initialized)
        };
        Self {
            fabric,
            channel,
            plugins,
            agent_wait_timeout: DEFAULT_AGENT_WAIT_TIMEOUT,
            guard: AsyncMutex::new(()),
            session: Arc::new(parking_lot::Mutex::new(session)),
            phase: parking_lot::Mutex::new(phase),
            engine: Arc::new(parking_lot::Mutex::new(TopologyEngine::new())),
            index: Arc::new(parking_lot::Mutex::new(None)),
            ignore_tx: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    /// Overrides the wall-clock budget Submit-with-recovery waits for
    /// agents to become active (§4.8), in place of [`DEFAULT_AGENT_WAIT_TIMEOUT`].
    pub fn with_agent_wait_timeout(mut self, timeout: Duration) -> Self {
        self.agent_wait_timeout = timeout;
        self
    }

    pub fn session_snapshot(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn phase(&self) -> Option<Phase> {
        *self.phase.lock()
    }

    fn require_phase(&self, allowed: &[Phase]) -> Result<(), OdcError> {
        let current = *self.phase.lock();
        match current {
            Some(p) if allowed.contains(&p) => Ok(()),
            _ => Err(OdcError::new(
                ErrorCode::RequestNotSupported,
                format!("request not valid in phase {current:?}"),
            )),
        }
    }

    fn budget(common: &CommonParams) -> Duration {
        common.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    fn aggregated(&self) -> (AggregatedState, Vec<TaskId>) {
        let engine = self.engine.lock();
        let statuses: Vec<DeviceStatus> = engine.table().all().cloned().collect();
        let ignored: std::collections::HashSet<TaskId> = statuses.iter().filter(|d| d.ignored).map(|d| d.task_id).collect();
        let state = odc_core::device::aggregate(&statuses, &ignored);
        (state, ignored.into_iter().collect())
    }

    fn result_ok(&self, common: &CommonParams, started: Instant, session_id: String) -> RequestResult {
        let (aggregated_state, ignored) = self.aggregated();
        RequestResult::success(
            common.partition_id.clone(),
            common.run_nr,
            session_id,
            started.elapsed(),
            aggregated_state,
        )
        .with_ignored(ignored)
    }

    fn result_err(&self, common: &CommonParams, started: Instant, session_id: String, error: OdcError) -> RequestResult {
        RequestResult::failure(
            common.partition_id.clone(),
            common.run_nr,
            session_id,
            started.elapsed(),
            error.to_protocol_error(),
        )
    }

    fn session_id(&self) -> String {
        self.session.lock().session_id.clone()
    }

    /// `Initialize`: creates or adopts an agent-fabric session.
    pub async fn exec_initialize(&self, common: CommonParams, session_id: Option<String>) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();

        let result = async {
            let sid = match session_id {
                Some(sid) if !sid.is_empty() => {
                    self.fabric.attach_session(&sid).await?;
                    sid
                }
                _ => self.fabric.create_session().await?,
            };
            {
                let mut session = self.session.lock();
                session.session_id = sid.clone();
                session.run_attempted = false;
            }
            *self.phase.lock() = Some(Phase::Initialized);
            Ok::<_, OdcError>(sid)
        }
        .await;

        match result {
            Ok(sid) => self.result_ok(&common, started, sid),
            Err(e) => self.result_err(&common, started, String::new(), e),
        }
    }

    /// `Submit`: runs the named plugin, plans submissions, and submits
    /// agents, accumulating across repeated calls (restartability). An
    /// optional `topo_file` lets zone/nMin demand be sourced from the
    /// topology ahead of Activate (§4.8 step 1's cross-join and nMin
    /// enforcement are otherwise unreachable, since that demand is
    /// normally only known once a topology has been parsed).
    pub async fn exec_submit(
        &self,
        common: CommonParams,
        plugin_name: &str,
        resources_json: &str,
        topo_file: Option<&str>,
    ) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Initialized, Phase::Submitted]) {
            return self.result_err(&common, started, session_id, e);
        }

        if let Some(path) = topo_file {
            if let Err(e) = self.populate_zone_demand(path) {
                return self.result_err(&common, started, session_id, e);
            }
        }

        match self.submit_with_recovery(plugin_name, resources_json).await {
            Ok(()) => {
                *self.phase.lock() = Some(Phase::Submitted);
                self.session.lock().run_attempted = true;
                self.result_ok(&common, started, session_id)
            }
            Err(e) => {
                // A shortfall still leaves the session Submitted and ready
                // for a retry (§8 S4); only genuine nMin-shortfall failures
                // reach this state, not earlier plugin/fabric errors.
                if e.code == ErrorCode::RequestTimeout {
                    *self.phase.lock() = Some(Phase::Submitted);
                    self.session.lock().run_attempted = true;
                }
                self.result_err(&common, started, session_id, e)
            }
        }
    }

    /// Parses `topo_file` far enough to populate the Session's zone and
    /// nMin demand (§3 `zones`, `nMinInfo`) without activating anything,
    /// so Submit-with-recovery's cross-join and nMin check have real data
    /// to work with instead of running against empty maps.
    fn populate_zone_demand(&self, topo_file: &str) -> Result<(), OdcError> {
        let xml = std::fs::read_to_string(topo_file)
            .map_err(|e| OdcError::new(ErrorCode::TopologyFailed, format!("reading {topo_file}: {e}")))?;
        let parsed = parse_topology(&xml)?;
        let index = TopologyIndex::build(&parsed)?;
        populate_topology_demand(&mut self.session.lock(), &index);
        Ok(())
    }

    /// Implements §4.8 "Submit-with-recovery": submit planned agents, wait
    /// for the active-slot deadline, and on shortfall retry once with a
    /// reduced budget before accepting (or failing on) the shortfall.
    async fn submit_with_recovery(&self, plugin_name: &str, resources_json: &str) -> Result<(), OdcError> {
        let session_id = self.session_id();
        let partition_id = odc_core::PartitionId::new(session_id.clone());
        let plugin_output = self.plugins.exec(plugin_name, resources_json, &partition_id, Default::default()).await?;
        let params = parse_plugin_output(&plugin_output.stdout)?;

        let zones: Vec<ZoneDemand> = {
            let session = self.session.lock();
            session
                .zones
                .iter()
                .flat_map(|(zone, groups)| {
                    groups.iter().map(move |g| ZoneDemand {
                        zone: zone.clone(),
                        count: g.count,
                        ncores: g.ncores,
                        agent_group_name: g.agent_group_name.clone(),
                        min_agents: session.agent_group_info.get(&g.agent_group_name).map(|i| i.min_agents),
                    })
                })
                .collect()
        };

        let planned = if zones.is_empty() { params } else { cross_join_zones(&params, &zones) };
        let required: u32 = planned.iter().map(|p| p.agents).sum();

        for _submit in &planned {
            self.fabric.submit(&session_id, resources_json).await?;
        }

        let deadline = Instant::now() + self.agent_wait_timeout;
        if self.fabric.wait_for_active_slots(&session_id, required, deadline).await.is_ok() {
            return Ok(());
        }

        // Shortfall: one retry with a reduced budget (§4.8 step 2) before
        // falling back to the nMin shortfall check (step 3).
        let retry_deadline = Instant::now() + self.agent_wait_timeout / 2;
        if self.fabric.wait_for_active_slots(&session_id, required, retry_deadline).await.is_ok() {
            return Ok(());
        }

        let agents = self.fabric.agent_info(&session_id).await?;
        let active: u32 = agents.iter().map(|a| a.slots).sum();
        let shortfall_acceptable = {
            let session = self.session.lock();
            session.n_min_info.values().all(|info| active >= info.n_min)
        };

        if shortfall_acceptable {
            Ok(())
        } else {
            Err(OdcError::new(
                ErrorCode::RequestTimeout,
                format!("only {active} of {required} required agents became active before the deadline"),
            ))
        }
    }

    /// `Activate`: builds the Topology Model from the effective topology
    /// file, activates it on the agent fabric, and materializes the
    /// device table.
    pub async fn exec_activate(&self, common: CommonParams, topo_file: Option<String>) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Submitted]) {
            return self.result_err(&common, started, session_id, e);
        }

        match self.activate_inner(topo_file).await {
            Ok(()) => {
                *self.phase.lock() = Some(Phase::Active);
                self.result_ok(&common, started, session_id)
            }
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    async fn activate_inner(&self, topo_file: Option<String>) -> Result<(), OdcError> {
        let path = topo_file.ok_or_else(|| OdcError::new(ErrorCode::TopologyFailed, "no topology file provided"))?;
        let xml = std::fs::read_to_string(&path)
            .map_err(|e| OdcError::new(ErrorCode::TopologyFailed, format!("reading {path}: {e}")))?;
        let parsed = parse_topology(&xml)?;
        let index = TopologyIndex::build(&parsed)?;

        let session_id = self.session_id();
        self.fabric.activate_topology(&session_id, &path, TopologyUpdateType::Activate).await?;
        let task_done_rx = self.fabric.subscribe_task_done(&session_id);

        populate_session_from_index(&mut self.session.lock(), &index, &path);

        let mut table = DeviceTable::new();
        for task in index.tasks() {
            table.insert(DeviceStatus::new(task.id, task.collection_id, task.expendable));
        }
        let mut engine = TopologyEngine::new();
        for status in table.all().cloned() {
            engine.table_mut().insert(status);
        }
        *self.ignore_tx.lock() = Some(engine.ignore_sender());
        *self.engine.lock() = engine;
        *self.index.lock() = Some(index);

        tokio::spawn(run_task_done_listener(
            task_done_rx,
            self.engine.clone(),
            self.index.clone(),
            self.session.clone(),
            self.ignore_tx.clone(),
        ));
        Ok(())
    }

    /// `Run`: fused Initialize + Submit + Activate, short-circuiting on the
    /// first sub-step that fails.
    pub async fn exec_run(
        &self,
        common: CommonParams,
        session_id: Option<String>,
        plugin_name: &str,
        resources_json: &str,
        topo_file: Option<String>,
    ) -> RequestResult {
        let init = self.exec_initialize(common.clone(), session_id).await;
        if init.status_code != StatusCode::Ok {
            return init;
        }
        let submit = self.exec_submit(common.clone(), plugin_name, resources_json, topo_file.as_deref()).await;
        if submit.status_code != StatusCode::Ok {
            return submit;
        }
        self.exec_activate(common, topo_file).await
    }

    /// `Update`: replaces the activation atomically (invariant 4).
    pub async fn exec_update(&self, common: CommonParams, topo_file: Option<String>) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }

        self.session.lock().clear_activation();
        match self.activate_inner(topo_file).await {
            Ok(()) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    fn selected_tasks(&self, path: &str) -> Result<Vec<odc_core::TaskId>, OdcError> {
        let index = self.index.lock();
        match index.as_ref() {
            Some(index) => index.select(path),
            None => Err(OdcError::new(ErrorCode::TopologyFailed, "no active topology")),
        }
    }

    /// `Configure`: the composite transition sequence to `Ready` (§4.7).
    pub async fn exec_configure(&self, common: CommonParams, path: String) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }
        let tasks = match self.selected_tasks(&path) {
            Ok(t) => t,
            Err(e) => return self.result_err(&common, started, session_id, e),
        };

        let timeout = Self::budget(&common);
        let mut engine = self.engine.lock();
        match odc_engine::configure(&self.channel, engine.table_mut(), &tasks, timeout).await {
            Ok(_) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    /// `Start` (the `Run` device transition — named to avoid colliding
    /// with the partition-level `Run` request).
    pub async fn exec_start(&self, common: CommonParams, path: String) -> RequestResult {
        self.exec_transition(common, &path, Transition::Run).await
    }

    /// `Stop`.
    pub async fn exec_stop(&self, common: CommonParams, path: String) -> RequestResult {
        self.exec_transition(common, &path, Transition::Stop).await
    }

    /// `Reset`: the composite transition sequence back to `Idle` (§4.7).
    pub async fn exec_reset(&self, common: CommonParams, path: String) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }
        let tasks = match self.selected_tasks(&path) {
            Ok(t) => t,
            Err(e) => return self.result_err(&common, started, session_id, e),
        };

        let timeout = Self::budget(&common);
        let mut engine = self.engine.lock();
        match odc_engine::reset(&self.channel, engine.table_mut(), &tasks, timeout).await {
            Ok(_) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    /// `Terminate`: the `End` transition, after which devices exit.
    pub async fn exec_terminate(&self, common: CommonParams, path: String) -> RequestResult {
        self.exec_transition(common, &path, Transition::End).await
    }

    async fn exec_transition(&self, common: CommonParams, path: &str, transition: Transition) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }
        let tasks = match self.selected_tasks(path) {
            Ok(t) => t,
            Err(e) => return self.result_err(&common, started, session_id, e),
        };

        let timeout = Self::budget(&common);
        let mut engine = self.engine.lock();
        match odc_engine::change_state(&self.channel, engine.table_mut(), transition, &tasks, timeout).await {
            Ok(_) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    /// `GetState`: reports the aggregated state over the selected path,
    /// without issuing any transition (§4.7 "GetState is read-only").
    pub async fn exec_get_state(&self, common: CommonParams, path: String) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }
        let tasks = match self.selected_tasks(&path) {
            Ok(t) => t,
            Err(e) => return self.result_err(&common, started, session_id, e),
        };

        let engine = self.engine.lock();
        let statuses: Vec<DeviceStatus> = tasks.iter().filter_map(|id| engine.table().get(*id).cloned()).collect();
        let ignored: std::collections::HashSet<TaskId> = statuses.iter().filter(|d| d.ignored).map(|d| d.task_id).collect();
        let aggregated = odc_core::device::aggregate(&statuses, &ignored);

        RequestResult::success(common.partition_id, common.run_nr, session_id, started.elapsed(), aggregated)
            .with_ignored(ignored.into_iter().collect())
    }

    /// `SetProperties`.
    pub async fn exec_set_properties(&self, common: CommonParams, path: String, props: Vec<(String, String)>) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        if let Err(e) = self.require_phase(&[Phase::Active]) {
            return self.result_err(&common, started, session_id, e);
        }
        let tasks = match self.selected_tasks(&path) {
            Ok(t) => t,
            Err(e) => return self.result_err(&common, started, session_id, e),
        };

        let expendable = self.session.lock().expendable_tasks.clone();
        let timeout = Self::budget(&common);
        match odc_engine::set_properties(&self.channel, &tasks, &props, &expendable, timeout).await {
            Ok(_) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }

    /// `Shutdown`: tears down the agent-fabric session. Removing the
    /// Session itself from the controller's table is the caller's job.
    pub async fn exec_shutdown(&self, common: CommonParams) -> RequestResult {
        let _guard = self.guard.lock().await;
        let started = Instant::now();
        let session_id = self.session_id();

        match self.fabric.shutdown_session(&session_id).await {
            Ok(()) => self.result_ok(&common, started, session_id),
            Err(e) => self.result_err(&common, started, session_id, e),
        }
    }
}

/// Copies topology-model facts into the Session's activation-scoped
/// fields (§3 `zones`, `nMinInfo`, `agentGroupInfo`, `collections`,
/// `taskDetails`), done once per Activate/Update.
fn populate_session_from_index(session: &mut Session, index: &TopologyIndex, topo_file_path: &str) {
    session.topo_file_path = Some(topo_file_path.to_string());
    populate_topology_demand(session, index);
}

/// The data half of [`populate_session_from_index`], usable standalone
/// from Submit (before a topology is active) to source zone/nMin demand
/// ahead of the cross-join and nMin check (§4.8 step 1). Clears prior
/// demand first so a repeated Submit call against a different topology
/// file doesn't leave stale zones/collections behind.
fn populate_topology_demand(session: &mut Session, index: &TopologyIndex) {
    session.zones.clear();
    session.agent_group_info.clear();
    session.n_min_info.clear();
    session.collections.clear();
    session.task_details.clear();
    session.expendable_tasks.clear();

    for group in index.agent_groups() {
        let zone = group.zone.clone().unwrap_or_default();
        session.zones.entry(zone.clone()).or_default().push(ZoneGroup {
            count: 0,
            ncores: group.ncores,
            agent_group_name: group.name.clone(),
        });
        session
            .agent_group_info
            .insert(group.name.clone(), AgentGroupInfo { zone, min_agents: 0, num_slots: 0, num_cores: group.ncores });
    }

    for collection in index.collections() {
        let zone = collection.zone.clone().unwrap_or_default();
        session.n_min_info.insert(
            collection.name.clone(),
            NMinInfo { n: collection.n, n_min: collection.n_min, ncores: collection.ncores.unwrap_or(0), zone: zone.clone() },
        );
        session.collections.insert(
            collection.name.clone(),
            CollectionInfo {
                name: collection.name.clone(),
                zone,
                agent_group_name: collection.agent_group.clone().unwrap_or_default(),
                min_instances: collection.n_min,
                task_ids: collection.task_ids.clone(),
            },
        );
    }

    for task in index.tasks() {
        session.task_details.insert(
            task.id,
            TaskDetails { path: task.path.clone(), host: String::new(), agent_id: None, collection_id: task.collection_id },
        );
        if task.expendable {
            session.expendable_tasks.insert(task.id);
        }
    }
}

/// Background task started by `activate_inner`: reacts to every task-done
/// event for the session's lifetime (§4.8 "Activation"). An expendable
/// task is ignored alone; a non-expendable one takes its whole containing
/// collection down with it.
async fn run_task_done_listener(
    mut events: tokio::sync::mpsc::UnboundedReceiver<TaskDoneEvent>,
    engine: Arc<parking_lot::Mutex<TopologyEngine>>,
    index: Arc<parking_lot::Mutex<Option<TopologyIndex>>>,
    session: Arc<parking_lot::Mutex<Session>>,
    ignore_tx: Arc<parking_lot::Mutex<Option<broadcast::Sender<TaskId>>>>,
) {
    while let Some(event) = events.recv().await {
        let task_id = event.task_id;
        let targets = {
            let session = session.lock();
            if session.expendable_tasks.contains(&task_id) {
                vec![task_id]
            } else {
                let collection_id = session.task_details.get(&task_id).and_then(|d| d.collection_id);
                collection_id
                    .and_then(|id| index.lock().as_ref().and_then(|idx| idx.collection(id).map(|c| c.task_ids.clone())))
                    .unwrap_or_else(|| vec![task_id])
            }
        };
        for id in targets {
            apply_ignore(&engine, &ignore_tx, id);
        }
    }
}

/// Applies `ignore(taskID)` (§4.7), going straight through the engine when
/// it's free and otherwise broadcasting to whatever bulk operation is
/// currently holding it, so the listener never blocks on that operation's
/// lock (§4.8 "Propagate `ignore(taskID)` into any in-flight Topology
/// Engine operation").
fn apply_ignore(
    engine: &Arc<parking_lot::Mutex<TopologyEngine>>,
    ignore_tx: &Arc<parking_lot::Mutex<Option<broadcast::Sender<TaskId>>>>,
    task_id: TaskId,
) {
    if let Some(mut guard) = engine.try_lock() {
        guard.ignore(task_id);
        return;
    }
    if let Some(tx) = ignore_tx.lock().as_ref() {
        let _ = tx.send(task_id);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
