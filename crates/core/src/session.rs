// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Session: the per-partition state object living from Initialize to
//! Shutdown (§3 "Session").

use crate::device::DeviceStatus;
use crate::id::{AgentId, CollectionId, PartitionId, RunNr, TaskId};
use std::collections::{HashMap, HashSet};

/// One group of agents requested within a zone: `count` agents, each with
/// `ncores` cores, sourced from `agent_group_name` (§3 `zones`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ZoneGroup {
    pub count: u32,
    pub ncores: u32,
    pub agent_group_name: String,
}

/// Minimum acceptable instance count for a collection template (§3
/// `nMinInfo`), keyed by collection name in the owning `Session`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NMinInfo {
    pub n: u32,
    pub n_min: u32,
    pub ncores: u32,
    pub zone: String,
}

/// Resource accounting for one named agent group (§3 `agentGroupInfo`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AgentGroupInfo {
    pub zone: String,
    pub min_agents: u32,
    pub num_slots: u32,
    pub num_cores: u32,
}

/// Per-collection requirements, indexed by collection name (§3
/// `collections`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub zone: String,
    pub agent_group_name: String,
    pub min_instances: u32,
    pub task_ids: Vec<TaskId>,
}

/// Lookup info for a single task, resolved at activation (§3
/// `taskDetails`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaskDetails {
    pub path: String,
    pub host: String,
    pub agent_id: Option<AgentId>,
    pub collection_id: Option<CollectionId>,
}

/// Lookup info for a single collection instance, resolved at activation
/// (§3 `collectionDetails`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CollectionDetails {
    pub path: String,
    pub host: String,
    pub agent_id: Option<AgentId>,
}

/// A task outside any collection (§3 `standaloneTasks`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaskInfo {
    pub task_id: TaskId,
    pub path: String,
}

/// The per-partition state object: created by Initialize, destroyed by
/// Shutdown (invariant 1: at most one Session per `partitionID`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub partition_id: PartitionId,
    /// Agent-fabric session handle. Never changes for the life of the
    /// Session (invariant 3); re-adopted verbatim on restore.
    pub session_id: String,
    pub last_run_nr: RunNr,

    pub topo_file_path: Option<String>,

    pub zones: HashMap<String, Vec<ZoneGroup>>,
    pub n_min_info: HashMap<String, NMinInfo>,
    pub agent_group_info: HashMap<String, AgentGroupInfo>,
    pub expendable_tasks: HashSet<TaskId>,
    pub collections: HashMap<String, CollectionInfo>,
    pub standalone_tasks: Vec<TaskInfo>,

    pub agent_slots: HashMap<AgentId, u32>,
    pub total_slots: u32,

    pub task_details: HashMap<TaskId, TaskDetails>,
    pub collection_details: HashMap<CollectionId, CollectionDetails>,

    /// Subscription handle to the agent-fabric task-done stream.
    pub dds_on_task_done_sub: Option<String>,
    /// Set once `Run`/`Submit` has been attempted at least once, gating
    /// restartability rules (§4 "Restartability").
    pub run_attempted: bool,

    /// Live per-device state table, keyed by task ID. Guarded in the
    /// daemon by the Topology Engine's internal mutex (§3 note on
    /// concurrent access), not by the per-partition orchestration mutex.
    pub devices: HashMap<TaskId, DeviceStatus>,
}

impl Session {
    pub fn new(partition_id: impl Into<PartitionId>) -> Self {
        Self {
            partition_id: partition_id.into(),
            session_id: String::new(),
            last_run_nr: RunNr::default(),
            topo_file_path: None,
            zones: HashMap::new(),
            n_min_info: HashMap::new(),
            agent_group_info: HashMap::new(),
            expendable_tasks: HashSet::new(),
            collections: HashMap::new(),
            standalone_tasks: Vec::new(),
            agent_slots: HashMap::new(),
            total_slots: 0,
            task_details: HashMap::new(),
            collection_details: HashMap::new(),
            dds_on_task_done_sub: None,
            run_attempted: false,
            devices: HashMap::new(),
        }
    }

    /// Reset everything an Update/Activate replaces, keeping identity
    /// (`partitionID`, `sessionID`) and `lastRunNr` intact (invariant 4:
    /// Update replaces the activation atomically).
    pub fn clear_activation(&mut self) {
        self.topo_file_path = None;
        self.zones.clear();
        self.n_min_info.clear();
        self.agent_group_info.clear();
        self.expendable_tasks.clear();
        self.collections.clear();
        self.standalone_tasks.clear();
        self.agent_slots.clear();
        self.total_slots = 0;
        self.task_details.clear();
        self.collection_details.clear();
        self.devices.clear();
    }

    pub fn task_details(&self, task_id: TaskId) -> Option<&TaskDetails> {
        self.task_details.get(&task_id)
    }

    pub fn collection_details(&self, collection_id: CollectionId) -> Option<&CollectionDetails> {
        self.collection_details.get(&collection_id)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
