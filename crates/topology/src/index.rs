// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! `TopologyIndex`: the immutable, validated model built once per Activate
//! (§4.5 "Topology Model"). Replacement happens only on Update, via a new
//! index and an atomic swap with the Topology Engine.

use crate::model::TopoElement;
use crate::parser::ParsedTopology;
use odc_core::{CollectionId, ErrorCode, OdcError, TaskId};
use std::collections::HashMap;

/// Everything the engine needs to know about one task, resolved once at
/// activation (§4.5 "Enumerate tasks in definition order...").
#[derive(Debug, Clone)]
pub struct TaskEntry {
    pub id: TaskId,
    pub path: String,
    pub collection_id: Option<CollectionId>,
    pub expendable: bool,
}

/// Everything the engine needs to know about one collection instance.
#[derive(Debug, Clone)]
pub struct CollectionEntry {
    pub id: CollectionId,
    pub name: String,
    pub zone: Option<String>,
    pub agent_group: Option<String>,
    pub ncores: Option<u32>,
    pub n: u32,
    pub n_min: u32,
    pub task_ids: Vec<TaskId>,
}

/// Per-agent-group resource summary: the maximum `ncores` requested by any
/// containing collection (§4.5 "For each agent group, pick the maximum
/// `nCores`...").
#[derive(Debug, Clone)]
pub struct AgentGroupEntry {
    pub name: String,
    pub zone: Option<String>,
    pub ncores: u32,
}

/// Immutable, validated topology built once per Activate.
#[derive(Debug, Clone)]
pub struct TopologyIndex {
    tasks: Vec<TaskEntry>,
    tasks_by_id: HashMap<TaskId, usize>,
    collections: HashMap<String, CollectionEntry>,
    collections_by_id: HashMap<CollectionId, String>,
    agent_groups: HashMap<String, AgentGroupEntry>,
}

impl TopologyIndex {
    /// Build and validate the index from a parsed topology tree
    /// (§4.5 invariants: every non-expendable device resolves to a
    /// collection; `nMin <= n` per collection; agent-group names unique).
    pub fn build(parsed: &ParsedTopology) -> Result<Self, OdcError> {
        let mut tasks = Vec::new();
        let mut tasks_by_id = HashMap::new();
        let mut collections: HashMap<String, CollectionEntry> = HashMap::new();
        let mut collections_by_id = HashMap::new();
        let mut agent_groups: HashMap<String, AgentGroupEntry> = HashMap::new();

        let mut next_task_id = 0u64;
        let mut next_collection_id = 0u64;

        walk(
            &parsed.root,
            None,
            &mut next_task_id,
            &mut next_collection_id,
            &mut tasks,
            &mut tasks_by_id,
            &mut collections,
            &mut collections_by_id,
            &mut agent_groups,
        );

        for (name, n_min) in &parsed.nmin_vars {
            if let Some(entry) = collections.get_mut(name) {
                entry.n_min = *n_min;
            }
        }

        for entry in collections.values() {
            if entry.n_min > entry.n {
                return Err(invalid(format!(
                    "collection {:?}: nMin ({}) exceeds n ({})",
                    entry.name, entry.n_min, entry.n
                )));
            }
        }

        for task in &tasks {
            if task.collection_id.is_none() && !task.expendable {
                return Err(invalid(format!(
                    "task {:?} belongs to no collection and is not expendable",
                    task.path
                )));
            }
        }

        Ok(Self {
            tasks,
            tasks_by_id,
            collections,
            collections_by_id,
            agent_groups,
        })
    }

    pub fn tasks(&self) -> &[TaskEntry] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskEntry> {
        self.tasks_by_id.get(&id).map(|&i| &self.tasks[i])
    }

    pub fn collection_by_name(&self, name: &str) -> Option<&CollectionEntry> {
        self.collections.get(name)
    }

    pub fn collection(&self, id: CollectionId) -> Option<&CollectionEntry> {
        self.collections_by_id.get(&id).and_then(|name| self.collections.get(name))
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.collections.values()
    }

    pub fn agent_groups(&self) -> impl Iterator<Item = &AgentGroupEntry> {
        self.agent_groups.values()
    }

    /// Resolve a glob path selector (§4.7: "a path selector... resolves
    /// to a set T of task IDs").
    pub fn select(&self, pattern: &str) -> Result<Vec<TaskId>, OdcError> {
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| invalid(format!("invalid path selector {pattern:?}: {e}")))?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| matcher.matches(&t.path))
            .map(|t| t.id)
            .collect())
    }
}

#[allow(clippy::too_many_arguments)]
fn walk(
    element: &TopoElement,
    current_collection: Option<CollectionId>,
    next_task_id: &mut u64,
    next_collection_id: &mut u64,
    tasks: &mut Vec<TaskEntry>,
    tasks_by_id: &mut HashMap<TaskId, usize>,
    collections: &mut HashMap<String, CollectionEntry>,
    collections_by_id: &mut HashMap<CollectionId, String>,
    agent_groups: &mut HashMap<String, AgentGroupEntry>,
) {
    match element {
        TopoElement::Group { n, children, .. } => {
            for _ in 0..(*n).max(1) {
                for child in children {
                    walk(
                        child,
                        current_collection,
                        next_task_id,
                        next_collection_id,
                        tasks,
                        tasks_by_id,
                        collections,
                        collections_by_id,
                        agent_groups,
                    );
                }
            }
        }
        TopoElement::Collection { name, tasks: children, requirements } => {
            let id = CollectionId(*next_collection_id);
            *next_collection_id += 1;
            collections_by_id.insert(id, name.clone());

            if let Some(group_name) = &requirements.group_name {
                let ncores = requirements.ncores.unwrap_or(0);
                agent_groups
                    .entry(group_name.clone())
                    .and_modify(|g| g.ncores = g.ncores.max(ncores))
                    .or_insert_with(|| AgentGroupEntry {
                        name: group_name.clone(),
                        zone: requirements.zone.clone(),
                        ncores,
                    });
            }

            let task_count_before = tasks.len();
            for child in children {
                walk(
                    child,
                    Some(id),
                    next_task_id,
                    next_collection_id,
                    tasks,
                    tasks_by_id,
                    collections,
                    collections_by_id,
                    agent_groups,
                );
            }
            let task_ids: Vec<TaskId> = tasks[task_count_before..].iter().map(|t| t.id).collect();
            let n = task_ids.len() as u32;

            collections.insert(
                name.clone(),
                CollectionEntry {
                    id,
                    name: name.clone(),
                    zone: requirements.zone.clone(),
                    agent_group: requirements.group_name.clone(),
                    ncores: requirements.ncores,
                    n,
                    n_min: n,
                    task_ids,
                },
            );
        }
        TopoElement::Task { path, requirements } => {
            let id = TaskId(*next_task_id);
            *next_task_id += 1;
            tasks_by_id.insert(id, tasks.len());
            tasks.push(TaskEntry {
                id,
                path: path.clone(),
                collection_id: current_collection,
                expendable: requirements.expendable,
            });
        }
    }
}

fn invalid(details: String) -> OdcError {
    OdcError::new(ErrorCode::TopologyFailed, details)
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
