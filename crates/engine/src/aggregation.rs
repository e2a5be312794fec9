// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Aggregation over a path selector: resolve a glob-style path to its task
//! IDs, then roll up their device states into one [`AggregatedState`]
//! (§4.8, invariants 3-5).

use crate::engine::DeviceTable;
use odc_core::{AggregatedState, OdcError, TaskId};
use odc_topology::TopologyIndex;
use std::collections::HashSet;

/// Resolves `pattern` against `index` and aggregates the resulting tasks'
/// states from `table`, excluding any task ID present in `ignored`.
pub fn aggregate_state_for_path(
    index: &TopologyIndex,
    table: &DeviceTable,
    pattern: &str,
    ignored: &HashSet<TaskId>,
) -> Result<AggregatedState, OdcError> {
    let task_ids = index.select(pattern)?;
    let statuses: Vec<_> = task_ids.iter().filter_map(|id| table.get(*id).cloned()).collect();
    Ok(odc_core::device::aggregate(&statuses, ignored))
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod tests;
