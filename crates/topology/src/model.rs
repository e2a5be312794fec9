// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! In-memory topology tree (§4.5 "Topology Model").
//!
//! Polymorphic topology elements are represented as a single tagged enum
//! with a uniform visitor rather than an inheritance hierarchy — groups,
//! collections and tasks all nest the same way, so one recursive `visit`
//! walks the whole tree.

use serde::{Deserialize, Serialize};

/// Per-element requirements carried down from the topology description
/// (§6 "Topology-description format").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    pub max_instances_per_host: Option<u32>,
    pub wn_name: Option<String>,
    pub group_name: Option<String>,
    pub zone: Option<String>,
    pub ncores: Option<u32>,
    pub expendable: bool,
}

/// One node of the topology tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TopoElement {
    /// `CTopoGroup`: repeats its children `n` times.
    Group {
        name: String,
        n: u32,
        children: Vec<TopoElement>,
    },
    /// `CTopoCollection`: a named bundle of tasks, with its own nMin.
    Collection {
        name: String,
        tasks: Vec<TopoElement>,
        requirements: Requirements,
    },
    /// `CTopoTask`: a leaf device.
    Task {
        path: String,
        requirements: Requirements,
    },
}

impl TopoElement {
    /// Visit every node in the tree, parent before children, in
    /// definition order.
    pub fn visit(&self, f: &mut impl FnMut(&TopoElement)) {
        f(self);
        match self {
            TopoElement::Group { children, .. } => {
                for child in children {
                    child.visit(f);
                }
            }
            TopoElement::Collection { tasks, .. } => {
                for task in tasks {
                    task.visit(f);
                }
            }
            TopoElement::Task { .. } => {}
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TopoElement::Group { name, .. } => name,
            TopoElement::Collection { name, .. } => name,
            TopoElement::Task { path, .. } => path,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
