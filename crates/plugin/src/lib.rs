// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! odc-plugin: resource-allocator plugin execution, registry, and the
//! submit planner that bridges plugin output to agent-fabric requests.

pub mod registry;
pub mod runner;
pub mod submit_planner;

pub use registry::{PluginRegistry, PLUGIN_EXEC_TIMEOUT};
pub use runner::PluginOutput;
pub use submit_planner::{cross_join_zones, parse_plugin_output, SubmitParam, ZoneDemand};
