// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! IPC protocol between `odc` (CLI) and `odcd` (daemon).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload, see
//! [`crate::protocol_wire`].

use odc_core::{CommonParams, RequestResult, StatusRequestResult};
use serde::{Deserialize, Serialize};

/// Request from CLI to daemon (§6 "Request API").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,

    Initialize {
        common: CommonParams,
        /// Adopt an existing agent-fabric session instead of creating one.
        session_id: Option<String>,
    },

    Submit {
        common: CommonParams,
        plugin_name: String,
        resources_json: String,
        /// Lets zone/nMin demand be sourced ahead of Activate (§4.8 step 1).
        topo_file: Option<String>,
    },

    Activate {
        common: CommonParams,
        topo_file: Option<String>,
    },

    /// Fused Initialize + Submit + Activate.
    Run {
        common: CommonParams,
        session_id: Option<String>,
        plugin_name: String,
        resources_json: String,
        topo_file: Option<String>,
    },

    Update {
        common: CommonParams,
        topo_file: Option<String>,
    },

    Configure {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    Start {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    Stop {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    Reset {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    Terminate {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    GetState {
        common: CommonParams,
        path: String,
        detailed: bool,
    },

    SetProperties {
        common: CommonParams,
        path: String,
        props: Vec<(String, String)>,
    },

    Shutdown {
        common: CommonParams,
    },

    Status {
        running_only: bool,
    },
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,

    /// Result of any per-partition request (§6: every reply carries
    /// `statusCode`, `msg`, `executionTimeMs`, `error?`, ids, aggregated state).
    Result(Box<RequestResult>),

    /// Result of `Status`.
    StatusResult(Box<StatusRequestResult>),
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
