// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Plugin Registry: maps a plugin name to its command line, rejecting
//! duplicates and unresolvable binaries (§2 "Plugin Registry").

use crate::runner::{self, PluginOutput};
use odc_core::{ErrorCode, OdcError, PartitionId, RunNr};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed timeout for plugin execution via the registry (§4.2).
pub const PLUGIN_EXEC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct RegisteredPlugin {
    command: String,
    binary: PathBuf,
}

/// Name -> command mapping, validated at registration time.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, RegisteredPlugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preregisters the bundled "same-host" resource plugin, matching the
    /// original default `CDDSSubmit` registration, without hardcoding a
    /// path: callers supply the binary, tests a fake.
    pub fn with_default(same_host_plugin: &str) -> Result<Self, OdcError> {
        let mut registry = Self::new();
        registry.register("odc-rp-same", same_host_plugin)?;
        Ok(registry)
    }

    /// Registers `name` -> `command`. The first whitespace-separated token
    /// of `command` must resolve to an existing, non-directory file; it is
    /// canonicalized before storage. Rejects duplicate names.
    pub fn register(&mut self, name: &str, command: &str) -> Result<(), OdcError> {
        if self.plugins.contains_key(name) {
            return Err(OdcError::new(
                ErrorCode::RequestNotSupported,
                format!("plugin {name:?} is already registered"),
            ));
        }

        let binary_token = command
            .split_whitespace()
            .next()
            .ok_or_else(|| invalid_command(name, command))?;
        let binary = PathBuf::from(binary_token);
        let metadata = std::fs::metadata(&binary)
            .map_err(|e| invalid_command_with(name, command, e.to_string()))?;
        if metadata.is_dir() {
            return Err(invalid_command_with(name, command, "path is a directory".to_string()));
        }
        let canonical = std::fs::canonicalize(&binary)
            .map_err(|e| invalid_command_with(name, command, e.to_string()))?;

        self.plugins.insert(
            name.to_string(),
            RegisteredPlugin { command: command.to_string(), binary: canonical },
        );
        Ok(())
    }

    pub fn command(&self, name: &str) -> Option<&str> {
        self.plugins.get(name).map(|p| p.command.as_str())
    }

    pub fn binary_path(&self, name: &str) -> Option<&std::path::Path> {
        self.plugins.get(name).map(|p| p.binary.as_path())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Executes the registered plugin `name`, appending `--res <json> --id
    /// <partitionID>` to its stored command and deferring to the Plugin
    /// Runner with a fixed 30s timeout (§4.2).
    pub async fn exec(
        &self,
        name: &str,
        resources_json: &str,
        partition_id: &PartitionId,
        _run_nr: RunNr,
    ) -> Result<PluginOutput, OdcError> {
        let command = self.command(name).ok_or_else(|| {
            OdcError::new(ErrorCode::RequestNotSupported, format!("plugin {name:?} is not registered"))
        })?;
        let args = vec![
            "--res".to_string(),
            resources_json.to_string(),
            "--id".to_string(),
            partition_id.as_str().to_string(),
        ];
        runner::run(command, &args, &HashMap::new(), PLUGIN_EXEC_TIMEOUT).await
    }
}

fn invalid_command(name: &str, command: &str) -> OdcError {
    OdcError::new(
        ErrorCode::RequestNotSupported,
        format!("plugin {name:?}: empty command {command:?}"),
    )
}

fn invalid_command_with(name: &str, command: &str, reason: String) -> OdcError {
    OdcError::new(
        ErrorCode::RequestNotSupported,
        format!("plugin {name:?}: command {command:?} is invalid: {reason}"),
    )
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
