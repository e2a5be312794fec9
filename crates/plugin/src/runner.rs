// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Plugin Runner: executes an external resource-plugin binary with a hard
//! wall-clock timeout (§2 "Plugin Runner").

use odc_core::{ErrorCode, OdcError};
use std::collections::HashMap;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured output of a completed plugin invocation.
#[derive(Debug, Clone)]
pub struct PluginOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runs `command` (the full plugin command line, as registered in the
/// Plugin Registry) through a shell, passing `args` and `env` overlay, and
/// enforces `timeout`. The child is killed if the timeout elapses.
pub async fn run(
    command: &str,
    args: &[String],
    env: &HashMap<String, String>,
    timeout: Duration,
) -> Result<PluginOutput, OdcError> {
    let mut shell_cmd = command.to_string();
    for arg in args {
        shell_cmd.push(' ');
        shell_cmd.push_str(&shell_escape(arg));
    }

    debug!(command = %shell_cmd, timeout_secs = timeout.as_secs(), "spawning resource plugin");

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&shell_cmd).kill_on_drop(true);
    for (k, v) in env {
        cmd.env(k, v);
    }

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let exit_code = output.status.code();

            if !output.status.success() {
                warn!(exit_code = ?exit_code, stderr = %stderr, "resource plugin exited non-zero");
                return Err(OdcError::new(
                    ErrorCode::ResourcePluginFailed,
                    format!("plugin {shell_cmd:?} exited with {exit_code:?}: {stderr}"),
                ));
            }

            Ok(PluginOutput { stdout, stderr, exit_code })
        }
        Ok(Err(io_err)) => Err(OdcError::new(
            ErrorCode::ResourcePluginFailed,
            format!("plugin {shell_cmd:?} failed to run: {io_err}"),
        )),
        Err(_elapsed) => Err(OdcError::new(
            ErrorCode::ResourcePluginFailed,
            format!("plugin {shell_cmd:?} timed out after {}s", timeout.as_secs()),
        )),
    }
}

fn shell_escape(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
