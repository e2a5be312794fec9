// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Resolved daemon configuration: paths and CLI flags, falling back to
//! `$ODC_STATE_DIR`/`$XDG_STATE_HOME`/`$HOME`-relative defaults (§6
//! "Environment").

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::env;
use crate::orchestrator::DEFAULT_AGENT_WAIT_TIMEOUT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve a state directory: set --socket/--restore-dir/--history-dir explicitly, $ODC_STATE_DIR, $XDG_STATE_HOME, or $HOME")]
    NoStateDir,
}

/// Command-line flags for `odcd`.
#[derive(Debug, Parser)]
#[command(name = "odcd", about = "ODC control-plane daemon")]
pub struct Cli {
    /// Unix socket to listen on. Default: `<state dir>/odc.sock`.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Directory holding `odc_<id>.json` restore files.
    #[arg(long)]
    pub restore_dir: Option<PathBuf>,

    /// Directory holding `odc_history.log`.
    #[arg(long)]
    pub history_dir: Option<PathBuf>,

    /// Restore-file id to read at startup and rewrite on every mutation.
    /// If unset, no restore/persist happens.
    #[arg(long)]
    pub restore_id: Option<String>,

    /// Register a resource plugin: `name=command line`. May repeat.
    #[arg(long = "plugin", value_parser = parse_plugin_spec)]
    pub plugins: Vec<(String, String)>,
}

fn parse_plugin_spec(s: &str) -> Result<(String, String), String> {
    let (name, command) = s.split_once('=').ok_or_else(|| format!("expected NAME=COMMAND, got {s:?}"))?;
    if name.is_empty() || command.is_empty() {
        return Err(format!("expected NAME=COMMAND, got {s:?}"));
    }
    Ok((name.to_string(), command.to_string()))
}

/// Resolved paths and tunables the daemon runs with.
#[derive(Debug, Clone)]
pub struct Config {
    pub socket_path: PathBuf,
    pub restore_dir: PathBuf,
    pub history_dir: PathBuf,
    pub restore_id: Option<String>,
    pub agent_wait_timeout: Duration,
    pub plugins: Vec<(String, String)>,
}

impl Config {
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        let state_dir = || env::state_dir().ok_or(ConfigError::NoStateDir);

        let socket_path = match cli.socket {
            Some(path) => path,
            None => state_dir()?.join("odc.sock"),
        };
        let restore_dir = match cli.restore_dir {
            Some(path) => path,
            None => state_dir()?.join("restore"),
        };
        let history_dir = match cli.history_dir {
            Some(path) => path,
            None => state_dir()?.join("history"),
        };
        let agent_wait_timeout =
            env::agent_wait_timeout_ms().map(Duration::from_millis).unwrap_or(DEFAULT_AGENT_WAIT_TIMEOUT);

        Ok(Self {
            socket_path,
            restore_dir,
            history_dir,
            restore_id: cli.restore_id,
            agent_wait_timeout,
            plugins: cli.plugins,
        })
    }
}
