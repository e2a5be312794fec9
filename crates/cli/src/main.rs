// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! `odc` — thin CLI client for `odcd`, one subcommand per Request API
//! method (§6 "Request API").

mod client;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use client::DaemonClient;
use odc_core::{CommonParams, PartitionId, RunNr};
use odc_daemon::Request;

#[derive(Parser)]
#[command(name = "odc", version, about = "ODC control-plane client")]
struct Cli {
    /// Path to the odcd control socket. Default: `$ODC_STATE_DIR/odc.sock`
    /// (falling back to `$XDG_STATE_HOME`/`$HOME` the same way odcd does).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 5)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

/// Arguments shared by every per-partition request (§3 `CommonParams`).
#[derive(Args)]
struct PartitionArgs {
    /// Partition id.
    #[arg(long)]
    partition: String,

    /// Run number, for distinguishing repeated runs of the same partition.
    #[arg(long, default_value_t = 0)]
    run_nr: u64,
}

impl PartitionArgs {
    fn common(&self, timeout: Duration) -> CommonParams {
        CommonParams::new(PartitionId::from(self.partition.clone()), RunNr(self.run_nr), Some(timeout))
    }
}

/// Arguments shared by every bulk topology-path operation (§4.6 selector syntax).
#[derive(Args)]
struct PathArgs {
    #[command(flatten)]
    partition: PartitionArgs,

    /// Topology path selector, e.g. `*` or `readout/builder`.
    #[arg(long, default_value = "*")]
    path: String,

    /// Return per-device detail instead of just the aggregate.
    #[arg(long)]
    detailed: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Health check.
    Ping,

    /// Create or adopt an agent-fabric session for a partition.
    Initialize {
        #[command(flatten)]
        partition: PartitionArgs,
        /// Adopt this existing agent-fabric session instead of creating one.
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Submit agents via a resource plugin.
    Submit {
        #[command(flatten)]
        partition: PartitionArgs,
        #[arg(long)]
        plugin_name: String,
        #[arg(long)]
        resources_json: String,
        /// Source zone/nMin demand from this topology ahead of Activate.
        #[arg(long)]
        topo_file: Option<String>,
    },

    /// Activate a topology on the submitted agents.
    Activate {
        #[command(flatten)]
        partition: PartitionArgs,
        #[arg(long)]
        topo_file: Option<String>,
    },

    /// Fused Initialize + Submit + Activate.
    Run {
        #[command(flatten)]
        partition: PartitionArgs,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        plugin_name: String,
        #[arg(long)]
        resources_json: String,
        #[arg(long)]
        topo_file: Option<String>,
    },

    /// Re-activate with a new topology on an already-active session.
    Update {
        #[command(flatten)]
        partition: PartitionArgs,
        #[arg(long)]
        topo_file: Option<String>,
    },

    /// Drive the selected devices through Configure (Init -> Ready).
    Configure(PathArgs),
    /// Drive the selected devices through Run (Ready -> Running).
    Start(PathArgs),
    /// Drive the selected devices through Stop (Running -> Ready).
    Stop(PathArgs),
    /// Drive the selected devices through Reset (-> Ready).
    Reset(PathArgs),
    /// Drive the selected devices through End (-> Idle).
    Terminate(PathArgs),
    /// Read the aggregated (and optionally per-device) state, no transition.
    GetState(PathArgs),

    /// Set custom properties on the selected devices.
    SetProperties {
        #[command(flatten)]
        partition: PartitionArgs,
        #[arg(long, default_value = "*")]
        path: String,
        /// `KEY=VALUE`, may repeat.
        #[arg(long = "prop", value_parser = parse_prop)]
        props: Vec<(String, String)>,
    },

    /// Tear down a partition's agent-fabric session.
    Shutdown {
        #[command(flatten)]
        partition: PartitionArgs,
    },

    /// List every partition the daemon currently knows about.
    Status {
        #[arg(long)]
        running_only: bool,
    },
}

fn parse_prop(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

fn socket_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.socket {
        return Ok(path.clone());
    }
    odc_daemon::env::state_dir().map(|dir| dir.join("odc.sock")).context(
        "could not resolve a state directory; pass --socket explicitly or set $ODC_STATE_DIR/$HOME",
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket = socket_path(&cli)?;
    let timeout = Duration::from_secs(cli.timeout_secs);
    let client = DaemonClient::connect(socket).context("connecting to odcd")?.with_timeout(timeout);

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("pong");
        }

        Command::Initialize { partition, session_id } => {
            let result = client.request(Request::Initialize { common: partition.common(timeout), session_id }).await?;
            print_result(&result)?;
        }

        Command::Submit { partition, plugin_name, resources_json, topo_file } => {
            let result = client
                .request(Request::Submit { common: partition.common(timeout), plugin_name, resources_json, topo_file })
                .await?;
            print_result(&result)?;
        }

        Command::Activate { partition, topo_file } => {
            let result = client.request(Request::Activate { common: partition.common(timeout), topo_file }).await?;
            print_result(&result)?;
        }

        Command::Run { partition, session_id, plugin_name, resources_json, topo_file } => {
            let result = client
                .request(Request::Run {
                    common: partition.common(timeout),
                    session_id,
                    plugin_name,
                    resources_json,
                    topo_file,
                })
                .await?;
            print_result(&result)?;
        }

        Command::Update { partition, topo_file } => {
            let result = client.request(Request::Update { common: partition.common(timeout), topo_file }).await?;
            print_result(&result)?;
        }

        Command::Configure(args) => {
            let result = client
                .request(Request::Configure { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::Start(args) => {
            let result = client
                .request(Request::Start { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::Stop(args) => {
            let result = client
                .request(Request::Stop { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::Reset(args) => {
            let result = client
                .request(Request::Reset { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::Terminate(args) => {
            let result = client
                .request(Request::Terminate { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::GetState(args) => {
            let result = client
                .request(Request::GetState { common: args.partition.common(timeout), path: args.path, detailed: args.detailed })
                .await?;
            print_result(&result)?;
        }

        Command::SetProperties { partition, path, props } => {
            let result = client.request(Request::SetProperties { common: partition.common(timeout), path, props }).await?;
            print_result(&result)?;
        }

        Command::Shutdown { partition } => {
            let result = client.request(Request::Shutdown { common: partition.common(timeout) }).await?;
            print_result(&result)?;
        }

        Command::Status { running_only } => {
            let result = client.status(running_only).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn print_result(result: &odc_core::RequestResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    if result.status_code != odc_core::StatusCode::Ok {
        std::process::exit(1);
    }
    Ok(())
}
