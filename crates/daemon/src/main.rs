// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! `odcd` — the ODC control-plane daemon.
//!
//! Architecture:
//! - Listener task: accepts Unix-socket connections, one task per connection.
//! - Controller: owns the partition table and routes every request to the
//!   right Partition Orchestrator, creating one lazily on Initialize/Run.
//!
//! No production Agent Fabric / Device Channel backend ships in this repo
//! (§1 "does not pick physical hosts"); `odcd` runs the fake in-process
//! adapters as the pluggable stand-in a real deployment swaps out.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use odc_adapters::{FakeAgentFabric, FakeDeviceChannel};
use odc_daemon::config::{Cli, Config};
use odc_daemon::{Controller, ControllerConfig};
use odc_plugin::PluginRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match Config::load(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    setup_logging();

    let mut plugins = PluginRegistry::new();
    for (name, command) in &config.plugins {
        if let Err(e) = plugins.register(name, command) {
            error!(plugin = name.as_str(), error = %e, "failed to register plugin, skipping");
        }
    }

    let controller_config = ControllerConfig {
        history_dir: config.history_dir.clone(),
        restore_dir: config.restore_dir.clone(),
        restore_id: config.restore_id.clone(),
        agent_wait_timeout: config.agent_wait_timeout,
    };

    let controller = Arc::new(Controller::<FakeAgentFabric, FakeDeviceChannel>::new(
        controller_config,
        Arc::new(plugins),
        FakeAgentFabric::new,
        FakeDeviceChannel::new,
    ));
    controller.restore().await;

    let shutdown = Arc::new(Notify::new());
    let listener_task = tokio::spawn(odc_daemon::listener::run(config.socket_path.clone(), controller, Arc::clone(&shutdown)));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %config.socket_path.display(), "odcd ready");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    shutdown.notify_one();
    let _ = listener_task.await;

    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
