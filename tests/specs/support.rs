// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Shared scaffolding for the scenario tests: a plugin registry backed by
//! `/bin/echo`, a topology-file writer, and the same poll-and-acknowledge
//! device-channel driver the daemon crate's own orchestrator tests use,
//! since the fake Device Channel only changes a device's recorded state
//! when explicitly told to.

use odc_adapters::{DeviceChannelCall, FakeAgentFabric, FakeDeviceChannel};
use odc_core::DeviceState;
use odc_daemon::{Controller, ControllerConfig};
use odc_plugin::PluginRegistry;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Registers a plugin named `name` whose stdout is the literal `output`,
/// by shelling out to `/bin/echo`.
pub fn registry_with_plugin(name: &str, output: &str) -> Arc<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    registry.register(name, &format!("/bin/echo {}", shell_quote(output))).expect("register plugin");
    Arc::new(registry)
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

pub fn write_topology(dir: &tempfile::TempDir, name: &str, xml: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, xml).expect("write topology file");
    path.to_str().expect("utf8 path").to_string()
}

/// Mirrors every `ChangeState` call the fake device channel records back
/// as a matching state notification, as if every device instantly
/// complied. Spawned alongside a bulk operation so the operation's
/// progress-wait phase has something to observe.
pub fn auto_confirm_all(channel: FakeDeviceChannel) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen = 0usize;
        loop {
            let calls = channel.calls();
            for call in calls.iter().skip(seen) {
                if let DeviceChannelCall::ChangeState { task_id, transition } = call {
                    channel.notify(*task_id, DeviceState::Idle, transition.target_state());
                }
            }
            seen = calls.len();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
}

/// Captures every `FakeDeviceChannel` a `Controller` lazily creates, in
/// creation order, so a test driving several partitions can still reach
/// each partition's channel to drive its device notifications — the
/// `Controller` itself exposes no such accessor, by design (§4.9).
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<Mutex<Vec<FakeDeviceChannel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> impl Fn() -> FakeDeviceChannel + Send + Sync + 'static {
        let channels = self.channels.clone();
        move || {
            let channel = FakeDeviceChannel::new();
            channels.lock().push(channel.clone());
            channel
        }
    }

    /// The `n`th channel created, in creation order. Callers establish the
    /// order by initializing partitions one at a time before running
    /// anything concurrently.
    pub fn nth(&self, n: usize) -> FakeDeviceChannel {
        self.channels.lock()[n].clone()
    }
}

pub fn controller_with_channels(
    dir: &tempfile::TempDir,
    plugins: Arc<PluginRegistry>,
    restore_id: Option<&str>,
    channels: &ChannelRegistry,
) -> Controller<FakeAgentFabric, FakeDeviceChannel> {
    let config = ControllerConfig {
        history_dir: dir.path().join("history"),
        restore_dir: dir.path().join("restore"),
        restore_id: restore_id.map(str::to_string),
        agent_wait_timeout: Duration::from_millis(200),
    };
    Controller::new(config, plugins, FakeAgentFabric::new, channels.factory())
}

pub fn controller(
    dir: &tempfile::TempDir,
    plugins: Arc<PluginRegistry>,
    restore_id: Option<&str>,
) -> Controller<FakeAgentFabric, FakeDeviceChannel> {
    controller_with_channels(dir, plugins, restore_id, &ChannelRegistry::new())
}
