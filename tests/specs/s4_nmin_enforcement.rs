// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S4 — nMin enforcement: a collection declares `n=4 nMin=2`, only one
//! agent ever becomes active, and Submit must fail with a timeout rather
//! than silently accepting the shortfall, leaving the session retryable.
//!
//! `exec_submit` now accepts an optional topology file so nMin demand can
//! be sourced ahead of Activate in production. This test still seeds
//! `n_min_info` directly via `PartitionOrchestrator::from_session` instead
//! of driving it through a real topology file, since a topology with any
//! agent group also populates `Session::zones`, which forces
//! `submit_with_recovery`'s zone cross-join — and nothing in the topology
//! model carries a per-zone agent count yet (see DESIGN.md), so the
//! cross-joined `required` count would come out zero regardless of the
//! plugin's own output. Seeding `n_min_info` alone sidesteps that gap and
//! isolates the nMin check this scenario is actually about.

use super::support::registry_with_plugin;
use odc_adapters::FakeAgentFabric;
use odc_adapters::FakeDeviceChannel;
use odc_core::{AgentId, CommonParams, NMinInfo, RunNr, Session};
use odc_daemon::{Phase, PartitionOrchestrator};
use std::time::Duration;

fn common() -> CommonParams {
    CommonParams::new("p1", RunNr(1), None)
}

#[tokio::test]
async fn submit_times_out_on_nmin_shortfall_and_stays_retryable() {
    let plugins = registry_with_plugin("noop", "<config><rms>localhost</rms><agents>4</agents><slots>1</slots></config>");
    let fabric = FakeAgentFabric::new();
    let channel = FakeDeviceChannel::new();

    let mut session = Session::new("p1");
    session.session_id = "fake-session-1".to_string();
    session.n_min_info.insert(
        "processors".to_string(),
        NMinInfo { n: 4, n_min: 2, ncores: 1, zone: "".to_string() },
    );

    let orchestrator = PartitionOrchestrator::from_session(session, fabric.clone(), channel, plugins)
        .with_agent_wait_timeout(Duration::from_millis(40));
    assert_eq!(orchestrator.phase(), Some(Phase::Initialized));

    // Only one agent (one slot) ever becomes active against a required 4.
    fabric.set_active_slots(1);
    fabric.seed_agent_info(
        "fake-session-1",
        vec![odc_adapters::AgentInfo {
            agent_id: AgentId(1),
            slots: 1,
            host: "host-0".to_string(),
            group: "processors".to_string(),
            zone: "".to_string(),
        }],
    );

    let submit = orchestrator.exec_submit(common(), "noop", "{}", None).await;
    assert_eq!(submit.status_code, odc_core::StatusCode::Error, "submit should report a shortfall: {submit:?}");
    assert_eq!(submit.error.as_ref().map(|e| e.code), Some(odc_core::ErrorCode::RequestTimeout));

    // The session still lands in `Submitted` on a shortfall, ready for a
    // retry without re-running Initialize.
    assert_eq!(orchestrator.phase(), Some(Phase::Submitted));

    // A retry where enough agents show up this time succeeds.
    fabric.set_active_slots(4);
    let retry = orchestrator.exec_submit(common(), "noop", "{}", None).await;
    assert_eq!(retry.status_code, odc_core::StatusCode::Ok, "retry should succeed: {retry:?}");
    assert_eq!(orchestrator.phase(), Some(Phase::Submitted));
}
