// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 S2 — zone fanout: a plugin emitting per-zone defaults, cross-joined
//! against a partition's declared zone demand, must emit exactly one
//! `SubmitParam` per zone with the agent/slot counts carried over
//! verbatim and the zone-level `rms` inherited.
//!
//! Exercised directly against the Submit Planner (`odc_plugin`) rather
//! than through a `PartitionOrchestrator`: `exec_submit` can now source
//! `Session::zones`/`nMinInfo` from a topology file ahead of Activate, but
//! the topology model has no per-zone agent-count field (see DESIGN.md),
//! so the `count` on every `ZoneDemand` built from a real topology is
//! always zero — exercising the cross-join with a realistic non-zero
//! count, as this scenario calls for, means driving `cross_join_zones`
//! directly with hand-built demand instead.

use odc_plugin::{cross_join_zones, parse_plugin_output, ZoneDemand};

const PLUGIN_STDOUT: &str = r#"<submit><rms>slurm</rms><zone>calib</zone></submit><submit><rms>slurm</rms><zone>online</zone></submit>"#;

#[test]
fn cross_join_emits_exactly_one_record_per_zone() {
    let base = parse_plugin_output(PLUGIN_STDOUT).expect("parse plugin stdout");
    assert_eq!(base.len(), 2);

    let zones = vec![
        ZoneDemand { zone: "calib".to_string(), count: 1, ncores: 2, agent_group_name: "calib".to_string(), min_agents: Some(0) },
        ZoneDemand { zone: "online".to_string(), count: 4, ncores: 2, agent_group_name: "online".to_string(), min_agents: Some(2) },
    ];

    let planned = cross_join_zones(&base, &zones);
    assert_eq!(planned.len(), 2);

    let calib = planned.iter().find(|p| p.zone.as_deref() == Some("calib")).expect("calib record");
    assert_eq!(calib.rms.as_deref(), Some("slurm"));
    assert_eq!(calib.agent_group.as_deref(), Some("calib"));
    assert_eq!(calib.agents, 1);
    assert_eq!(calib.slots, 2);
    assert_eq!(calib.required_slots, 0, "zero min_agents means no slot floor");

    let online = planned.iter().find(|p| p.zone.as_deref() == Some("online")).expect("online record");
    assert_eq!(online.rms.as_deref(), Some("slurm"));
    assert_eq!(online.agent_group.as_deref(), Some("online"));
    assert_eq!(online.agents, 4);
    assert_eq!(online.slots, 2);
    assert_eq!(online.required_slots, 4, "2 min_agents * 2 ncores");

    let total_agents: u32 = planned.iter().map(|p| p.agents).sum();
    assert_eq!(total_agents, 1 + 4);
}
