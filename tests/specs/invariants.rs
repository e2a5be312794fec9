// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! §8 property-based invariants. Invariants 1-3 (single outstanding
//! operation per partition, device state tracks the most recent
//! notification, bulk-operation outcome consistency) are covered by the
//! scenario tests (S1-S5), which exercise them end to end through real
//! call sequences; the four checked here are naturally expressed as pure
//! properties over small, cheaply-generated inputs.

use odc_core::device::aggregate;
use odc_core::{AggregatedState, DeviceState, DeviceStatus, Session, TaskId};
use odc_daemon::persistence::{self, RestoreData, RestorePartition};
use proptest::prelude::*;
use std::collections::HashSet;

fn device_state_strategy() -> impl Strategy<Value = DeviceState> {
    prop_oneof![
        Just(DeviceState::Idle),
        Just(DeviceState::InitializingDevice),
        Just(DeviceState::Initialized),
        Just(DeviceState::Bound),
        Just(DeviceState::DeviceReady),
        Just(DeviceState::Ready),
        Just(DeviceState::Running),
        Just(DeviceState::Error),
        Just(DeviceState::Exiting),
    ]
}

fn devices_strategy(max_len: usize) -> impl Strategy<Value = Vec<DeviceStatus>> {
    prop::collection::vec((device_state_strategy(), any::<bool>()), 0..=max_len).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (state, ignored))| {
                let mut status = DeviceStatus::new(TaskId(i as u64), None, false);
                status.state = state;
                status.ignored = ignored;
                status
            })
            .collect()
    })
}

proptest! {
    /// Invariant 5: the aggregated state is a pure function of the device
    /// set and is `Mixed` iff the non-ignored states have cardinality > 1,
    /// `Undefined` iff that set is empty.
    #[test]
    fn aggregate_is_pure_and_matches_its_definition(devices in devices_strategy(8)) {
        let empty = HashSet::new();
        let first = aggregate(&devices, &empty);
        let second = aggregate(&devices, &empty);
        prop_assert_eq!(first, second, "aggregate must be a pure function of its inputs");

        let distinct_states: HashSet<DeviceState> =
            devices.iter().filter(|d| !d.ignored).map(|d| d.state).collect();

        match distinct_states.len() {
            0 => prop_assert_eq!(first, AggregatedState::Undefined),
            1 => prop_assert_eq!(first, AggregatedState::State(*distinct_states.iter().next().unwrap())),
            _ => prop_assert_eq!(first, AggregatedState::Mixed),
        }
    }

    /// An externally-supplied `ignored` set behaves exactly like setting
    /// `DeviceStatus.ignored` on the same tasks (the two exclusion
    /// mechanisms are equivalent, per-call vs. persisted).
    #[test]
    fn external_ignored_set_matches_persisted_ignored_flag(devices in devices_strategy(6)) {
        let externally_ignored: HashSet<TaskId> = devices.iter().map(|d| d.task_id).collect();
        let via_param = aggregate(&devices, &externally_ignored);

        let mut flagged = devices.clone();
        for d in &mut flagged {
            d.ignored = true;
        }
        let via_flag = aggregate(&flagged, &HashSet::new());

        prop_assert_eq!(via_param, via_flag);
    }

    /// Invariant 7: `parse_time_string` totality over the accepted forms.
    #[test]
    fn bare_and_suffixed_seconds_round_trip(n in 0u64..1_000_000) {
        let bare = odc_core::parse_time_string(&n.to_string(), None).unwrap();
        prop_assert_eq!(bare.as_secs(), n);

        let suffixed = odc_core::parse_time_string(&format!("{n}s"), None).unwrap();
        prop_assert_eq!(suffixed.as_secs(), n);
    }

    /// Invariant 7: a percentage string is always `base * pct / 100`, for
    /// any non-negative percentage and any nonzero base.
    #[test]
    fn percentage_scales_the_base(pct in 0u32..500, base_secs in 1u64..100_000) {
        let base = std::time::Duration::from_secs(base_secs);
        let got = odc_core::parse_time_string(&format!("{pct}%"), Some(base)).unwrap();
        let want = (base_secs as f64) * (pct as f64 / 100.0);
        prop_assert!((got.as_secs_f64() - want).abs() < 1.0);
    }

    /// Invariant 7: a negative number, trailing garbage, or a percentage
    /// with no base is always rejected, never silently coerced.
    #[test]
    fn malformed_time_strings_are_always_rejected(n in 1u64..1_000_000, garbage in "[a-zA-Z]{1,6}") {
        prop_assert!(odc_core::parse_time_string(&format!("-{n}"), None).is_err());
        prop_assert!(odc_core::parse_time_string(&format!("{n}{garbage}"), None).is_err());
        prop_assert!(odc_core::parse_time_string(&format!("{n}%"), None).is_err());
    }

    /// Invariant 6: the restore file round-trips any `(partition, session)`
    /// pair list through a write/read cycle unchanged.
    #[test]
    fn restore_file_round_trips(
        pairs in prop::collection::vec(("[a-z0-9]{1,8}", "[a-z0-9]{1,12}"), 0..6)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let sessions: Vec<RestorePartition> = pairs
            .into_iter()
            .map(|(partition, session)| RestorePartition { partition, session })
            .collect();
        let data = RestoreData { sessions: sessions.clone() };

        persistence::write_restore(dir.path(), "r1", &data);
        let read_back = persistence::read_restore(dir.path(), "r1");

        prop_assert_eq!(read_back.sessions, sessions);
    }
}

#[test]
fn exact_accept_reject_examples_from_the_grammar() {
    assert_eq!(odc_core::parse_time_string("10s", None).unwrap().as_secs(), 10);
    assert_eq!(odc_core::parse_time_string("50%", Some(std::time::Duration::from_secs(60))).unwrap().as_secs(), 30);
    assert_eq!(odc_core::parse_time_string("100%", Some(std::time::Duration::from_secs(60))).unwrap().as_secs(), 60);
    assert_eq!(odc_core::parse_time_string("3600", None).unwrap().as_secs(), 3600);

    assert!(odc_core::parse_time_string("", None).is_err());
    assert!(odc_core::parse_time_string("abc", None).is_err());
    assert!(odc_core::parse_time_string("-10s", None).is_err());
    assert!(odc_core::parse_time_string("10x", None).is_err());
    assert!(odc_core::parse_time_string("%50", None).is_err());
    assert!(odc_core::parse_time_string("25%", Some(std::time::Duration::ZERO)).is_err());
}

/// Invariant 4: Update replaces the activation atomically but keeps
/// partition/session identity and `lastRunNr` intact.
#[test]
fn clear_activation_keeps_identity_and_drops_only_activation_state() {
    let mut session = Session::new("p1");
    session.session_id = "sidA".to_string();
    session.last_run_nr = odc_core::RunNr(7);
    session.topo_file_path = Some("/tmp/topo.xml".to_string());
    session.total_slots = 12;
    session.task_details.insert(
        TaskId(0),
        odc_core::TaskDetails { path: "readout/0".to_string(), host: "h0".to_string(), agent_id: None, collection_id: None },
    );
    session.devices.insert(TaskId(0), DeviceStatus::new(TaskId(0), None, false));

    session.clear_activation();

    assert_eq!(session.partition_id.as_str(), "p1");
    assert_eq!(session.session_id, "sidA");
    assert_eq!(session.last_run_nr, odc_core::RunNr(7));
    assert!(session.topo_file_path.is_none());
    assert_eq!(session.total_slots, 0);
    assert!(session.task_details.is_empty());
    assert!(session.devices.is_empty());
}
