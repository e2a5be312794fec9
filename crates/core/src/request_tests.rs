// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;
use crate::error::ErrorCode;

#[test]
fn success_result_has_no_error_and_ok_status() {
    let r = RequestResult::success(
        PartitionId::from("p1"),
        RunNr::default(),
        "sess-1",
        Duration::from_millis(5),
        AggregatedState::State(crate::device::DeviceState::Running),
    );
    assert_eq!(r.status_code, StatusCode::Ok);
    assert!(r.error.is_none());
    assert_eq!(r.session_id, "sess-1");
}

#[test]
fn failure_result_carries_error_and_mirrors_details_into_msg() {
    let err = Error::new(ErrorCode::RequestTimeout, "budget exhausted");
    let r = RequestResult::failure(
        PartitionId::from("p1"),
        RunNr::default(),
        "sess-1",
        Duration::from_millis(5),
        err.clone(),
    );
    assert_eq!(r.status_code, StatusCode::Error);
    assert_eq!(r.msg, err.details);
    assert_eq!(r.aggregated_state, AggregatedState::Undefined);
}
