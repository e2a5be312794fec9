// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;

#[test]
fn fake_clock_advances_both_instant_and_epoch() {
    let clock = FakeClock::new();
    let start = clock.now();
    let start_epoch = clock.epoch_ms();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now(), start + Duration::from_secs(5));
    assert_eq!(clock.epoch_ms(), start_epoch + 5_000);
}

#[test]
fn system_clock_epoch_ms_is_monotonic_non_decreasing() {
    let clock = SystemClock;
    let a = clock.epoch_ms();
    let b = clock.epoch_ms();
    assert!(b >= a);
}
