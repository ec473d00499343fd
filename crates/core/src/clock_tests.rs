// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_never_goes_backwards() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
}

#[test]
fn fake_clock_only_moves_when_advanced() {
    let clock = FakeClock::new();
    let start = clock.now();
    assert_eq!(clock.since(start), Duration::ZERO);

    clock.advance_ms(4_999);
    assert_eq!(clock.since(start), Duration::from_millis(4_999));
}

#[test]
fn fake_clock_clones_share_time() {
    let a = FakeClock::new();
    let b = a.clone();
    let start = a.now();
    b.advance(Duration::from_secs(5));
    assert_eq!(a.since(start), Duration::from_secs(5));
}

#[test]
fn since_saturates_for_future_instants() {
    let clock = FakeClock::new();
    let future = clock.now() + Duration::from_secs(1);
    assert_eq!(clock.since(future), Duration::ZERO);
}

#[test]
fn as_millis_truncates_sub_millisecond_parts() {
    assert_eq!(as_millis(Duration::from_micros(5_000_999)), 5_000);
}
