// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_epoch_and_monotonic_together() {
    let clock = FakeClock::new(1_000_000);
    let t0 = clock.now();
    assert_eq!(clock.epoch_ms(), 1_000_000);

    clock.advance(Duration::from_secs(60));

    assert_eq!(clock.epoch_ms(), 1_060_000);
    assert_eq!(clock.epoch_secs(), 1_060);
    assert!(clock.now() - t0 >= Duration::from_secs(60));
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new(0);
    let clone = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(clone.epoch_ms(), 5_000);
}

#[test]
fn system_clock_epoch_is_plausible() {
    let clock = SystemClock;
    // Any time after this crate was written.
    assert!(clock.epoch_secs() > 1_700_000_000);
}
