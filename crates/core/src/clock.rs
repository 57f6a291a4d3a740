// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction.
//!
//! Every component that reasons about deadlines (grace periods, timeouts,
//! scheduled-task due times, backoff) goes through this trait instead of
//! calling `SystemTime::now()`/`Instant::now()` directly, so tests can
//! advance time deterministically without real sleeps.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Abstracts wall-clock and monotonic time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> i64;

    /// Seconds since the Unix epoch (most of the data model uses epoch
    /// seconds — `next_run_epoch`, `created_at`, `checked_at`, ...).
    fn epoch_secs(&self) -> i64 {
        self.epoch_ms() / 1000
    }

    /// Monotonic instant, for measuring elapsed durations within a process
    /// lifetime (sweep timeouts, per-send budgets). Not persisted.
    fn now(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests: starts at a fixed epoch and only advances
/// when explicitly told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    epoch_ms: i64,
    monotonic: Instant,
    elapsed: Duration,
}

impl FakeClock {
    /// Creates a fake clock starting at the given epoch milliseconds.
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                epoch_ms,
                monotonic: Instant::now(),
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Advances both the wall-clock and monotonic views by `d`.
    pub fn advance(&self, d: Duration) {
        let mut state = self.inner.lock();
        state.epoch_ms += d.as_millis() as i64;
        state.elapsed += d;
    }

    pub fn set_epoch_ms(&self, epoch_ms: i64) {
        self.inner.lock().epoch_ms = epoch_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        // 2026-01-01T00:00:00Z, an arbitrary fixed point so test fixtures
        // that print dates are stable across runs.
        Self::new(1_767_225_600_000)
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> i64 {
        self.inner.lock().epoch_ms
    }

    fn now(&self) -> Instant {
        let state = self.inner.lock();
        state.monotonic + state.elapsed
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
