//! Monotonic time source and per-frame delta sampling
//!
//! The driver samples its clock once per frame; every timer in the simulation
//! is derived from that single delta.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;

/// Monotonic clock
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Turns clock samples into clamped frame deltas
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    last: Option<Duration>,
    max_dt: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self {
            last: None,
            max_dt: MAX_FRAME_DT,
        }
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous sample, clamped to the frame limit.
    ///
    /// The first sample yields zero.
    pub fn next_dt(&mut self, clock: &impl Clock) -> f32 {
        let now = clock.now();
        let dt = match self.last {
            Some(last) => now.saturating_sub(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_dt)
    }
}
