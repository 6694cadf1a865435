//! Monotonic tick clock
//!
//! Every timer in the simulation is an absolute millisecond timestamp read
//! from this clock, so tests can place the clock anywhere they like.

use serde::{Deserialize, Serialize};

use crate::consts::TICK_RATE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    ticks: u64,
    /// Offset added to the tick-derived time (set by tests and resets)
    base_ms: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock frozen at `ms` until the next `advance`
    pub fn at_ms(ms: u64) -> Self {
        Self { ticks: 0, base_ms: ms }
    }

    /// Advance by one fixed tick
    pub fn advance(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current time in whole milliseconds
    pub fn now_ms(&self) -> u64 {
        self.base_ms + self.ticks * 1000 / TICK_RATE as u64
    }
}
