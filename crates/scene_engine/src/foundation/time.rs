//! Time management utilities
//!
//! The [`Timer`] is the frame clock: it produces the monotonically
//! increasing per-frame delta time the animation clock is advanced by.

use std::time::Instant;

/// High-precision frame timer
///
/// Call [`Timer::tick`] once per frame; between ticks the last delta and
/// running totals are available to the simulation.
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    delta_time: f32,
    frame_count: u64,
    max_delta: Option<f32>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta_time: 0.0,
            frame_count: 0,
            max_delta: None,
        }
    }

    /// Clamp reported delta times to `max_delta` seconds
    ///
    /// Keeps a long stall (breakpoint, window drag) from producing one huge
    /// simulation step on the next frame.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    /// Advance the clock; call once per frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        let mut delta = now.duration_since(self.last_tick).as_secs_f32();
        if let Some(max) = self.max_delta {
            delta = delta.min(max);
        }
        self.delta_time = delta;
        self.last_tick = now;
        self.frame_count += 1;
    }

    /// Time since the last tick in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total wall-clock time since timer creation in seconds
    pub fn total_time(&self) -> f32 {
        self.last_tick.duration_since(self.start).as_secs_f32()
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
