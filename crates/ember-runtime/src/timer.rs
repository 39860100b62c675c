//! Frame timer: delta time, accumulated game time and a smoothed FPS estimate

use std::collections::VecDeque;

/// Largest delta handed to consumers. Avoids a spiral of death (and
/// teleporting entities) after a stalled or backgrounded frame.
pub const MAX_DELTA: f64 = 0.25;

/// Number of recent frame deltas averaged for the FPS estimate
pub const FPS_WINDOW: usize = 60;

/// Tracks frame timing from host-provided timestamps (seconds)
#[derive(Debug, Clone)]
pub struct Timer {
    /// Timestamp of the previous tick, `None` before the first tick
    last_time: Option<f64>,
    /// Delta of the most recent tick in seconds, clamped to [0, MAX_DELTA]
    delta_time: f64,
    /// Accumulated game time in seconds
    game_time: f64,
    frame_count: u64,
    /// Recent non-zero deltas for the FPS window
    samples: VecDeque<f64>,
    sample_sum: f64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            last_time: None,
            delta_time: 0.0,
            game_time: 0.0,
            frame_count: 0,
            samples: VecDeque::with_capacity(FPS_WINDOW),
            sample_sum: 0.0,
        }
    }

    /// Advance the timer to `now` and return the frame's delta time.
    ///
    /// The first tick reports 0. Timestamps that go backwards report 0.
    pub fn tick(&mut self, now: f64) -> f64 {
        self.frame_count += 1;

        let Some(last) = self.last_time.replace(now) else {
            self.delta_time = 0.0;
            return 0.0;
        };

        let elapsed = now - last;
        self.delta_time = if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_DELTA)
        } else {
            0.0
        };
        self.game_time += self.delta_time;

        if self.delta_time > 0.0 {
            if self.samples.len() == FPS_WINDOW {
                if let Some(oldest) = self.samples.pop_front() {
                    self.sample_sum -= oldest;
                }
            }
            self.samples.push_back(self.delta_time);
            self.sample_sum += self.delta_time;
        }

        self.delta_time
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second over the last `FPS_WINDOW` non-zero deltas.
    /// Zero until a second tick has happened.
    pub fn fps(&self) -> f64 {
        if self.samples.is_empty() || self.sample_sum <= 0.0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_sum
        }
    }

    /// Forget the previous timestamp so the next tick reports 0 again.
    /// Game time and the FPS window are kept.
    pub fn reset(&mut self) {
        self.last_time = None;
        self.delta_time = 0.0;
    }
}
