//! Continuous emitters: spawn from an [`EmitSpec`] at a steady rate

use crate::emit::EmitSpec;
use ember_core::Vec2;

/// Identity of a registered emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterId(pub(crate) u64);

/// Runtime state for one continuous emitter.
///
/// `spec.count` is ignored; `rate` particles per second are spawned at
/// `spec.position` instead.
#[derive(Debug, Clone)]
pub struct Emitter {
    pub spec: EmitSpec,
    /// Particles per second
    pub rate: f32,
    /// Stop after this many seconds. `None` runs until stopped.
    pub duration: Option<f32>,
    /// Whether the emitter is currently spawning
    pub playing: bool,
    /// Fractional particle accumulator for sub-frame emission
    accumulator: f32,
    /// How long this emitter has been running
    elapsed: f32,
}

impl Emitter {
    pub fn new(spec: EmitSpec, rate: f32) -> Self {
        Self {
            spec,
            rate: rate.max(0.0),
            duration: None,
            playing: true,
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.spec.position = position;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// True once a timed emitter has run its course
    pub fn is_finished(&self) -> bool {
        self.duration.is_some_and(|d| self.elapsed >= d)
    }

    /// Advance by `dt` and return how many particles to spawn this frame
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.playing || self.is_finished() {
            return 0;
        }
        let active = match self.duration {
            Some(d) => dt.min(d - self.elapsed),
            None => dt,
        };
        self.elapsed += dt;

        self.accumulator += self.rate * active.max(0.0);
        let spawn_count = self.accumulator as u32;
        self.accumulator -= spawn_count as f32;
        spawn_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_fractional_particles() {
        let mut e = Emitter::new(EmitSpec::default(), 10.0);
        // 0.05s at 10/s = half a particle per frame
        assert_eq!(e.tick(0.05), 0);
        assert_eq!(e.tick(0.05), 1);
        assert_eq!(e.tick(0.05), 0);
        assert_eq!(e.tick(0.05), 1);
    }

    #[test]
    fn test_stops_after_duration() {
        let mut e = Emitter::new(EmitSpec::default(), 100.0).with_duration(0.1);
        let mut total = 0;
        for _ in 0..10 {
            total += e.tick(0.05);
        }
        assert!(e.is_finished());
        assert!((9..=10).contains(&total));
    }

    #[test]
    fn test_paused_emitter_spawns_nothing() {
        let mut e = Emitter::new(EmitSpec::default(), 100.0);
        e.playing = false;
        assert_eq!(e.tick(1.0), 0);
        assert_eq!(e.elapsed(), 0.0);
    }
}
