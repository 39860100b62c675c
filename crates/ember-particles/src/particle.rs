//! Particle state and the swap-remove pool that owns live particles

use crate::emit::{EmitSpec, ParticleShape};
use crate::rand::ParticleRng;
use ember_core::{Color, Vec2};
use ember_render::BlendMode;

/// Slack (seconds) for f32 drift when summing frame deltas against a lifetime
const EXPIRY_SLACK: f32 = 1e-5;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One live particle: a spawn-time snapshot plus integration state
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Elapsed life in seconds
    pub age: f32,
    /// Total life in seconds
    pub max_life: f32,
    pub size_start: f32,
    pub size_end: f32,
    pub opacity_start: f32,
    pub opacity_end: f32,
    pub color_start: Color,
    pub color_end: Color,
    pub shape: ParticleShape,
    pub blend_mode: BlendMode,
    pub drag: Option<f32>,
    pub gravity: Vec2,
}

impl Particle {
    /// Sample a new particle from `spec`
    pub fn spawn(spec: &EmitSpec, rng: &mut ParticleRng) -> Self {
        let position = spec.position + spec.spawn.offset(rng);
        let angle = spec.angle.sample(rng).to_radians();
        let speed = spec.speed.sample(rng);
        let life = spec.life.sample(rng).max(0.0);
        let size = spec.size.sample(rng);
        let opacity = spec.opacity.sample(rng);

        Self {
            position,
            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
            age: 0.0,
            max_life: life,
            size_start: size,
            size_end: spec.size_end.unwrap_or(size),
            opacity_start: opacity,
            opacity_end: spec.opacity_end.unwrap_or(opacity),
            color_start: spec.color,
            color_end: spec.color_end.unwrap_or(spec.color),
            shape: spec.shape,
            blend_mode: spec.blend_mode,
            drag: spec.drag,
            gravity: spec.gravity,
        }
    }

    /// Normalized elapsed life in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (self.age / self.max_life).clamp(0.0, 1.0)
        }
    }

    pub fn size(&self) -> f32 {
        lerp_f32(self.size_start, self.size_end, self.progress()).max(0.0)
    }

    pub fn opacity(&self) -> f32 {
        lerp_f32(self.opacity_start, self.opacity_end, self.progress()).clamp(0.0, 1.0)
    }

    pub fn color(&self) -> Color {
        self.color_start.lerp(self.color_end, self.progress())
    }

    /// Remaining life in seconds
    pub fn remaining(&self) -> f32 {
        (self.max_life - self.age).max(0.0)
    }

    pub fn is_alive(&self) -> bool {
        self.age + EXPIRY_SLACK < self.max_life
    }

    /// Advance by `dt` seconds: gravity, drag, position, age
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.gravity * dt;
        if let Some(drag) = self.drag {
            let retain = (1.0 - drag).clamp(0.0, 1.0);
            self.velocity = self.velocity * retain.powf(dt);
        }
        self.position += self.velocity * dt;
        self.age += dt;
    }
}

/// Bounded particle storage with O(1) swap-remove kill
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alive_count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    /// Add a particle. Returns false (dropping it) if the pool is full.
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Integrate every particle, then kill the expired ones via swap-remove
    pub fn update_and_compact(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.integrate(dt);
        }
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].is_alive() {
                i += 1;
            } else {
                // swapped-in particle still needs checking
                self.particles.swap_remove(i);
            }
        }
    }

    pub fn alive_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn alive_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Sample;

    fn fixed_spec() -> EmitSpec {
        EmitSpec {
            count: 1,
            angle: Sample::fixed(90.0),
            speed: Sample::fixed(10.0),
            life: Sample::fixed(0.5),
            size: Sample::fixed(4.0),
            size_end: Some(1.0),
            opacity: Sample::fixed(1.0),
            opacity_end: Some(0.2),
            color: Color::WHITE,
            color_end: Some(Color::BLACK),
            ..EmitSpec::default()
        }
    }

    #[test]
    fn test_spawn_derives_velocity_from_angle() {
        let mut rng = ParticleRng::new(1);
        let p = Particle::spawn(&fixed_spec(), &mut rng);
        assert!(p.velocity.x.abs() < 1e-4);
        assert!((p.velocity.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::spawn(&fixed_spec(), &mut rng);
        assert!((p.size() - 4.0).abs() < 1e-6);
        assert!((p.opacity() - 1.0).abs() < 1e-6);
        assert_eq!(p.color(), Color::WHITE);

        p.age = p.max_life;
        assert!((p.size() - 1.0).abs() < 1e-6);
        assert!((p.opacity() - 0.2).abs() < 1e-6);
        assert_eq!(p.color(), Color::BLACK);
    }

    #[test]
    fn test_missing_end_values_hold_start() {
        let spec = EmitSpec {
            size_end: None,
            opacity_end: None,
            color_end: None,
            ..fixed_spec()
        };
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::spawn(&spec, &mut rng);
        p.age = 0.4;
        assert!((p.size() - 4.0).abs() < 1e-6);
        assert!((p.opacity() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_drag_damps_velocity() {
        let spec = EmitSpec {
            drag: Some(0.5),
            ..fixed_spec()
        };
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::spawn(&spec, &mut rng);
        p.integrate(1.0);
        assert!((p.velocity.y - 5.0).abs() < 1e-4);

        let mut q = Particle::spawn(&spec, &mut rng);
        q.integrate(0.5);
        q.integrate(0.5);
        assert!((q.velocity.y - p.velocity.y).abs() < 1e-4);
    }

    #[test]
    fn test_pool_spawn_and_kill() {
        let mut rng = ParticleRng::new(3);
        let mut pool = ParticlePool::new(4);
        for _ in 0..3 {
            assert!(pool.push(Particle::spawn(&fixed_spec(), &mut rng)));
        }
        assert_eq!(pool.alive_count(), 3);

        // Kill the middle one by draining its life
        let p = &mut pool.alive_slice_mut()[1];
        p.age = p.max_life - 0.01;
        pool.update_and_compact(0.1);
        assert_eq!(pool.alive_count(), 2);

        // Pool full at capacity 4
        assert!(pool.push(Particle::spawn(&fixed_spec(), &mut rng)));
        assert!(pool.push(Particle::spawn(&fixed_spec(), &mut rng)));
        assert!(!pool.push(Particle::spawn(&fixed_spec(), &mut rng)));
    }

    #[test]
    fn test_expires_when_inexact_deltas_sum_to_life() {
        let mut rng = ParticleRng::new(5);
        for (dt, steps) in [(0.1_f32, 5), (0.01, 50), (1.0 / 60.0, 30)] {
            let mut p = Particle::spawn(&fixed_spec(), &mut rng);
            for _ in 0..steps - 1 {
                p.integrate(dt);
            }
            assert!(p.is_alive(), "dt={dt} died early");
            p.integrate(dt);
            assert!(!p.is_alive(), "dt={dt} outlived its life, age={}", p.age);
        }
    }
}
