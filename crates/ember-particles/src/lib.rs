//! Ember Particles - pooled 2D particle effects
//!
//! Provides short-lived visual particles with:
//! - Per-particle randomized emission (angle, speed, life, size, opacity)
//! - Size/opacity/color interpolation over lifetime
//! - Optional drag, gravity and additive blending
//! - Continuous emitters with sub-frame emission accumulation
//! - A bounded swap-remove pool for O(1) kill

pub mod emit;
pub mod emitter;
pub mod particle;
pub mod rand;

use ember_core::Vec2;
use ember_render::{BlendMode, Paint, Surface};

pub use emit::{EmitSpec, ParticleShape, Sample, SpawnShape};
pub use emitter::{Emitter, EmitterId};
pub use particle::{Particle, ParticlePool};

/// Default cap on live particles
pub const DEFAULT_MAX_PARTICLES: usize = 2000;

/// The particle system: owns every live particle and continuous emitter
pub struct ParticleSystem {
    pool: ParticlePool,
    emitters: Vec<(EmitterId, Emitter)>,
    next_emitter: u64,
    rng: rand::ParticleRng,
    /// Particles refused because the pool was full
    dropped: u64,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PARTICLES)
    }

    pub fn with_capacity(max_particles: usize) -> Self {
        Self {
            pool: ParticlePool::new(max_particles),
            emitters: Vec::new(),
            next_emitter: 0,
            rng: rand::ParticleRng::new(0xDEAD_BEEF),
            dropped: 0,
        }
    }

    /// Reseed the random source (deterministic effects in tests and replays)
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng = rand::ParticleRng::new(seed);
        self
    }

    /// Create `spec.count` particles. Returns how many fit in the pool.
    pub fn emit(&mut self, spec: &EmitSpec) -> usize {
        self.spawn(spec, spec.count)
    }

    fn spawn(&mut self, spec: &EmitSpec, count: u32) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            if self.pool.is_full() {
                let refused = (count as usize - spawned) as u64;
                self.dropped += refused;
                log::debug!(
                    "particle pool full ({}), dropped {refused} particle(s)",
                    self.pool.capacity()
                );
                break;
            }
            self.pool.push(Particle::spawn(spec, &mut self.rng));
            spawned += 1;
        }
        spawned
    }

    /// Register a continuous emitter
    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = EmitterId(self.next_emitter);
        self.next_emitter += 1;
        self.emitters.push((id, emitter));
        id
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    /// Move an emitter. Returns false if it no longer exists.
    pub fn move_emitter(&mut self, id: EmitterId, position: Vec2) -> bool {
        match self.emitter_mut(id) {
            Some(emitter) => {
                emitter.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn remove_emitter(&mut self, id: EmitterId) -> bool {
        let before = self.emitters.len();
        self.emitters.retain(|(eid, _)| *eid != id);
        self.emitters.len() != before
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Run emitters, integrate every live particle and remove expired ones
    pub fn update(&mut self, dt: f32) {
        let mut pending = Vec::new();
        for (_, emitter) in &mut self.emitters {
            let n = emitter.tick(dt);
            if n > 0 {
                pending.push((emitter.spec.clone(), n));
            }
        }
        for (spec, n) in pending {
            self.spawn(&spec, n);
        }
        self.emitters.retain(|(_, e)| !e.is_finished());

        self.pool.update_and_compact(dt);
    }

    /// Draw every live particle. Leaves the surface state as it found it.
    pub fn render(&self, surface: &mut dyn Surface) {
        let particles = self.pool.alive_slice();
        if particles.is_empty() {
            return;
        }

        surface.save();
        let mut blend = BlendMode::Normal;
        surface.set_blend_mode(blend);
        for p in particles {
            let size = p.size();
            let opacity = p.opacity();
            if size <= 0.0 || opacity <= 0.0 {
                continue;
            }
            if p.blend_mode != blend {
                blend = p.blend_mode;
                surface.set_blend_mode(blend);
            }
            surface.set_global_alpha(opacity);
            draw_particle(surface, p, size);
        }
        surface.restore();
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.alive_slice()
    }

    pub fn len(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.alive_count() == 0
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Kill every particle and emitter (scene transitions)
    pub fn clear(&mut self) {
        self.pool.clear();
        self.emitters.clear();
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_particle(surface: &mut dyn Surface, p: &Particle, size: f32) {
    let color = p.color();
    match p.shape {
        ParticleShape::Circle => {
            surface.fill_circle(p.position, size, &Paint::Solid(color));
        }
        ParticleShape::Square => {
            surface.fill_rect(
                p.position.x - size,
                p.position.y - size,
                size * 2.0,
                size * 2.0,
                &Paint::Solid(color),
            );
        }
        ParticleShape::Glow => {
            surface.fill_circle(p.position, size, &Paint::glow(p.position, size, color));
        }
        ParticleShape::Spark => {
            let tail = p.position - p.velocity.normalized() * (size * 3.0);
            surface.begin_path();
            surface.move_to(p.position.x, p.position.y);
            surface.line_to(tail.x, tail.y);
            surface.stroke(&Paint::Solid(color), size.max(1.0));
        }
    }
}
