//! Lightweight xorshift32 PRNG - no external crate needed

use ember_core::Vec2;

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // top 24 bits fit the f32 mantissa exactly
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform point inside a disc of `radius` around the origin
    pub fn in_circle(&mut self, radius: f32) -> Vec2 {
        let r = radius * self.next_f32().sqrt();
        Vec2::from_angle(self.range(0.0, std::f32::consts::TAU)) * r
    }

    /// Uniform point on a circle of `radius` around the origin
    pub fn on_circle(&mut self, radius: f32) -> Vec2 {
        Vec2::from_angle(self.range(0.0, std::f32::consts::TAU)) * radius
    }
}
