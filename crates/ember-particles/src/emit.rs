//! Emission parameters (parsed from TOML or built in code) and presets

use crate::rand::ParticleRng;
use ember_core::{Color, Vec2};
use ember_render::BlendMode;
use serde::Deserialize;

/// A value that is either fixed or sampled uniformly from `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Fixed(f32),
    Range { min: f32, max: f32 },
}

impl Sample {
    pub const fn fixed(value: f32) -> Self {
        Sample::Fixed(value)
    }

    pub const fn range(min: f32, max: f32) -> Self {
        Sample::Range { min, max }
    }

    pub fn sample(&self, rng: &mut ParticleRng) -> f32 {
        match *self {
            Sample::Fixed(v) => v,
            Sample::Range { min, max } => rng.range(min, max),
        }
    }

    pub fn min(&self) -> f32 {
        match *self {
            Sample::Fixed(v) => v,
            Sample::Range { min, max } => min.min(max),
        }
    }

    pub fn max(&self) -> f32 {
        match *self {
            Sample::Fixed(v) => v,
            Sample::Range { min, max } => min.max(max),
        }
    }
}

/// Where new particles appear relative to the emission point
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpawnShape {
    /// Exactly at the emission point
    #[default]
    Point,
    /// Anywhere inside a disc
    Circle { radius: f32 },
    /// On the edge of a circle
    Ring { radius: f32 },
}

impl SpawnShape {
    pub fn offset(&self, rng: &mut ParticleRng) -> Vec2 {
        match *self {
            SpawnShape::Point => Vec2::ZERO,
            SpawnShape::Circle { radius } => rng.in_circle(radius),
            SpawnShape::Ring { radius } => rng.on_circle(radius),
        }
    }
}

/// How a particle is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ParticleShape {
    /// Solid disc of radius `size`
    #[default]
    Circle,
    /// Solid square with half-extent `size`
    Square,
    /// Radial gradient fading out at radius `size`
    Glow,
    /// Streak along the direction of travel
    Spark,
}

impl ParticleShape {
    /// Parse a shape name. Unknown names fall back to `Circle`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "square" | "rect" => ParticleShape::Square,
            "glow" => ParticleShape::Glow,
            "spark" | "line" => ParticleShape::Spark,
            _ => ParticleShape::Circle,
        }
    }
}

impl From<String> for ParticleShape {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

/// Parameters of one `emit` call. Every particle samples its own values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmitSpec {
    /// Emission point in world space
    pub position: Vec2,
    /// Number of particles to create
    pub count: u32,
    pub spawn: SpawnShape,
    /// Direction of travel in degrees (0 = +x, 90 = down on a y-down surface)
    pub angle: Sample,
    /// Speed in world units per second
    pub speed: Sample,
    /// Lifetime in seconds
    pub life: Sample,
    pub size: Sample,
    /// Size at end of life. `None` keeps the start size.
    pub size_end: Option<f32>,
    pub opacity: Sample,
    /// Opacity at end of life. `None` keeps the start opacity.
    pub opacity_end: Option<f32>,
    pub color: Color,
    /// Color at end of life. `None` keeps the start color.
    pub color_end: Option<Color>,
    pub shape: ParticleShape,
    pub blend_mode: BlendMode,
    /// Fraction of velocity lost per second, in [0, 1]
    pub drag: Option<f32>,
    /// Constant acceleration in world units per second squared
    pub gravity: Vec2,
}

impl Default for EmitSpec {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            count: 10,
            spawn: SpawnShape::Point,
            angle: Sample::range(0.0, 360.0),
            speed: Sample::range(50.0, 100.0),
            life: Sample::range(0.5, 1.0),
            size: Sample::fixed(4.0),
            size_end: None,
            opacity: Sample::fixed(1.0),
            opacity_end: Some(0.0),
            color: Color::WHITE,
            color_end: None,
            shape: ParticleShape::Circle,
            blend_mode: BlendMode::Normal,
            drag: None,
            gravity: Vec2::ZERO,
        }
    }
}

impl EmitSpec {
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Radial burst of hot additive particles cooling from yellow to red
    pub fn explosion(position: Vec2, intensity: f32) -> Self {
        let intensity = intensity.max(0.1);
        Self {
            position,
            count: (40.0 * intensity).round() as u32,
            spawn: SpawnShape::Circle {
                radius: 4.0 * intensity,
            },
            angle: Sample::range(0.0, 360.0),
            speed: Sample::range(60.0 * intensity, 220.0 * intensity),
            life: Sample::range(0.4, 1.0),
            size: Sample::range(2.0, 5.0),
            size_end: Some(0.5),
            opacity: Sample::fixed(1.0),
            opacity_end: Some(0.0),
            color: Color::from_hex(0xFFE066),
            color_end: Some(Color::from_hex(0xC0392B)),
            shape: ParticleShape::Glow,
            blend_mode: BlendMode::Additive,
            drag: Some(0.9),
            gravity: Vec2::ZERO,
        }
    }

    /// Narrow fan of fast streaks around `angle_deg`
    pub fn sparks(position: Vec2, angle_deg: f32) -> Self {
        Self {
            position,
            count: 12,
            spawn: SpawnShape::Point,
            angle: Sample::range(angle_deg - 25.0, angle_deg + 25.0),
            speed: Sample::range(150.0, 300.0),
            life: Sample::range(0.15, 0.4),
            size: Sample::fixed(2.0),
            size_end: Some(1.0),
            opacity: Sample::fixed(1.0),
            opacity_end: Some(0.0),
            color: Color::WHITE,
            color_end: Some(Color::YELLOW),
            shape: ParticleShape::Spark,
            blend_mode: BlendMode::Additive,
            drag: Some(0.5),
            gravity: Vec2::new(0.0, 200.0),
        }
    }

    /// Slow, growing grey puffs drifting upwards
    pub fn smoke(position: Vec2) -> Self {
        Self {
            position,
            count: 8,
            spawn: SpawnShape::Circle { radius: 6.0 },
            angle: Sample::range(250.0, 290.0),
            speed: Sample::range(10.0, 30.0),
            life: Sample::range(1.0, 2.0),
            size: Sample::range(4.0, 8.0),
            size_end: Some(16.0),
            opacity: Sample::range(0.3, 0.5),
            opacity_end: Some(0.0),
            color: Color::rgb(0.6, 0.6, 0.6),
            color_end: Some(Color::rgb(0.3, 0.3, 0.3)),
            shape: ParticleShape::Circle,
            blend_mode: BlendMode::Normal,
            drag: Some(0.3),
            gravity: Vec2::ZERO,
        }
    }

    /// Exhaust pointing along `angle_deg`, meant for a continuous emitter
    pub fn thruster(position: Vec2, angle_deg: f32) -> Self {
        Self {
            position,
            count: 1,
            spawn: SpawnShape::Point,
            angle: Sample::range(angle_deg - 10.0, angle_deg + 10.0),
            speed: Sample::range(80.0, 140.0),
            life: Sample::range(0.2, 0.45),
            size: Sample::range(2.0, 4.0),
            size_end: Some(0.0),
            opacity: Sample::fixed(0.9),
            opacity_end: Some(0.0),
            color: Color::from_hex(0x66CCFF),
            color_end: Some(Color::from_hex(0x1A3D80)),
            shape: ParticleShape::Glow,
            blend_mode: BlendMode::Additive,
            drag: None,
            gravity: Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_sane() {
        let spec = EmitSpec::default();
        assert!(spec.count > 0);
        assert!(spec.life.max() >= spec.life.min());
        assert_eq!(spec.shape, ParticleShape::Circle);
    }

    #[test]
    fn test_sample_stays_in_range() {
        let mut rng = ParticleRng::new(5);
        let s = Sample::range(2.0, 3.0);
        for _ in 0..200 {
            let v = s.sample(&mut rng);
            assert!((2.0..3.0).contains(&v));
        }
        assert_eq!(Sample::fixed(1.5).sample(&mut rng), 1.5);
    }

    #[test]
    fn test_shape_names_fall_back() {
        assert_eq!(ParticleShape::from_name("glow"), ParticleShape::Glow);
        assert_eq!(ParticleShape::from_name("Square"), ParticleShape::Square);
        assert_eq!(ParticleShape::from_name("hexagon"), ParticleShape::Circle);
    }

    #[test]
    fn test_parse_from_toml() {
        let toml_str = r##"
count = 25
angle = { min = -45, max = 45 }
speed = 120
life = { min = 0.5, max = 0.5 }
size = { min = 1.0, max = 3.0 }
size_end = 0
color = "#ff8800"
color_end = [1.0, 0.0, 0.0, 0.0]
shape = "triangle"
blend_mode = "screen"
drag = 0.25
spawn = { type = "ring", radius = 12 }

[position]
x = 10
y = 20
"##;
        let spec: EmitSpec = toml::from_str(toml_str).unwrap();
        assert_eq!(spec.count, 25);
        assert_eq!(spec.position, Vec2::new(10.0, 20.0));
        assert_eq!(spec.angle, Sample::range(-45.0, 45.0));
        assert_eq!(spec.speed, Sample::fixed(120.0));
        assert_eq!(spec.size_end, Some(0.0));
        assert!((spec.color.g - 0.533).abs() < 0.01);
        assert_eq!(spec.color_end.map(|c| c.a), Some(0.0));
        // unknown cosmetic values degrade to defaults
        assert_eq!(spec.shape, ParticleShape::Circle);
        assert_eq!(spec.blend_mode, BlendMode::Normal);
        assert_eq!(spec.drag, Some(0.25));
        assert_eq!(spec.spawn, SpawnShape::Ring { radius: 12.0 });
        // untouched fields keep defaults
        assert_eq!(spec.opacity, Sample::fixed(1.0));
    }

    #[test]
    fn test_explosion_scales_with_intensity() {
        let small = EmitSpec::explosion(Vec2::ZERO, 0.5);
        let big = EmitSpec::explosion(Vec2::ZERO, 2.0);
        assert!(big.count > small.count);
        assert!(big.speed.max() > small.speed.max());
        assert_eq!(big.blend_mode, BlendMode::Additive);
    }
}
