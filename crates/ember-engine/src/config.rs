//! Engine configuration, loadable from TOML

use ember_core::{Color, EmberError, Result, Vec2};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use winit::keyboard::KeyCode;

/// Options accepted by [`crate::Engine::init`].
///
/// Every field has a default and unknown keys are ignored, so a config file
/// only lists what it changes:
///
/// ```toml
/// selector = "#game"
/// width = 1024
/// height = 768
/// background_color = "#101020"
///
/// [actions]
/// fire = ["Space", "KeyJ"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mount target for the drawing surface, resolved by the host
    pub selector: String,
    /// Logical surface width in pixels
    pub width: u32,
    /// Logical surface height in pixels
    pub height: u32,
    /// Clear color for every frame
    pub background_color: Color,
    /// Draw the FPS overlay
    pub show_fps: bool,
    /// World width for camera clamping. Defaults to the surface width.
    pub world_width: Option<f32>,
    /// World height for camera clamping. Defaults to the surface height.
    pub world_height: Option<f32>,
    /// Live particle cap
    pub max_particles: usize,
    /// Extra or replacement action bindings, applied over the defaults
    pub actions: HashMap<String, Vec<KeyCode>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selector: "#game".to_string(),
            width: 800,
            height: 600,
            background_color: Color::BLACK,
            show_fps: false,
            world_width: None,
            world_height: None,
            max_particles: ember_particles::DEFAULT_MAX_PARTICLES,
            actions: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_world_size(mut self, width: f32, height: f32) -> Self {
        self.world_width = Some(width);
        self.world_height = Some(height);
        self
    }

    /// Reject configurations the loop cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EmberError::InvalidConfig(format!(
                "surface size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        for (axis, value) in [("world_width", self.world_width), ("world_height", self.world_height)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(EmberError::InvalidConfig(format!(
                        "{axis} must be a non-negative number, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn world_size(&self) -> Vec2 {
        let screen = self.screen_size();
        Vec2::new(
            self.world_width.unwrap_or(screen.x),
            self.world_height.unwrap_or(screen.y),
        )
    }
}
