//! The 2D drawing surface contract consumed by the camera, particles and entities

use ember_core::{Color, Vec2};
use serde::{Deserialize, Serialize};

/// Compositing mode for subsequent draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlendMode {
    /// Source-over alpha blending
    #[default]
    Normal,
    /// Additive ("lighter") blending, for glows and fire
    Additive,
}

impl BlendMode {
    /// Parse a blend mode name. Unknown names fall back to `Normal`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "additive" | "add" | "lighter" => BlendMode::Additive,
            _ => BlendMode::Normal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Additive => "additive",
        }
    }
}

impl From<String> for BlendMode {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<BlendMode> for String {
    fn from(mode: BlendMode) -> Self {
        mode.name().to_string()
    }
}

/// One color stop of a gradient, `offset` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Fill or stroke style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Radial glow fading from `color` at the center to transparent at `radius`
    pub fn glow(center: Vec2, radius: f32, color: Color) -> Self {
        Paint::RadialGradient {
            center,
            radius,
            stops: vec![
                GradientStop::new(0.0, color),
                GradientStop::new(1.0, color.with_alpha(0.0)),
            ],
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// An immediate-mode 2D drawing surface.
///
/// Origin is the top-left corner, y grows downwards, angles are radians.
/// Transform, global alpha and blend mode are part of the state pushed by
/// [`Surface::save`] and popped by [`Surface::restore`]. Every drawer that
/// changes that state must restore it before handing the surface on.
pub trait Surface {
    /// Logical size in pixels. Fixed for the lifetime of the surface.
    fn size(&self) -> Vec2;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Fill the whole surface, ignoring the current transform
    fn clear(&mut self, color: Color);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn fill(&mut self, paint: &Paint);
    fn stroke(&mut self, paint: &Paint, width: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: &Paint);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, paint: &Paint);
    fn draw_image(&mut self, image: &str, x: f32, y: f32, w: f32, h: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.begin_path();
        self.arc(center.x, center.y, radius, 0.0, std::f32::consts::TAU);
        self.fill(paint);
    }

    /// Closed polygon through `points`. Fewer than two points draws nothing.
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        self.begin_path();
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        self.close_path();
        self.fill(paint);
    }
}
