//! Coarse game objects updated and drawn by the scene

use crate::context::GameContext;
use ember_core::Vec2;
use ember_render::Surface;

/// A game object with its own update and render.
///
/// Entities are drawn in world space (inside the camera transform). Any
/// surface state an entity changes must be restored before `render` returns.
pub trait Entity {
    fn update(&mut self, dt: f32, ctx: &mut GameContext);

    fn render(&self, surface: &mut dyn Surface);

    fn position(&self) -> Vec2;

    /// Entities reporting false are removed at the end of the frame
    fn is_alive(&self) -> bool {
        true
    }
}
