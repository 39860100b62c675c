//! 2D camera: view position + zoom, with follow/clamp against a world boundary

use crate::surface::Surface;
use ember_core::Vec2;

/// A 2D camera.
///
/// `position` is the world-space top-left corner of the view. The view covers
/// `screen_size / zoom` world units.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space top-left of the view
    pub position: Vec2,
    /// Zoom factor, always > 0
    zoom: f32,

    // Screen shake state
    shake_intensity: f32,
    shake_duration: f32,
    shake_remaining: f32,
    shake_offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            shake_intensity: 0.0,
            shake_duration: 0.0,
            shake_remaining: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom;
        } else {
            log::debug!("ignoring invalid camera zoom {zoom}");
        }
    }

    /// Absolute placement
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Relative translation
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    /// World units covered by a screen of `screen_size` pixels
    pub fn view_size(&self, screen_size: Vec2) -> Vec2 {
        screen_size * (1.0 / self.zoom)
    }

    /// Center the view on `target`, then clamp so the view stays inside
    /// `[0, world_size - view_size]` on each axis.
    ///
    /// When the world is smaller than the view on an axis the upper bound is
    /// below zero; the lower bound wins and the position becomes 0.
    pub fn follow(&mut self, target: Vec2, screen_size: Vec2, world_size: Vec2) {
        let view = self.view_size(screen_size);
        let x = target.x - view.x / 2.0;
        let y = target.y - view.y / 2.0;
        self.position = Vec2::new(
            x.min(world_size.x - view.x).max(0.0),
            y.min(world_size.y - view.y).max(0.0),
        );
    }

    /// Start a screen shake of `intensity` pixels decaying over `duration` seconds.
    /// A stronger shake replaces a weaker one in progress.
    pub fn shake(&mut self, intensity: f32, duration: f32) {
        if intensity <= 0.0 || duration <= 0.0 {
            return;
        }
        let current = self.current_shake_strength();
        if intensity >= current {
            self.shake_intensity = intensity;
            self.shake_duration = duration;
            self.shake_remaining = duration;
        }
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_remaining > 0.0
    }

    fn current_shake_strength(&self) -> f32 {
        if self.shake_duration <= 0.0 {
            return 0.0;
        }
        self.shake_intensity * (self.shake_remaining / self.shake_duration).max(0.0)
    }

    /// Advance time-based effects (screen shake decay)
    pub fn update(&mut self, dt: f32) {
        if self.shake_remaining <= 0.0 {
            self.shake_offset = Vec2::ZERO;
            return;
        }
        self.shake_remaining = (self.shake_remaining - dt).max(0.0);
        let strength = self.current_shake_strength();
        let phase = self.shake_remaining * 60.0;
        self.shake_offset = Vec2::new((phase * 1.7).sin(), (phase * 2.3).cos()) * strength;
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// Push a saved state and apply `scale(zoom)` then `translate(-position)`.
    /// Must be paired with [`Camera::unapply`] in the same frame.
    pub fn apply(&self, surface: &mut dyn Surface) {
        let origin = self.position + self.shake_offset;
        surface.save();
        surface.scale(self.zoom, self.zoom);
        surface.translate(-origin.x, -origin.y);
    }

    /// Restore the transform saved by [`Camera::apply`]
    pub fn unapply(&self, surface: &mut dyn Surface) {
        surface.restore();
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen * (1.0 / self.zoom) + self.position
    }

    /// Visible world rectangle as (top-left, size)
    pub fn visible_rect(&self, screen_size: Vec2) -> (Vec2, Vec2) {
        (self.position, self.view_size(screen_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingSurface};

    const WORLD: Vec2 = Vec2::new(1000.0, 1000.0);
    const SCREEN: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_follow_clamps_near_edge() {
        let mut cam = Camera::new();
        cam.follow(Vec2::new(50.0, 50.0), SCREEN, WORLD);
        assert_eq!(cam.position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_follow_centers_target() {
        let mut cam = Camera::new();
        cam.follow(Vec2::new(500.0, 500.0), SCREEN, WORLD);
        assert_eq!(cam.position, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_follow_clamps_far_edge() {
        let mut cam = Camera::new();
        cam.follow(Vec2::new(990.0, 990.0), SCREEN, WORLD);
        assert_eq!(cam.position, Vec2::new(200.0, 400.0));
    }

    #[test]
    fn test_follow_small_world_prefers_lower_bound() {
        let mut cam = Camera::new();
        cam.follow(Vec2::new(300.0, 300.0), SCREEN, Vec2::new(400.0, 400.0));
        assert_eq!(cam.position, Vec2::ZERO);

        cam.follow(Vec2::new(10.0, 10.0), SCREEN, Vec2::ZERO);
        assert_eq!(cam.position, Vec2::ZERO);
    }

    #[test]
    fn test_follow_respects_zoom() {
        let mut cam = Camera::new();
        cam.set_zoom(2.0);
        cam.follow(Vec2::new(500.0, 500.0), SCREEN, WORLD);
        // view is 400x300 world units
        assert_eq!(cam.position, Vec2::new(300.0, 350.0));
    }

    #[test]
    fn test_invalid_zoom_ignored() {
        let mut cam = Camera::new();
        cam.set_zoom(0.0);
        cam.set_zoom(-1.0);
        cam.set_zoom(f32::NAN);
        assert_eq!(cam.zoom(), 1.0);
    }

    #[test]
    fn test_move_and_set_position() {
        let mut cam = Camera::new();
        cam.set_position(10.0, 20.0);
        cam.move_by(5.0, -5.0);
        assert_eq!(cam.position, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_apply_scales_before_translating() {
        let mut cam = Camera::new();
        cam.set_zoom(2.0);
        cam.set_position(100.0, 50.0);

        let mut surface = RecordingSurface::new(800, 600);
        cam.apply(&mut surface);
        assert_eq!(
            &surface.commands()[..3],
            &[
                DrawCommand::Save,
                DrawCommand::Scale(2.0, 2.0),
                DrawCommand::Translate(-100.0, -50.0),
            ]
        );
        // Camera origin lands on the screen origin, world units are doubled
        assert_eq!(surface.transform_point(Vec2::new(100.0, 50.0)), Vec2::ZERO);
        assert_eq!(
            surface.transform_point(Vec2::new(150.0, 50.0)),
            Vec2::new(100.0, 0.0)
        );
        assert_eq!(
            surface.transform_point(Vec2::new(150.0, 50.0)),
            cam.world_to_screen(Vec2::new(150.0, 50.0))
        );

        cam.unapply(&mut surface);
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.transform_point(Vec2::new(7.0, 7.0)), Vec2::new(7.0, 7.0));
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let mut cam = Camera::new();
        cam.set_zoom(4.0);
        cam.set_position(12.0, 8.0);
        let w = cam.screen_to_world(Vec2::new(40.0, 20.0));
        assert_eq!(w, Vec2::new(22.0, 13.0));
        assert_eq!(cam.world_to_screen(w), Vec2::new(40.0, 20.0));
    }

    #[test]
    fn test_shake_decays_to_rest() {
        let mut cam = Camera::new();
        cam.shake(10.0, 0.5);
        assert!(cam.is_shaking());

        cam.update(0.1);
        assert!(cam.shake_offset().length() <= 10.0 * 1.5);

        for _ in 0..10 {
            cam.update(0.1);
        }
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_weaker_shake_does_not_override() {
        let mut cam = Camera::new();
        cam.shake(10.0, 1.0);
        cam.shake(1.0, 5.0);
        cam.update(0.5);
        // still inside the first, one second shake
        assert!(cam.is_shaking());
        cam.update(0.6);
        assert!(!cam.is_shaking());
    }
}
