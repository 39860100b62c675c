//! Headless surface that records every call as a [`DrawCommand`]

use crate::surface::{BlendMode, Paint, Surface, TextAlign};
use ember_core::{Color, Vec2};

/// A recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Save,
    Restore,
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
    GlobalAlpha(f32),
    Blend(BlendMode),
    BeginPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Arc {
        cx: f32,
        cy: f32,
        radius: f32,
        start: f32,
        end: f32,
    },
    ClosePath,
    Fill(Paint),
    Stroke(Paint, f32),
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        paint: Paint,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        align: TextAlign,
        paint: Paint,
    },
    DrawImage {
        image: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

/// Affine transform in canvas order: `[a, b, c, d, e, f]`
type Affine = [f32; 6];

const IDENTITY: Affine = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Clone, Copy)]
struct DrawState {
    transform: Affine,
    alpha: f32,
    blend: BlendMode,
}

/// A [`Surface`] with no pixels. Tracks transform/alpha/blend state the way a
/// canvas does and keeps a log of calls for inspection.
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    state: DrawState,
    stack: Vec<DrawState>,
    unbalanced_restores: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            commands: Vec::new(),
            state: DrawState {
                transform: IDENTITY,
                alpha: 1.0,
                blend: BlendMode::Normal,
            },
            stack: Vec::new(),
            unbalanced_restores: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Remove and return the recorded commands, keeping the current state
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded commands matching `pred`
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Current save-stack depth. Zero between balanced frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of `restore` calls made with an empty stack
    pub fn unbalanced_restores(&self) -> usize {
        self.unbalanced_restores
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Map a point through the current transform
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let [a, b, c, d, e, f] = self.state.transform;
        Vec2::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    fn multiply(&mut self, m: Affine) {
        let [a, b, c, d, e, f] = self.state.transform;
        let [ma, mb, mc, md, me, mf] = m;
        self.state.transform = [
            a * ma + c * mb,
            b * ma + d * mb,
            a * mc + c * md,
            b * mc + d * md,
            a * me + c * mf + e,
            b * me + d * mf + f,
        ];
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => {
                self.unbalanced_restores += 1;
                log::warn!("restore() called with an empty save stack");
            }
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.multiply([1.0, 0.0, 0.0, 1.0, x, y]);
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        let (s, c) = radians.sin_cos();
        self.multiply([c, s, -s, c, 0.0, 0.0]);
        self.commands.push(DrawCommand::Rotate(radians));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.multiply([sx, 0.0, 0.0, sy, 0.0, 0.0]);
        self.commands.push(DrawCommand::Scale(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
        self.commands.push(DrawCommand::GlobalAlpha(self.state.alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
        self.commands.push(DrawCommand::Blend(mode));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        self.commands.push(DrawCommand::Arc {
            cx,
            cy,
            radius,
            start,
            end,
        });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self, paint: &Paint) {
        self.commands.push(DrawCommand::Fill(paint.clone()));
    }

    fn stroke(&mut self, paint: &Paint, width: f32) {
        self.commands.push(DrawCommand::Stroke(paint.clone(), width));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            paint: paint.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, paint: &Paint) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            size,
            align,
            paint: paint.clone(),
        });
    }

    fn draw_image(&mut self, image: &str, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::DrawImage {
            image: image.to_string(),
            x,
            y,
            w,
            h,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_restore_tracks_state() {
        let mut s = RecordingSurface::new(100, 100);
        s.save();
        s.translate(10.0, 5.0);
        s.set_global_alpha(0.5);
        assert_eq!(s.depth(), 1);
        assert_eq!(s.transform_point(Vec2::ZERO), Vec2::new(10.0, 5.0));

        s.restore();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.transform_point(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(s.global_alpha(), 1.0);
    }

    #[test]
    fn test_scale_then_translate_uses_scaled_units() {
        let mut s = RecordingSurface::new(100, 100);
        s.scale(2.0, 2.0);
        s.translate(-10.0, 0.0);
        let p = s.transform_point(Vec2::new(10.0, 3.0));
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.y - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_unbalanced_restore_is_counted() {
        let mut s = RecordingSurface::new(10, 10);
        s.restore();
        assert_eq!(s.unbalanced_restores(), 1);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_fill_polygon_needs_two_points() {
        let mut s = RecordingSurface::new(10, 10);
        let paint = Paint::Solid(Color::WHITE);
        s.fill_polygon(&[Vec2::ZERO], &paint);
        assert!(s.commands().is_empty());

        s.fill_polygon(&[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ONE], &paint);
        assert_eq!(s.count(|c| matches!(c, DrawCommand::LineTo(..))), 2);
        assert_eq!(s.count(|c| matches!(c, DrawCommand::Fill(_))), 1);
    }

    #[test]
    fn test_fill_text_records_paint() {
        let mut s = RecordingSurface::new(10, 10);
        let paint = Paint::Solid(Color::RED);
        s.fill_text("hi", 1.0, 2.0, 12.0, TextAlign::Center, &paint);
        assert_eq!(
            s.commands(),
            &[DrawCommand::FillText {
                text: "hi".to_string(),
                x: 1.0,
                y: 2.0,
                size: 12.0,
                align: TextAlign::Center,
                paint,
            }]
        );
    }
}
