//! Ember Render - 2D drawing surface contract and camera
//!
//! Drawing backends live outside the runtime. This crate defines what the
//! runtime expects from them:
//! - `Surface` - immediate-mode 2D surface with a save/restore transform stack
//! - `Paint`, `BlendMode` - fill styles and compositing
//! - `RecordingSurface` - headless surface that records draw commands
//! - `Camera` - 2D view transform with follow/clamp against a world boundary

mod camera;
mod recording;
mod surface;

pub use camera::Camera;
pub use recording::{DrawCommand, RecordingSurface};
pub use surface::{BlendMode, GradientStop, Paint, Surface, TextAlign};
