//! Ember Core - Foundational types for the Ember 2D runtime
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `Vec2` - 2D vectors for positions, velocities and sizes
//! - `Color` - RGBA colors with linear interpolation
//! - Error types and Result alias

mod error;
mod types;

pub use error::{EmberError, Result};
pub use types::{Color, Vec2};
