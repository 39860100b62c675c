//! Ember Engine - the frame loop and everything it owns
//!
//! Ties the runtime pieces into a playable loop:
//! - `Engine` - init/start/stop lifecycle and the per-frame update/render sequence
//! - `Host` - mount target, frame scheduling and input delivery (headless or paced)
//! - `Scene` - entities, systems and game states sharing one `GameContext`
//! - `EngineConfig` - TOML-loadable engine options
//! - `EffectsSystem` - turns gameplay events into particles, sound and scores

mod capabilities;
mod config;
mod context;
mod effects;
mod engine;
mod entity;
mod host;
mod scene;

pub use capabilities::{
    AudioPlayer, Leaderboard, MemoryLeaderboard, ScoreSubmission, SilentAudio,
    UnavailableLeaderboard,
};
pub use config::EngineConfig;
pub use context::GameContext;
pub use effects::EffectsSystem;
pub use engine::{Engine, Game, Phase};
pub use entity::Entity;
pub use host::{HeadlessHost, Host, PacedHost};
pub use scene::Scene;
