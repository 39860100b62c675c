//! Shared per-frame context handed to states, systems and entities

use crate::capabilities::{AudioPlayer, Leaderboard, SilentAudio, UnavailableLeaderboard};
use crate::config::EngineConfig;
use crate::entity::Entity;
use ember_core::Vec2;
use ember_particles::ParticleSystem;
use ember_render::Camera;
use ember_runtime::{EventBus, GameEvent, InputState};

/// Everything gameplay code may touch during a frame.
///
/// Structural changes that would disturb the frame in progress (switching
/// state, adding entities, stopping the loop) are queued here and applied
/// once the frame's update has finished.
pub struct GameContext {
    pub input: InputState,
    pub camera: Camera,
    pub particles: ParticleSystem,
    pub events: EventBus<GameEvent>,
    pub audio: Box<dyn AudioPlayer>,
    pub leaderboard: Box<dyn Leaderboard>,
    /// Surface size in pixels
    pub screen_size: Vec2,
    /// World bounds for camera clamping
    pub world_size: Vec2,

    time: f64,
    fps: f64,
    frame: u64,
    pending_state: Option<String>,
    spawned: Vec<Box<dyn Entity>>,
    stop_requested: bool,
}

impl GameContext {
    pub fn new(config: &EngineConfig) -> Self {
        let mut input = InputState::new();
        input.bind_actions(&config.actions);
        Self {
            input,
            camera: Camera::new(),
            particles: ParticleSystem::with_capacity(config.max_particles),
            events: EventBus::new(),
            audio: Box::new(SilentAudio),
            leaderboard: Box::new(UnavailableLeaderboard),
            screen_size: config.screen_size(),
            world_size: config.world_size(),
            time: 0.0,
            fps: 0.0,
            frame: 0,
            pending_state: None,
            spawned: Vec::new(),
            stop_requested: false,
        }
    }

    /// Re-apply sizes, particle capacity and bindings from `config`.
    /// Event handlers and capabilities are kept.
    pub(crate) fn configure(&mut self, config: &EngineConfig) {
        self.screen_size = config.screen_size();
        self.world_size = config.world_size();
        if self.particles.capacity() != config.max_particles {
            self.particles = ParticleSystem::with_capacity(config.max_particles);
        }
        self.input.bind_actions(&config.actions);
    }

    pub fn with_audio(mut self, audio: impl AudioPlayer + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_leaderboard(mut self, leaderboard: impl Leaderboard + 'static) -> Self {
        self.leaderboard = Box::new(leaderboard);
        self
    }

    /// Accumulated game time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Smoothed frames per second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) fn set_clock(&mut self, time: f64, fps: f64, frame: u64) {
        self.time = time;
        self.fps = fps;
        self.frame = frame;
    }

    /// Switch to `name` once this frame's update is done. The last request wins.
    pub fn request_state(&mut self, name: impl Into<String>) {
        self.pending_state = Some(name.into());
    }

    pub fn pending_state(&self) -> Option<&str> {
        self.pending_state.as_deref()
    }

    pub(crate) fn take_pending_state(&mut self) -> Option<String> {
        self.pending_state.take()
    }

    /// Add an entity to the scene at the end of this frame
    pub fn spawn(&mut self, entity: impl Entity + 'static) {
        self.spawned.push(Box::new(entity));
    }

    pub(crate) fn take_spawned(&mut self) -> Vec<Box<dyn Entity>> {
        std::mem::take(&mut self.spawned)
    }

    /// Ask the engine to stop after the current frame
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub(crate) fn clear_stop_request(&mut self) {
        self.stop_requested = false;
    }

    /// Center the camera on `target`, clamped to the world bounds
    pub fn follow_camera(&mut self, target: Vec2) {
        self.camera.follow(target, self.screen_size, self.world_size);
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
