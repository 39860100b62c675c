//! The engine: owns the host, the surface, the timer and the scene, and
//! drives the frame sequence.

use crate::config::EngineConfig;
use crate::host::Host;
use crate::scene::Scene;
use ember_core::{Color, EmberError, Result};
use ember_render::{Paint, Surface, TextAlign};
use ember_runtime::Timer;

/// Extension points for a concrete game
pub trait Game {
    /// Called once from [`Engine::init`], after the surface is mounted
    fn on_init(&mut self, _scene: &mut Scene) -> Result<()> {
        Ok(())
    }

    /// Called every frame before the scene steps
    fn update(&mut self, _scene: &mut Scene, _dt: f32) {}

    /// Called every frame after the scene is drawn, in screen space
    fn render(&mut self, _surface: &mut dyn Surface, _scene: &Scene) {}
}

/// A game that leaves everything to the scene
impl Game for () {}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Initialized,
    Running,
    Stopped,
}

/// Single-threaded frame loop over a [`Host`]
pub struct Engine<H: Host, G: Game> {
    host: H,
    game: G,
    config: EngineConfig,
    surface: Option<H::Surface>,
    timer: Timer,
    scene: Scene,
    phase: Phase,
}

impl<H: Host, G: Game> Engine<H, G> {
    pub fn new(host: H, game: G) -> Self {
        Self {
            host,
            game,
            config: EngineConfig::default(),
            surface: None,
            timer: Timer::new(),
            scene: Scene::default(),
            phase: Phase::Constructed,
        }
    }

    /// Mount the surface, size the scene, attach input and run `on_init`.
    ///
    /// Any failure leaves the engine unable to start.
    pub fn init(&mut self, config: EngineConfig) -> Result<()> {
        if self.phase == Phase::Running {
            return Err(EmberError::AlreadyRunning);
        }
        config.validate()?;

        let surface = self
            .host
            .mount(&config.selector, config.width, config.height)?;
        self.surface = Some(surface);
        self.scene.ctx.configure(&config);
        self.config = config;

        self.host.attach_input();
        if let Err(e) = self.game.on_init(&mut self.scene) {
            self.host.detach_input();
            self.surface = None;
            self.phase = Phase::Constructed;
            return Err(e);
        }

        self.phase = Phase::Initialized;
        log::info!(
            "engine initialized: {}x{} at '{}'",
            self.config.width,
            self.config.height,
            self.config.selector
        );
        Ok(())
    }

    /// Begin the frame loop by scheduling the first frame
    pub fn start(&mut self) -> Result<()> {
        match self.phase {
            Phase::Running => return Err(EmberError::AlreadyRunning),
            Phase::Constructed => return Err(EmberError::NotInitialized),
            Phase::Initialized | Phase::Stopped => {}
        }
        if self.phase == Phase::Stopped {
            self.host.attach_input();
        }
        self.timer.reset();
        self.scene.ctx.clear_stop_request();
        self.phase = Phase::Running;
        self.host.request_frame();
        log::info!("engine started");
        Ok(())
    }

    /// Start (if needed) and run frames until the engine stops or the host
    /// stops handing out frames
    pub fn run(&mut self) -> Result<()> {
        if self.phase != Phase::Running {
            self.start()?;
        }
        while self.phase == Phase::Running {
            match self.host.next_frame() {
                Some(now) => self.frame(now),
                None => {
                    log::info!("host has no more frames");
                    self.stop();
                }
            }
        }
        Ok(())
    }

    /// Run one frame stamped `now` (seconds). Ignored unless running.
    pub fn frame(&mut self, now: f64) {
        if self.phase != Phase::Running {
            return;
        }

        for event in self.host.poll_input() {
            self.scene.ctx.input.apply(&event);
        }

        let dt = self.timer.tick(now) as f32;
        self.scene.ctx.set_clock(
            self.timer.game_time(),
            self.timer.fps(),
            self.timer.frame_count(),
        );

        self.game.update(&mut self.scene, dt);
        self.scene.update(dt);
        self.render();

        if self.scene.ctx.stop_requested() {
            self.stop();
        } else {
            self.host.request_frame();
        }
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        surface.clear(self.config.background_color);
        self.scene.render_world(surface);
        self.scene.render_ui(surface);
        self.game.render(surface, &self.scene);
        if self.config.show_fps {
            draw_fps(surface, self.timer.fps());
        }

        self.host.present(surface);
    }

    /// Cancel the scheduled frame and detach input. No further frames run.
    pub fn stop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.host.cancel_frame();
        self.host.detach_input();
        self.scene.ctx.input.release_all();
        self.phase = Phase::Stopped;
        log::info!(
            "engine stopped after {} frame(s), {:.2}s game time",
            self.timer.frame_count(),
            self.timer.game_time()
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn fps(&self) -> f64 {
        self.timer.fps()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> Option<&H::Surface> {
        self.surface.as_ref()
    }
}

fn draw_fps(surface: &mut dyn Surface, fps: f64) {
    surface.save();
    surface.set_global_alpha(1.0);
    surface.fill_text(
        &format!("FPS: {fps:.0}"),
        10.0,
        20.0,
        14.0,
        TextAlign::Left,
        &Paint::Solid(Color::WHITE),
    );
    surface.restore();
}

impl<H: Host, G: Game> Drop for Engine<H, G> {
    fn drop(&mut self) {
        self.stop();
    }
}
