//! Attract mode: a self-playing session that cycles menu -> playing -> game_over

use ember_core::{Color, Result, Vec2};
use ember_engine::{EffectsSystem, Entity, Game, GameContext, Scene};
use ember_particles::rand::ParticleRng;
use ember_particles::{EmitSpec, Emitter, EmitterId};
use ember_render::{Paint, Surface, TextAlign};
use ember_runtime::{EventBus, GameEvent, GameState, Render, Subscription, System};
use std::cell::Cell;
use std::rc::Rc;

pub const MENU: &str = "menu";
pub const PLAYING: &str = "playing";
pub const GAME_OVER: &str = "game_over";

/// Board attract-mode scores are submitted to
pub const LEADERBOARD: &str = "attract";

/// The attract-mode game
pub struct Attract {
    /// Seconds of play per run
    pub round_length: f32,
}

impl Default for Attract {
    fn default() -> Self {
        Self { round_length: 6.0 }
    }
}

impl Game for Attract {
    fn on_init(&mut self, scene: &mut Scene) -> Result<()> {
        if let Err(e) = scene.ctx.leaderboard.authenticate() {
            log::warn!("leaderboard sign-in failed, scores stay local: {e}");
        }

        let effects = EffectsSystem::new(&scene.ctx.events).with_leaderboard(LEADERBOARD);
        scene.add_system(Starfield::new(scene.ctx.world_size, 150), 0);
        scene.add_system(effects, 100);

        scene.add_state(Menu::default());
        scene.add_state(Playing::new(self.round_length));
        scene.add_state(GameOver::new(&scene.ctx.events));
        scene.set_state(MENU)
    }
}

/// Title screen. Starts a run on `confirm`, or by itself after a short wait.
#[derive(Default)]
struct Menu {
    idle: f32,
}

impl GameState<GameContext> for Menu {
    fn name(&self) -> &str {
        MENU
    }

    fn enter(&mut self, _prev: Option<&str>, ctx: &mut GameContext) {
        self.idle = 0.0;
        ctx.camera.set_position(0.0, 0.0);
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> Result<()> {
        self.idle += dt;
        if self.idle >= 1.5 || ctx.input.is_action_down("confirm") {
            ctx.request_state(PLAYING);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut dyn Surface, ctx: &GameContext) {
        let center = ctx.screen_size * 0.5;
        surface.fill_text(
            "EMBER",
            center.x,
            center.y,
            48.0,
            TextAlign::Center,
            &Paint::Solid(Color::from_hex(0xFF8844)),
        );
        surface.fill_text(
            "press enter",
            center.x,
            center.y + 40.0,
            16.0,
            TextAlign::Center,
            &Paint::Solid(Color::WHITE),
        );
    }
}

/// One timed run: rocks drift in and burst, the drone tours the world
struct Playing {
    round_length: f32,
    elapsed: f32,
    spawn_timer: f32,
    rng: ParticleRng,
    score: Rc<Cell<i64>>,
    /// Cleared when the run ends; entities of the run die with it
    run_alive: Rc<Cell<bool>>,
    score_subscription: Option<Subscription>,
}

impl Playing {
    fn new(round_length: f32) -> Self {
        Self {
            round_length,
            elapsed: 0.0,
            spawn_timer: 0.0,
            rng: ParticleRng::new(0x5EED),
            score: Rc::new(Cell::new(0)),
            run_alive: Rc::new(Cell::new(false)),
            score_subscription: None,
        }
    }

    fn spawn_rock(&mut self, ctx: &mut GameContext) {
        let world = ctx.world_size;
        let position = Vec2::new(self.rng.range(0.0, world.x), self.rng.range(0.0, world.y));
        let velocity = Vec2::from_angle(self.rng.range(0.0, std::f32::consts::TAU))
            * self.rng.range(20.0, 60.0);
        ctx.spawn(Rock {
            position,
            velocity,
            radius: self.rng.range(8.0, 24.0),
            fuse: self.rng.range(0.5, 2.0),
            run_alive: Rc::clone(&self.run_alive),
            burst: false,
        });
    }
}

impl GameState<GameContext> for Playing {
    fn name(&self) -> &str {
        PLAYING
    }

    fn enter(&mut self, _prev: Option<&str>, ctx: &mut GameContext) {
        self.elapsed = 0.0;
        self.spawn_timer = 0.0;
        self.score.set(0);
        self.run_alive = Rc::new(Cell::new(true));

        let score = Rc::clone(&self.score);
        self.score_subscription = Some(ctx.events.on(GameEvent::SCORE, move |event| {
            if let GameEvent::Score { points } = event {
                score.set(score.get() + points);
            }
        }));

        let center = ctx.world_size * 0.5;
        ctx.spawn(Drone::new(center, Rc::clone(&self.run_alive)));
    }

    fn exit(&mut self, _next: &str, _ctx: &mut GameContext) {
        self.run_alive.set(false);
        if let Some(subscription) = self.score_subscription.take() {
            subscription.unsubscribe();
        }
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> Result<()> {
        self.elapsed += dt;
        self.spawn_timer -= dt;
        while self.spawn_timer <= 0.0 {
            self.spawn_rock(ctx);
            self.spawn_timer += 0.4;
        }

        if self.elapsed >= self.round_length {
            ctx.events.publish(GameEvent::GameOver {
                score: self.score.get(),
            });
            ctx.request_state(GAME_OVER);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut dyn Surface, ctx: &GameContext) {
        let remaining = (self.round_length - self.elapsed).max(0.0);
        surface.fill_text(
            &format!("SCORE {}", self.score.get()),
            16.0,
            ctx.screen_size.y - 16.0,
            18.0,
            TextAlign::Left,
            &Paint::Solid(Color::WHITE),
        );
        surface.fill_text(
            &format!("{remaining:.1}s"),
            ctx.screen_size.x - 16.0,
            ctx.screen_size.y - 16.0,
            18.0,
            TextAlign::Right,
            &Paint::Solid(Color::YELLOW),
        );
    }
}

/// Shows the final score, then returns to the menu
struct GameOver {
    shown_for: f32,
    /// Set by the `GameOver` event, which is published before the transition
    last_score: Rc<Cell<i64>>,
}

impl GameOver {
    fn new(events: &EventBus<GameEvent>) -> Self {
        let last_score = Rc::new(Cell::new(0));
        let sink = Rc::clone(&last_score);
        events.on(GameEvent::GAME_OVER, move |event| {
            if let GameEvent::GameOver { score } = event {
                sink.set(*score);
            }
        });
        Self {
            shown_for: 0.0,
            last_score,
        }
    }
}

impl GameState<GameContext> for GameOver {
    fn name(&self) -> &str {
        GAME_OVER
    }

    fn enter(&mut self, prev: Option<&str>, _ctx: &mut GameContext) {
        self.shown_for = 0.0;
        log::info!(
            "run over after '{}' with {} point(s)",
            prev.unwrap_or("<none>"),
            self.last_score.get()
        );
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> Result<()> {
        self.shown_for += dt;
        if self.shown_for >= 2.0 {
            ctx.request_state(MENU);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut dyn Surface, ctx: &GameContext) {
        let center = ctx.screen_size * 0.5;
        surface.fill_text(
            "GAME OVER",
            center.x,
            center.y,
            40.0,
            TextAlign::Center,
            &Paint::Solid(Color::RED),
        );
        surface.fill_text(
            &format!("final score {}", self.last_score.get()),
            center.x,
            center.y + 36.0,
            18.0,
            TextAlign::Center,
            &Paint::Solid(Color::WHITE),
        );
    }
}

/// The camera's subject: bounces around the world leaving an exhaust trail
struct Drone {
    position: Vec2,
    velocity: Vec2,
    thruster: Option<EmitterId>,
    run_alive: Rc<Cell<bool>>,
}

impl Drone {
    fn new(position: Vec2, run_alive: Rc<Cell<bool>>) -> Self {
        Self {
            position,
            velocity: Vec2::new(140.0, 95.0),
            thruster: None,
            run_alive,
        }
    }

    fn heading_degrees(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x).to_degrees()
    }
}

impl Entity for Drone {
    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        if !self.is_alive() {
            if let Some(id) = self.thruster.take() {
                ctx.particles.remove_emitter(id);
            }
            return;
        }

        self.position += self.velocity * dt;
        let world = ctx.world_size;
        if self.position.x < 0.0 || self.position.x > world.x {
            self.velocity.x = -self.velocity.x;
            self.position.x = self.position.x.clamp(0.0, world.x);
        }
        if self.position.y < 0.0 || self.position.y > world.y {
            self.velocity.y = -self.velocity.y;
            self.position.y = self.position.y.clamp(0.0, world.y);
        }

        // exhaust points backwards
        let exhaust = EmitSpec::thruster(self.position, self.heading_degrees() + 180.0);
        match self.thruster {
            Some(id) => {
                if let Some(emitter) = ctx.particles.emitter_mut(id) {
                    emitter.spec = exhaust;
                }
            }
            None => self.thruster = Some(ctx.particles.add_emitter(Emitter::new(exhaust, 60.0))),
        }

        ctx.follow_camera(self.position);
    }

    fn render(&self, surface: &mut dyn Surface) {
        let forward = self.velocity.normalized();
        let side = Vec2::new(-forward.y, forward.x);
        let nose = self.position + forward * 14.0;
        let left = self.position - forward * 8.0 + side * 8.0;
        let right = self.position - forward * 8.0 - side * 8.0;
        surface.fill_polygon(&[nose, left, right], &Paint::Solid(Color::from_hex(0x66CCFF)));
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.run_alive.get()
    }
}

/// Drifting rock that bursts for points when its fuse runs out
struct Rock {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    fuse: f32,
    run_alive: Rc<Cell<bool>>,
    burst: bool,
}

impl Entity for Rock {
    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        if !self.is_alive() {
            return;
        }
        self.position += self.velocity * dt;
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            self.burst = true;
            ctx.events.publish(GameEvent::Explosion {
                position: self.position,
                intensity: self.radius / 16.0,
            });
            ctx.events.publish(GameEvent::Score {
                points: (self.radius.round() as i64).max(1),
            });
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.position, self.radius, &Paint::Solid(Color::rgb(0.55, 0.5, 0.45)));
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_alive(&self) -> bool {
        !self.burst && self.run_alive.get()
    }
}

/// Static background stars, drawn in world space
struct Starfield {
    stars: Vec<(Vec2, f32)>,
}

impl Starfield {
    fn new(world: Vec2, count: usize) -> Self {
        let mut rng = ParticleRng::new(0x57A125);
        let stars = (0..count)
            .map(|_| {
                (
                    Vec2::new(rng.range(0.0, world.x), rng.range(0.0, world.y)),
                    rng.range(0.5, 1.5),
                )
            })
            .collect();
        Self { stars }
    }
}

impl System<GameContext> for Starfield {
    fn name(&self) -> &str {
        "starfield"
    }

    fn update(&mut self, _ctx: &mut GameContext, _dt: f32) -> Result<()> {
        Ok(())
    }

    fn as_render(&mut self) -> Option<&mut dyn Render<GameContext>> {
        Some(self)
    }
}

impl Render<GameContext> for Starfield {
    fn render(&mut self, surface: &mut dyn Surface, _ctx: &GameContext) {
        let paint = Paint::Solid(Color::WHITE.with_alpha(0.6));
        for (position, size) in &self.stars {
            surface.fill_rect(position.x, position.y, *size, *size, &paint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_engine::{Engine, EngineConfig, HeadlessHost};

    #[test]
    fn test_session_cycles_through_states() {
        let host = HeadlessHost::new(30.0).with_frame_limit(30 * 12);
        let mut engine = Engine::new(host, Attract { round_length: 3.0 });
        engine.init(EngineConfig::default().with_world_size(1600.0, 1200.0)).unwrap();

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.scene().ctx.events.on(GameEvent::STATE_CHANGED, move |event| {
            if let GameEvent::StateChanged { to, .. } = event {
                sink.borrow_mut().push(to.clone());
            }
        });

        engine.run().unwrap();
        let seen = seen.borrow();
        assert!(seen.len() >= 3);
        assert_eq!(&seen[..3], &[PLAYING, GAME_OVER, MENU]);
    }

    #[test]
    fn test_run_ends_its_entities() {
        let mut scene = Scene::default();
        Attract { round_length: 0.5 }.on_init(&mut scene).unwrap();
        scene.set_state(PLAYING).unwrap();
        scene.update(0.1);
        assert!(scene.entity_count() >= 2);

        scene.set_state(GAME_OVER).unwrap();
        scene.update(0.1);
        assert_eq!(scene.entity_count(), 0);
    }
}
