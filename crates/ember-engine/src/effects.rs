//! Effects layer: reacts to gameplay events with particles, sound, camera
//! shake and leaderboard submissions

use crate::capabilities::ScoreSubmission;
use crate::context::GameContext;
use ember_core::Result;
use ember_particles::EmitSpec;
use ember_runtime::{EventBus, GameEvent, Subscription, System};
use std::cell::RefCell;
use std::rc::Rc;

/// Collects effect-worthy events from the bus as they are published and
/// plays them out on its next update.
pub struct EffectsSystem {
    queue: Rc<RefCell<Vec<GameEvent>>>,
    subscriptions: Vec<Subscription>,
    /// Board that final scores are submitted to
    pub leaderboard_id: String,
    /// Sound played for every explosion
    pub explosion_sound: String,
    /// Camera shake per unit of explosion intensity
    pub shake_per_intensity: f32,
}

impl EffectsSystem {
    pub fn new(events: &EventBus<GameEvent>) -> Self {
        let queue = Rc::new(RefCell::new(Vec::new()));
        let subscriptions = [GameEvent::EXPLOSION, GameEvent::SOUND, GameEvent::GAME_OVER]
            .into_iter()
            .map(|name| {
                let queue = Rc::clone(&queue);
                events.on(name, move |event: &GameEvent| {
                    queue.borrow_mut().push(event.clone());
                })
            })
            .collect();

        Self {
            queue,
            subscriptions,
            leaderboard_id: "default".to_string(),
            explosion_sound: "explosion".to_string(),
            shake_per_intensity: 6.0,
        }
    }

    pub fn with_leaderboard(mut self, leaderboard_id: impl Into<String>) -> Self {
        self.leaderboard_id = leaderboard_id.into();
        self
    }

    /// Events received but not yet played
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn play(&self, event: GameEvent, ctx: &mut GameContext) {
        match event {
            GameEvent::Explosion {
                position,
                intensity,
            } => {
                ctx.particles.emit(&EmitSpec::explosion(position, intensity));
                ctx.camera
                    .shake(self.shake_per_intensity * intensity.max(0.0), 0.3);
                let volume = (0.5 + 0.5 * intensity).clamp(0.0, 1.0);
                if let Err(e) = ctx.audio.play_sound(&self.explosion_sound, volume) {
                    log::warn!("explosion sound failed: {e}");
                }
            }
            GameEvent::Sound { name, volume } => {
                if let Err(e) = ctx.audio.play_sound(&name, volume) {
                    log::warn!("sound '{name}' failed: {e}");
                }
            }
            GameEvent::GameOver { score } => {
                let submission = ScoreSubmission {
                    leaderboard_id: self.leaderboard_id.clone(),
                    score,
                };
                match ctx.leaderboard.submit_score(&submission) {
                    Ok(()) => log::info!("submitted score {score} to '{}'", self.leaderboard_id),
                    Err(e) => log::warn!("score submission rejected: {e}"),
                }
            }
            _ => {}
        }
    }
}

impl System<GameContext> for EffectsSystem {
    fn name(&self) -> &str {
        "effects"
    }

    fn update(&mut self, ctx: &mut GameContext, _dt: f32) -> Result<()> {
        let events = std::mem::take(&mut *self.queue.borrow_mut());
        for event in events {
            self.play(event, ctx);
        }
        Ok(())
    }
}

impl Drop for EffectsSystem {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}
