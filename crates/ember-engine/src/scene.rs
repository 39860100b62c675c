//! Scene: entities, systems and game states sharing one context

use crate::context::GameContext;
use crate::entity::Entity;
use ember_core::Result;
use ember_render::Surface;
use ember_runtime::{GameEvent, GameState, StateMachine, System, SystemId, SystemManager};

/// Everything the engine updates and draws each frame
pub struct Scene {
    pub ctx: GameContext,
    pub systems: SystemManager<GameContext>,
    pub states: StateMachine<GameContext>,
    entities: Vec<Box<dyn Entity>>,
}

impl Scene {
    pub fn new(ctx: GameContext) -> Self {
        Self {
            ctx,
            systems: SystemManager::new(),
            states: StateMachine::new(),
            entities: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, entity: impl Entity + 'static) {
        self.entities.push(Box::new(entity));
    }

    pub fn entities(&self) -> &[Box<dyn Entity>] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    pub fn add_system(&mut self, system: impl System<GameContext> + 'static, order: i32) -> SystemId {
        self.systems.add(system, order)
    }

    pub fn add_state(&mut self, state: impl GameState<GameContext> + 'static) {
        self.states.add(state);
    }

    pub fn current_state(&self) -> Option<&str> {
        self.states.current()
    }

    /// Switch state now and publish [`GameEvent::StateChanged`] if it changed
    pub fn set_state(&mut self, name: &str) -> Result<()> {
        let from = self.states.current().map(str::to_string);
        self.states.set(name, &mut self.ctx)?;
        if from.as_deref() != Some(name) {
            self.ctx.events.publish(GameEvent::StateChanged {
                from,
                to: name.to_string(),
            });
        }
        Ok(())
    }

    /// One simulation step: state, systems, entities, camera, particles,
    /// then the structural changes queued during the step.
    pub fn update(&mut self, dt: f32) {
        if let Err(e) = self.states.update(&mut self.ctx, dt) {
            let state = self.states.current().unwrap_or("<none>");
            log::warn!("state '{state}' update failed: {e}");
        }

        self.systems.update(&mut self.ctx, dt);

        for entity in &mut self.entities {
            entity.update(dt, &mut self.ctx);
        }

        self.ctx.camera.update(dt);
        self.ctx.particles.update(dt);

        self.flush();
    }

    /// Apply queued spawns, removals and state transitions
    fn flush(&mut self) {
        self.entities.retain(|e| e.is_alive());
        let spawned = self.ctx.take_spawned();
        if !spawned.is_empty() {
            log::debug!("spawned {} entit(ies)", spawned.len());
            self.entities.extend(spawned);
        }

        if let Some(name) = self.ctx.take_pending_state() {
            if let Err(e) = self.set_state(&name) {
                log::warn!("requested transition failed: {e}");
            }
        }
    }

    /// World pass: everything drawn through the camera
    pub fn render_world(&mut self, surface: &mut dyn Surface) {
        self.ctx.camera.apply(surface);
        for entity in &self.entities {
            entity.render(surface);
        }
        self.ctx.particles.render(surface);
        self.systems.render(surface, &self.ctx);
        self.ctx.camera.unapply(surface);
    }

    /// Screen pass: the active state's UI on top of the world
    pub fn render_ui(&mut self, surface: &mut dyn Surface) {
        self.states.render(surface, &self.ctx);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(GameContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{Color, EmberError, Vec2};
    use ember_render::{DrawCommand, Paint, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Mover {
        position: Vec2,
        velocity: Vec2,
        ttl: f32,
    }

    impl Entity for Mover {
        fn update(&mut self, dt: f32, _ctx: &mut GameContext) {
            self.position += self.velocity * dt;
            self.ttl -= dt;
        }

        fn render(&self, surface: &mut dyn Surface) {
            surface.fill_rect(self.position.x, self.position.y, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        }

        fn position(&self) -> Vec2 {
            self.position
        }

        fn is_alive(&self) -> bool {
            self.ttl > 0.0
        }
    }

    struct Spawner;

    impl Entity for Spawner {
        fn update(&mut self, _dt: f32, ctx: &mut GameContext) {
            ctx.spawn(Mover {
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                ttl: 1.0,
            });
        }

        fn render(&self, _surface: &mut dyn Surface) {}

        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    struct Named {
        name: &'static str,
        next: Option<&'static str>,
    }

    impl GameState<GameContext> for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn update(&mut self, ctx: &mut GameContext, _dt: f32) -> Result<()> {
            if let Some(next) = self.next {
                ctx.request_state(next);
            }
            Ok(())
        }

        fn render(&mut self, _surface: &mut dyn Surface, _ctx: &GameContext) {}
    }

    fn record_transitions(scene: &Scene) -> Rc<RefCell<Vec<(Option<String>, String)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        scene.ctx.events.on(GameEvent::STATE_CHANGED, move |event| {
            if let GameEvent::StateChanged { from, to } = event {
                sink.borrow_mut().push((from.clone(), to.clone()));
            }
        });
        seen
    }

    #[test]
    fn test_entities_move_and_expire() {
        let mut scene = Scene::default();
        scene.add_entity(Mover {
            position: Vec2::ZERO,
            velocity: Vec2::new(10.0, 0.0),
            ttl: 0.3,
        });

        scene.update(0.2);
        assert_eq!(scene.entity_count(), 1);
        assert!((scene.entities()[0].position().x - 2.0).abs() < 1e-5);

        scene.update(0.2);
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn test_spawns_land_after_the_frame() {
        let mut scene = Scene::default();
        scene.add_entity(Spawner);
        scene.update(0.1);
        assert_eq!(scene.entity_count(), 2);
        scene.update(0.1);
        assert_eq!(scene.entity_count(), 3);
    }

    #[test]
    fn test_set_state_publishes_changes_once() {
        let mut scene = Scene::default();
        scene.add_state(Named { name: "menu", next: None });
        let seen = record_transitions(&scene);

        scene.set_state("menu").unwrap();
        scene.set_state("menu").unwrap();
        assert_eq!(*seen.borrow(), vec![(None, "menu".to_string())]);
    }

    #[test]
    fn test_unknown_state_keeps_current() {
        let mut scene = Scene::default();
        scene.add_state(Named { name: "menu", next: None });
        scene.set_state("menu").unwrap();

        let err = scene.set_state("playing").unwrap_err();
        assert!(matches!(err, EmberError::StateNotFound(_)));
        assert_eq!(scene.current_state(), Some("menu"));
    }

    #[test]
    fn test_requested_transition_applies_after_update() {
        let mut scene = Scene::default();
        scene.add_state(Named { name: "menu", next: Some("playing") });
        scene.add_state(Named { name: "playing", next: None });
        scene.set_state("menu").unwrap();
        let seen = record_transitions(&scene);

        scene.update(0.016);
        assert_eq!(scene.current_state(), Some("playing"));
        assert_eq!(
            *seen.borrow(),
            vec![(Some("menu".to_string()), "playing".to_string())]
        );
    }

    #[test]
    fn test_bad_request_is_logged_not_fatal() {
        let mut scene = Scene::default();
        scene.add_state(Named { name: "menu", next: Some("missing") });
        scene.set_state("menu").unwrap();
        scene.update(0.016);
        assert_eq!(scene.current_state(), Some("menu"));
    }

    #[test]
    fn test_world_pass_is_balanced() {
        let mut scene = Scene::default();
        scene.ctx.camera.set_position(100.0, 50.0);
        scene.add_entity(Mover {
            position: Vec2::new(120.0, 60.0),
            velocity: Vec2::ZERO,
            ttl: 1.0,
        });

        let mut surface = RecordingSurface::new(800, 600);
        scene.render_world(&mut surface);
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::FillRect { .. })), 1);
        assert_eq!(surface.commands().first(), Some(&DrawCommand::Save));
    }
}
