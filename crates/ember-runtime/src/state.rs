//! Game state machine - named states with enter/exit hooks.
//!
//! Exactly one state is active at a time (or none, before the first
//! [`StateMachine::set`]). The active state receives `update`/`render`.

use ember_core::{EmberError, Result};
use ember_render::Surface;
use std::collections::HashMap;

/// A named game state (menu, playing, paused, game over, ...)
pub trait GameState<C> {
    /// Unique key of this state
    fn name(&self) -> &str;

    /// Called when this state becomes active. `prev` is the outgoing state, if any.
    fn enter(&mut self, _prev: Option<&str>, _ctx: &mut C) {}

    /// Called when this state is replaced by `next`
    fn exit(&mut self, _next: &str, _ctx: &mut C) {}

    fn update(&mut self, ctx: &mut C, dt: f32) -> Result<()>;

    fn render(&mut self, surface: &mut dyn Surface, ctx: &C);
}

/// Flat state machine over named [`GameState`]s
pub struct StateMachine<C> {
    states: HashMap<String, Box<dyn GameState<C>>>,
    /// Name of the active state; looked up in `states`, never owned separately
    current: Option<String>,
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StateMachine<C> {
    /// Creates an empty state machine with no active state
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }

    /// Register a state, replacing any state with the same name.
    /// Replacing the active state swaps the instance without firing hooks.
    pub fn add(&mut self, state: impl GameState<C> + 'static) {
        self.add_boxed(Box::new(state));
    }

    pub fn add_boxed(&mut self, state: Box<dyn GameState<C>>) {
        let name = state.name().to_string();
        if self.states.insert(name.clone(), state).is_some() {
            log::debug!("replaced state '{name}'");
        }
    }

    /// Switch to the state registered as `name`.
    ///
    /// Fails with [`EmberError::StateNotFound`] (leaving the current state
    /// untouched) if `name` is unknown. Switching to the active state is a
    /// no-op. Otherwise calls `exit(next)` on the outgoing state, makes `name`
    /// current, then calls `enter(prev)` on it.
    pub fn set(&mut self, name: &str, ctx: &mut C) -> Result<()> {
        if !self.states.contains_key(name) {
            return Err(EmberError::StateNotFound(name.to_string()));
        }
        if self.current.as_deref() == Some(name) {
            return Ok(());
        }

        let prev = self.current.take();
        if let Some(outgoing) = prev.as_deref().and_then(|p| self.states.get_mut(p)) {
            outgoing.exit(name, ctx);
        }

        self.current = Some(name.to_string());
        if let Some(incoming) = self.states.get_mut(name) {
            incoming.enter(prev.as_deref(), ctx);
        }

        log::info!(
            "state: {} -> {name}",
            prev.as_deref().unwrap_or("<none>")
        );
        Ok(())
    }

    /// Name of the active state
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn has(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Registered state names, sorted
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Update the active state. No-op without one.
    pub fn update(&mut self, ctx: &mut C, dt: f32) -> Result<()> {
        match self.active_mut() {
            Some(state) => state.update(ctx, dt),
            None => Ok(()),
        }
    }

    /// Render the active state. No-op without one.
    pub fn render(&mut self, surface: &mut dyn Surface, ctx: &C) {
        if let Some(state) = self.active_mut() {
            state.render(surface, ctx);
        }
    }

    fn active_mut(&mut self) -> Option<&mut Box<dyn GameState<C>>> {
        let name = self.current.as_deref()?;
        self.states.get_mut(name)
    }
}
