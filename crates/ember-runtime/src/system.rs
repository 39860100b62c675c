//! Runtime systems and the ordered manager that ticks them

use ember_core::Result;
use ember_render::Surface;

/// Optional render capability of a [`System`]
pub trait Render<C> {
    fn render(&mut self, surface: &mut dyn Surface, ctx: &C);
}

/// A system ticked once per frame by the game loop.
///
/// `C` is the shared context handed to every system (the engine's game
/// context). Systems that draw return themselves from [`System::as_render`].
pub trait System<C> {
    /// Human-readable name for this system
    fn name(&self) -> &str;

    /// Called once per frame with the frame's delta time in seconds.
    /// An error is logged and the frame carries on with the next system.
    fn update(&mut self, ctx: &mut C, dt: f32) -> Result<()>;

    /// Render capability, if this system draws
    fn as_render(&mut self) -> Option<&mut dyn Render<C>> {
        None
    }
}

/// Identity of a registered system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(u64);

struct Entry<C> {
    id: SystemId,
    order: i32,
    system: Box<dyn System<C>>,
}

/// Systems kept sorted by `order` (lower runs first, ties in insertion order)
pub struct SystemManager<C> {
    entries: Vec<Entry<C>>,
    next_id: u64,
}

impl<C> Default for SystemManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SystemManager<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a system at `order` and return its identity
    pub fn add(&mut self, system: impl System<C> + 'static, order: i32) -> SystemId {
        self.add_boxed(Box::new(system), order)
    }

    pub fn add_boxed(&mut self, system: Box<dyn System<C>>, order: i32) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        log::debug!("registering system '{}' at order {order}", system.name());
        self.entries.push(Entry { id, order, system });
        // stable sort keeps insertion order among equal orders
        self.entries.sort_by_key(|e| e.order);
        id
    }

    /// Builder-style registration for chaining
    pub fn with_system(mut self, system: impl System<C> + 'static, order: i32) -> Self {
        self.add(system, order);
        self
    }

    /// Remove a system by identity. Returns false if it was not registered.
    pub fn remove(&mut self, id: SystemId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                log::debug!("removed system '{}'", entry.system.name());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: SystemId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// System names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.system.name()).collect()
    }

    /// Update every system in order
    pub fn update(&mut self, ctx: &mut C, dt: f32) {
        for entry in &mut self.entries {
            if let Err(e) = entry.system.update(ctx, dt) {
                log::warn!("system '{}' update failed: {e}", entry.system.name());
            }
        }
    }

    /// Render the systems that can render, in update order
    pub fn render(&mut self, surface: &mut dyn Surface, ctx: &C) {
        for entry in &mut self.entries {
            if let Some(renderer) = entry.system.as_render() {
                renderer.render(surface, ctx);
            }
        }
    }
}
