//! Ember Runtime - Game loop infrastructure
//!
//! Provides the core game loop building blocks:
//! - `Timer` - per-frame delta time, game time and a windowed FPS estimate
//! - `EventBus` - named publish/subscribe hub, reentrant-safe emission
//! - `SystemManager` - ordered collection of systems ticked every frame
//! - `StateMachine` - named game states with enter/exit hooks
//! - `InputState` - keyboard and mouse state with action bindings

mod event;
mod event_bus;
mod input;
mod state;
mod system;
mod timer;

pub use event::GameEvent;
pub use event_bus::{EventBus, HandlerId, Subscription};
pub use input::{InputEvent, InputState};
pub use state::{GameState, StateMachine};
pub use system::{Render, System, SystemId, SystemManager};
pub use timer::Timer;
