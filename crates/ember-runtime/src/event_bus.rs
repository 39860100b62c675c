//! Event bus: named publish/subscribe hub with synchronous, reentrant-safe emission

use crate::event::GameEvent;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Identifies one registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<P> = Rc<dyn Fn(&P)>;

struct Listener<P> {
    id: HandlerId,
    handler: Handler<P>,
    /// Cleared on removal so an in-flight emission skips it
    active: Rc<Cell<bool>>,
}

struct Registry<P> {
    listeners: HashMap<String, Vec<Listener<P>>>,
    next_id: u64,
}

impl<P> Registry<P> {
    fn remove(&mut self, event: &str, id: HandlerId) -> bool {
        let Some(list) = self.listeners.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(|l| l.id == id) else {
            return false;
        };
        let listener = list.remove(index);
        listener.active.set(false);
        if list.is_empty() {
            self.listeners.remove(event);
        }
        true
    }
}

/// Publish/subscribe hub keyed by event name.
///
/// Cloning an `EventBus` yields another handle to the same listener map, so
/// handlers can capture a clone and call `on`/`off`/`emit` from inside an
/// emission. `emit` iterates a snapshot taken at emission start: handlers
/// added during the emission wait for the next one, handlers removed during
/// it are skipped if they have not run yet.
pub struct EventBus<P> {
    registry: Rc<RefCell<Registry<P>>>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> EventBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                listeners: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `handler` under `event`. The returned [`Subscription`] removes it again.
    pub fn on(&self, event: &str, handler: impl Fn(&P) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = HandlerId(registry.next_id);
            registry.next_id += 1;
            registry
                .listeners
                .entry(event.to_string())
                .or_default()
                .push(Listener {
                    id,
                    handler: Rc::new(handler),
                    active: Rc::new(Cell::new(true)),
                });
            id
        };

        let weak: Weak<RefCell<Registry<P>>> = Rc::downgrade(&self.registry);
        let key = event.to_string();
        Subscription {
            event: event.to_string(),
            id,
            off: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().remove(&key, id);
                }
            })),
        }
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        self.registry.borrow_mut().remove(event, id)
    }

    /// Invoke every handler registered for `event` with `payload`.
    /// No-op when nothing is registered.
    pub fn emit(&self, event: &str, payload: &P) {
        let snapshot: Vec<(Handler<P>, Rc<Cell<bool>>)> = {
            let registry = self.registry.borrow();
            match registry.listeners.get(event) {
                Some(list) => list
                    .iter()
                    .map(|l| (Rc::clone(&l.handler), Rc::clone(&l.active)))
                    .collect(),
                None => return,
            }
        };

        for (handler, active) in snapshot {
            if active.get() {
                handler(payload);
            }
        }
    }

    /// Remove every handler for every event
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        for list in registry.listeners.values() {
            for listener in list {
                listener.active.set(false);
            }
        }
        registry.listeners.clear();
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Number of event names with at least one handler
    pub fn event_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl EventBus<GameEvent> {
    /// Emit a [`GameEvent`] under its own name
    pub fn publish(&self, event: GameEvent) {
        self.emit(event.name(), &event);
    }
}

/// Handle returned by [`EventBus::on`]. Dropping it keeps the handler registered.
pub struct Subscription {
    event: String,
    id: HandlerId,
    off: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove the handler from its bus. Safe to call after the bus is gone.
    pub fn unsubscribe(mut self) {
        if let Some(off) = self.off.take() {
            off();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&i32) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move |_: &i32| c.set(c.get() + 1))
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let bus: EventBus<i32> = EventBus::new();
        bus.emit("nothing", &1);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn test_handlers_receive_payload() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        bus.on("hit", move |v: &i32| s.borrow_mut().push(*v));

        bus.emit("hit", &3);
        bus.emit("miss", &4);
        bus.emit("hit", &5);
        assert_eq!(*seen.borrow(), vec![3, 5]);
    }

    #[test]
    fn test_off_stops_delivery_and_drops_empty_entry() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        let sub = bus.on("tick", handler);
        assert_eq!(bus.listener_count("tick"), 1);

        bus.emit("tick", &0);
        assert!(bus.off("tick", sub.id()));
        bus.emit("tick", &0);

        assert_eq!(count.get(), 1);
        assert!(!bus.has_listeners("tick"));
        assert_eq!(bus.event_count(), 0);
        assert!(!bus.off("tick", sub.id()));
    }

    #[test]
    fn test_subscription_unsubscribes() {
        let bus = EventBus::new();
        let (count, handler) = counter();
        let sub = bus.on("tick", handler);
        sub.unsubscribe();
        bus.emit("tick", &0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped() {
        let bus: EventBus<i32> = EventBus::new();
        let sub = bus.on("tick", |_| {});
        drop(bus);
        sub.unsubscribe();
    }

    #[test]
    fn test_self_unsubscribe_does_not_affect_others() {
        let bus: EventBus<i32> = EventBus::new();
        let (first, h1) = counter();
        bus.on("e", h1);

        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let once = Rc::new(Cell::new(0));
        let (s, o) = (Rc::clone(&slot), Rc::clone(&once));
        let sub = bus.on("e", move |_| {
            o.set(o.get() + 1);
            if let Some(sub) = s.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(sub);

        let (last, h3) = counter();
        bus.on("e", h3);

        bus.emit("e", &0);
        bus.emit("e", &0);

        assert_eq!(once.get(), 1);
        assert_eq!(first.get(), 2);
        assert_eq!(last.get(), 2);
    }

    #[test]
    fn test_handler_removed_mid_emit_is_skipped() {
        let bus: EventBus<i32> = EventBus::new();
        let (count, victim) = counter();

        let b = bus.clone();
        let victim_id = Rc::new(Cell::new(None));
        let v = Rc::clone(&victim_id);
        bus.on("e", move |_| {
            if let Some(id) = v.get() {
                b.off("e", id);
            }
        });
        let sub = bus.on("e", victim);
        victim_id.set(Some(sub.id()));

        bus.emit("e", &0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_handler_added_mid_emit_waits_for_next_emit() {
        let bus: EventBus<i32> = EventBus::new();
        let (count, late) = counter();
        let late = Rc::new(late);

        let b = bus.clone();
        let added = Rc::new(Cell::new(false));
        let a = Rc::clone(&added);
        bus.on("e", move |_| {
            if !a.replace(true) {
                let l = Rc::clone(&late);
                b.on("e", move |p| l(p));
            }
        });

        bus.emit("e", &0);
        assert_eq!(count.get(), 0);
        bus.emit("e", &0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reentrant_emit() {
        let bus: EventBus<i32> = EventBus::new();
        let (count, handler) = counter();
        bus.on("inner", handler);

        let b = bus.clone();
        bus.on("outer", move |v| b.emit("inner", v));

        bus.emit("outer", &1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let bus: EventBus<i32> = EventBus::new();
        let (count, handler) = counter();
        bus.on("a", handler);
        bus.on("b", |_| {});
        bus.clear();
        bus.emit("a", &0);
        assert_eq!(count.get(), 0);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn test_publish_game_event_by_name() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        bus.on(GameEvent::SCORE, move |e: &GameEvent| {
            if let GameEvent::Score { points } = e {
                h.set(h.get() + *points);
            }
        });
        bus.publish(GameEvent::Score { points: 5 });
        bus.publish(GameEvent::Custom("ignored".into()));
        assert_eq!(hits.get(), 5);
    }
}
