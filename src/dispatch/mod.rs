//! Session-scoped input dispatch.
//!
//! One dispatcher per editor session owns every input subscriber. Handlers
//! run in priority order until one consumes the event. Subscribing returns a
//! [`Subscription`] guard; dropping the guard unsubscribes, so a component
//! that goes away cannot leave a handler behind.

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::WindowKeyListener;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Whether a handler consumed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Stop here; the host should also prevent the default action.
    Consumed,
    Pass,
}

type Handler<E> = Rc<RefCell<dyn FnMut(&E) -> Handled>>;

struct Registry<E> {
    next_id: u64,
    /// Front of the list runs first.
    handlers: Vec<(u64, Handler<E>)>,
}

/// Ordered subscriber list for events of type `E`.
pub struct InputDispatcher<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

/// Clones share one subscriber list.
impl<E> Clone for InputDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: 'static> Default for InputDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> InputDispatcher<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 1,
                handlers: Vec::new(),
            })),
        }
    }

    /// Add a handler behind the existing ones.
    pub fn subscribe(&self, handler: impl FnMut(&E) -> Handled + 'static) -> Subscription<E> {
        self.insert(handler, false)
    }

    /// Add a handler ahead of the existing ones (a focused find bar, an
    /// open dialog).
    pub fn subscribe_first(&self, handler: impl FnMut(&E) -> Handled + 'static) -> Subscription<E> {
        self.insert(handler, true)
    }

    fn insert(&self, handler: impl FnMut(&E) -> Handled + 'static, first: bool) -> Subscription<E> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        if first {
            registry.handlers.insert(0, (id, handler));
        } else {
            registry.handlers.push((id, handler));
        }
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run handlers in order until one consumes `event`.
    ///
    /// Handlers may subscribe or unsubscribe while running; changes apply to
    /// the next dispatch. A handler that re-enters `dispatch` is skipped by
    /// the inner call.
    pub fn dispatch(&self, event: &E) -> Handled {
        let snapshot: Vec<Handler<E>> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in snapshot {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                log::debug!("skipping re-entrant input handler");
                continue;
            };
            if handler(event) == Handled::Consumed {
                return Handled::Consumed;
            }
        }
        Handled::Pass
    }
}

/// Live subscription; unsubscribes on drop.
pub struct Subscription<E> {
    id: u64,
    registry: Weak<RefCell<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Unsubscribe now instead of at drop.
    pub fn cancel(self) {}
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut registry) = registry.try_borrow_mut() else {
            log::warn!("input subscription {} dropped during registry update", self.id);
            return;
        };
        registry.handlers.retain(|(id, _)| *id != self.id);
    }
}
