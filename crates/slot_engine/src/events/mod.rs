//! Observer lists for synchronous engine notifications
//!
//! Key principles:
//! - Handlers are registered explicitly and receive an id for removal
//! - Delivery is immediate and in registration order (no queuing)
//! - Several independent consumers can listen to the same signal
//! - Subscription ids are unique across every signal in the process

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier returned by [`Signal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Handler<T> = Box<dyn FnMut(&T)>;

/// Ordered list of handlers notified with a value of type `T`
pub struct Signal<T> {
    handlers: Vec<(SubscriptionId, Handler<T>)>,
}

impl<T> Signal<T> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId::next();
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Notify every handler in registration order
    pub fn emit(&mut self, value: &T) {
        for (_, handler) in &mut self.handlers {
            handler(value);
        }
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drop every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::<u32>::new();

        let first = Rc::clone(&log);
        signal.subscribe(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&log);
        signal.subscribe(move |v| second.borrow_mut().push(("b", *v)));

        signal.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut signal = Signal::<()>::new();
        let counter = Rc::clone(&hits);
        let id = signal.subscribe(move |()| *counter.borrow_mut() += 1);

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(&());
        assert_eq!(*hits.borrow(), 0);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_ids_do_not_collide_across_signals() {
        let mut first = Signal::<u32>::new();
        let mut second = Signal::<u32>::new();
        let a = first.subscribe(|_| {});
        let b = second.subscribe(|_| {});

        assert_ne!(a, b);
        assert!(!first.unsubscribe(b));
        assert_eq!(first.len(), 1);
    }
}
