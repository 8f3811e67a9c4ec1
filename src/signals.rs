//! Minimal single-threaded signal/slot primitives.
//!
//! A [`Signal`] delivers values synchronously to every connected handler in
//! connection order. Connecting returns a [`Subscription`] which disconnects the
//! handler when disposed or dropped. [`Disposables`] collects subscriptions into
//! one teardown list.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::warn;

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slots<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

pub struct Signal<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            slots: Rc::default(),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    fn is_connected(&self, id: u64) -> bool {
        self.slots.borrow().handlers.iter().any(|(h, _)| *h == id)
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, handler: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            let handler: Handler<T> = Rc::new(RefCell::new(handler));
            slots.handlers.push((id, handler));
            id
        };

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().handlers.retain(|(h, _)| *h != id);
            }
        })
    }

    /// Calls every connected handler with `value`.
    ///
    /// Handlers may connect, disconnect or emit other signals while running.
    /// A handler disconnected by an earlier handler of the same emission is skipped.
    pub fn emit(&self, value: &T) {
        let handlers: Vec<(u64, Handler<T>)> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in handlers {
            if !self.is_connected(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut f) => f(value),
                Err(_) => warn!("signal handler {id} re-entered itself, skipping"),
            }
        }
    }

}

/// A value with change notifications. Every [`Observable::set`] notifies subscribers,
/// even if the new value equals the old one.
pub struct Observable<T> {
    value: Rc<RefCell<T>>,
    changed: Signal<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            changed: self.changed.clone(),
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self {
            value: Rc::default(),
            changed: Signal::default(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value.borrow())
            .field("changed", &self.changed)
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            changed: Signal::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Stores the value first so subscribers reading [`Observable::get`] see it.
    pub fn set(&self, value: T) {
        self.value.replace(value);
        let current = self.get();
        self.changed.emit(&current);
    }

    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> Subscription {
        self.changed.connect(handler)
    }
}

/// Handle to a connected handler. Disposing is idempotent, dropping disposes.
#[must_use = "dropping a Subscription disconnects its handler"]
pub struct Subscription {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    pub fn dispose(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disconnect.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Teardown list of subscriptions owned by one component.
#[derive(Debug, Default)]
pub struct Disposables {
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

impl Disposables {
    /// Adds a subscription. After [`Disposables::dispose`] it is released immediately.
    pub fn push(&mut self, mut subscription: Subscription) {
        if self.disposed {
            subscription.dispose();
            return;
        }
        self.subscriptions.push(subscription);
    }

    /// Releases every subscription. Returns `false` if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        for mut subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn emit_reaches_handlers_in_connection_order() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let _a = signal.connect(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&seen);
        let _b = signal.connect(move |v| second.borrow_mut().push(("b", *v)));

        signal.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dispose_is_idempotent_and_drop_disconnects() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let mut sub = signal.connect(move |()| counter.set(counter.get() + 1));
        signal.emit(&());
        sub.dispose();
        sub.dispose();
        assert!(sub.is_disposed());
        signal.emit(&());
        assert_eq!(hits.get(), 1);

        let counter = Rc::clone(&hits);
        let dropped = signal.connect(move |()| counter.set(counter.get() + 1));
        assert_eq!(signal.subscriber_count(), 1);
        drop(dropped);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_signal_is_harmless() {
        let signal = Signal::<()>::new();
        let mut sub = signal.connect(|()| {});
        drop(signal);
        sub.dispose();
        assert!(sub.is_disposed());
    }

    #[test]
    fn observable_subscribers_read_new_value() {
        let obs = Observable::new(1);
        let seen = Rc::new(Cell::new(0));

        let reader = obs.clone();
        let sink = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| {
            assert_eq!(reader.get(), *v);
            sink.set(*v);
        });

        obs.set(5);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn debug_reports_subscribers() {
        let obs = Observable::new(vec![1, 2]);
        let _sub = obs.subscribe(|_| {});
        let text = format!("{obs:?}");
        assert!(text.contains("[1, 2]"));
        assert!(text.contains("subscribers: 1"));
    }

    #[test]
    fn disposables_dispose_once() {
        let signal = Signal::<()>::new();
        let mut list = Disposables::default();
        list.push(signal.connect(|()| {}));
        list.push(signal.connect(|()| {}));
        assert_eq!(list.len(), 2);

        assert!(list.dispose());
        assert!(!list.dispose());
        assert!(list.is_empty());
        assert_eq!(signal.subscriber_count(), 0);

        list.push(signal.connect(|()| {}));
        assert_eq!(signal.subscriber_count(), 0);
    }
}
