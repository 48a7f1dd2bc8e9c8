//! # Event Emitter
//!
//! Provides a synchronous, named publish/subscribe primitive for components
//! that run on a single-threaded event loop (the browser UI thread).
//!
//! ## Overview
//!
//! The emitter consists of:
//! - **Keys**: any `Eq + Hash + Clone` value naming an event channel
//! - **Listeners**: `Rc` closures invoked in registration order
//! - **Subscriptions**: ids returned by [`EventEmitter::on`] / [`EventEmitter::once`]
//!   used to unsubscribe later
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   emit(key)   ┌──────────────┐    listener(&event)   ┌────────────┐
//! │  Producer   ├──────────────>│ EventEmitter ├──────────────────────>│ Subscriber │
//! └─────────────┘               │  key -> [..] │                       └────────────┘
//!                               │              ├──────────────────────>┌────────────┐
//!                               └──────────────┘                       │ Subscriber │
//!                                                                      └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::EventEmitter;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let emitter: EventEmitter<&'static str, u32> = EventEmitter::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let sink = Rc::clone(&seen);
//! let id = emitter.on("progress", move |value| sink.set(*value));
//!
//! assert_eq!(emitter.emit(&"progress", &42), 1);
//! assert_eq!(seen.get(), 42);
//!
//! emitter.off(&"progress", id);
//! assert_eq!(emitter.emit(&"progress", &7), 0);
//! ```
//!
//! ## Re-entrancy
//!
//! Listeners may subscribe, unsubscribe or clear the emitter while an event
//! is being delivered. No internal borrow is held while a listener runs.
//! A listener removed during delivery is not invoked afterwards, even if it
//! was registered when delivery started; listeners added during delivery
//! only see subsequent events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Shared listener callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Identifier of a single subscription, unique per emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription<E> {
    id: SubscriptionId,
    listener: Listener<E>,
    once: bool,
}

struct EmitterState<K, E> {
    next_id: u64,
    listeners: HashMap<K, Vec<Subscription<E>>>,
}

/// Named, synchronous publish/subscribe channel set.
pub struct EventEmitter<K, E> {
    state: RefCell<EmitterState<K, E>>,
}

impl<K, E> EventEmitter<K, E>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            state: RefCell::new(EmitterState {
                next_id: 0,
                listeners: HashMap::new(),
            }),
        }
    }

    /// Subscribe `listener` to every future event on `key`.
    pub fn on<F>(&self, key: K, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(key, Rc::new(listener), false)
    }

    /// Subscribe an already shared listener.
    pub fn on_listener(&self, key: K, listener: Listener<E>) -> SubscriptionId {
        self.subscribe(key, listener, false)
    }

    /// Subscribe `listener` to the next event on `key` only.
    pub fn once<F>(&self, key: K, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(key, Rc::new(listener), true)
    }

    fn subscribe(&self, key: K, listener: Listener<E>, once: bool) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state
            .listeners
            .entry(key)
            .or_default()
            .push(Subscription { id, listener, once });
        id
    }

    /// Remove one subscription. Returns `false` if it was not registered.
    pub fn off(&self, key: &K, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(subscriptions) = state.listeners.get_mut(key) else {
            return false;
        };
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        let removed = subscriptions.len() != before;
        if subscriptions.is_empty() {
            state.listeners.remove(key);
        }
        removed
    }

    /// Remove every subscription on `key`, returning how many were removed.
    pub fn off_key(&self, key: &K) -> usize {
        self.state
            .borrow_mut()
            .listeners
            .remove(key)
            .map(|subscriptions| subscriptions.len())
            .unwrap_or(0)
    }

    /// Remove every subscription on every key.
    pub fn off_all(&self) {
        self.state.borrow_mut().listeners.clear();
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.state
            .borrow()
            .listeners
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn total_listener_count(&self) -> usize {
        self.state.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Deliver `event` to the listeners of `key` in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, key: &K, event: &E) -> usize {
        let snapshot: Vec<SubscriptionId> = match self.state.borrow().listeners.get(key) {
            Some(subscriptions) => subscriptions.iter().map(|s| s.id).collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for id in snapshot {
            let Some(listener) = self.claim(key, id) else {
                continue;
            };
            listener(event);
            delivered += 1;
        }
        delivered
    }

    /// Fetch a live listener for delivery, dropping it first if it is a `once` subscription.
    fn claim(&self, key: &K, id: SubscriptionId) -> Option<Listener<E>> {
        let mut state = self.state.borrow_mut();
        let subscriptions = state.listeners.get_mut(key)?;
        let position = subscriptions.iter().position(|s| s.id == id)?;

        if !subscriptions[position].once {
            return Some(Rc::clone(&subscriptions[position].listener));
        }

        let subscription = subscriptions.remove(position);
        if subscriptions.is_empty() {
            state.listeners.remove(key);
        }
        Some(subscription.listener)
    }
}

impl<K, E> Default for EventEmitter<K, E>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> fmt::Debug for EventEmitter<K, E>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listener_count", &self.total_listener_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
