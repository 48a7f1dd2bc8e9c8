//! # Event Middleware
//!
//! Per-event interceptors sitting between raw element events and proxy
//! subscribers. An interceptor receives the proxy, the normalized event and a
//! one-shot [`Forward`] token. Calling [`Forward::forward`] continues with the
//! default forwarding; dropping the token suppresses the event.
//!
//! ```ignore
//! proxy.set_events_middleware([(
//!     MediaEventName::Progress,
//!     interceptor(|proxy, event, forward| {
//!         if proxy.buffered().is_empty() {
//!             return Ok(());
//!         }
//!         forward.forward(event);
//!         Ok(())
//!     }),
//! )]);
//! ```

use crate::events::{MediaEvent, MediaEventName};
use crate::proxy::{MediaProxy, WeakMediaProxy};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Replaces the default forwarding of one event.
pub type Interceptor = Rc<dyn Fn(&MediaProxy, MediaEvent, Forward) -> anyhow::Result<()>>;

/// Wrap a closure as an [`Interceptor`].
pub fn interceptor<F>(f: F) -> Interceptor
where
    F: Fn(&MediaProxy, MediaEvent, Forward) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

/// One-shot continuation handed to an interceptor.
///
/// The token may be stored and used later; once the proxy is gone or
/// destroyed, forwarding does nothing. The same applies once the proxy has
/// already forwarded the event itself after the interceptor failed.
pub struct Forward {
    proxy: WeakMediaProxy,
    forwarded: Rc<Cell<bool>>,
}

impl Forward {
    pub(crate) fn new(proxy: WeakMediaProxy, forwarded: Rc<Cell<bool>>) -> Self {
        Self { proxy, forwarded }
    }

    /// Run the default forwarding for `event`.
    pub fn forward(self, event: MediaEvent) {
        if self.forwarded.replace(true) {
            return;
        }
        if let Some(proxy) = self.proxy.upgrade() {
            proxy.forward_event(event);
        }
    }
}

impl fmt::Debug for Forward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forward")
            .field("forwarded", &self.forwarded.get())
            .finish()
    }
}

/// Interceptors keyed by event name. At most one per event.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    interceptors: HashMap<MediaEventName, Interceptor>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `interceptor` for `event`, returning the one it replaced.
    pub fn set(&mut self, event: MediaEventName, interceptor: Interceptor) -> Option<Interceptor> {
        self.interceptors.insert(event, interceptor)
    }

    /// Merge entries; later entries win.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (MediaEventName, Interceptor)>,
    {
        self.interceptors.extend(entries);
    }

    pub fn remove(&mut self, event: MediaEventName) -> Option<Interceptor> {
        self.interceptors.remove(&event)
    }

    /// Remove every listed entry. Returns how many were present.
    pub fn remove_all<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = MediaEventName>,
    {
        events
            .into_iter()
            .filter(|event| self.interceptors.remove(event).is_some())
            .count()
    }

    pub fn get(&self, event: MediaEventName) -> Option<Interceptor> {
        self.interceptors.get(&event).cloned()
    }

    pub fn contains(&self, event: MediaEventName) -> bool {
        self.interceptors.contains_key(&event)
    }

    /// Registered event names, sorted.
    pub fn names(&self) -> Vec<MediaEventName> {
        let mut names: Vec<_> = self.interceptors.keys().copied().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn clear(&mut self) {
        self.interceptors.clear();
    }
}

impl FromIterator<(MediaEventName, Interceptor)> for MiddlewareRegistry {
    fn from_iter<I: IntoIterator<Item = (MediaEventName, Interceptor)>>(iter: I) -> Self {
        Self {
            interceptors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("events", &self.names())
            .finish()
    }
}
