//! # Media Proxy
//!
//! [`MediaProxy`] owns one playable element and stands between it and the
//! rest of the player.
//!
//! ## Responsibilities
//!
//! - Builds the element from [`ProxyOptions`] through an [`ElementFactory`]
//! - Listens to the fixed [`MediaEventName`] set and routes each raw event
//!   through the [`MiddlewareRegistry`] to subscribers
//! - Classifies native errors before emitting them
//! - Keeps shadow copies of time and duration that outlive the element
//! - Exposes the element's property surface with safe defaults
//! - Tears everything down exactly once
//!
//! ## Re-entrancy
//!
//! The proxy is single-threaded. Handles are cheap `Rc` clones and all state
//! sits behind `Cell`/`RefCell`. No borrow is held while host code runs
//! (interceptors, subscribers, element calls), so handlers may call back
//! into the proxy, including [`MediaProxy::destroy`].
//!
//! ## Example
//!
//! ```ignore
//! let proxy = MediaProxy::builder(ProxyOptions::default().with_autoplay(true))
//!     .element_factory(WebElementFactory::new(container)?)
//!     .bind(MediaEventName::Ended, |_| tracing::info!("finished"))
//!     .build()?;
//!
//! proxy.set_src("https://cdn.example.com/movie.mp4");
//! ```

use crate::buffered::{self, BufferedRange, DEFAULT_MAX_HOLE};
use crate::config::{MediaConfig, ProxyOptions};
use crate::error::{PlaybackError, Result};
use crate::events::{EventKind, MediaEvent, MediaEventName, ProxyEvent};
use crate::media_error::{self, ErrorContext};
use crate::middleware::{Forward, Interceptor, MiddlewareRegistry};
use bridge_traits::{
    CanPlayType, Clock, ElementFactory, EventListener, MediaElement, MediaErrorInfo,
    PlatformSniffer, PlayFuture, RawMediaEvent, StaticPlatform, SystemClock, TimeRanges,
    TimerHandle,
};
use core_runtime::events::{EventEmitter, Listener, SubscriptionId};
use core_runtime::logging::redact_url;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Sources with this prefix are in-memory streams fed by an upstream pipeline.
const IN_MEMORY_STREAM_PREFIX: &str = "blob";

/// Outcome of [`MediaProxy::set_src`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcAssignment {
    /// The URL was written to the element.
    Assigned,
    /// An in-memory stream is attached; the element keeps its source and a
    /// synthesized `waiting` event was emitted.
    Deferred,
    /// No element to assign to.
    Detached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ShadowState {
    current_time: f64,
    duration: f64,
    has_start: bool,
}

/// Listener set installed on elements. Created once per proxy.
struct HandlerSet {
    listeners: Vec<(MediaEventName, EventListener)>,
}

struct ProxyInner {
    config: RefCell<Option<MediaConfig>>,
    element: RefCell<Option<Rc<dyn MediaElement>>>,
    shadow: Cell<ShadowState>,
    handlers: RefCell<Option<Rc<HandlerSet>>>,
    attached: RefCell<Vec<Weak<dyn MediaElement>>>,
    middleware: RefCell<MiddlewareRegistry>,
    emitter: EventEmitter<EventKind, ProxyEvent>,
    bindings: RefCell<Vec<(EventKind, SubscriptionId)>>,
    timers: RefCell<HashMap<String, Box<dyn TimerHandle>>>,
    clock: Arc<dyn Clock>,
    destroyed: Cell<bool>,
}

/// Handle to a media proxy. Clones share the same proxy.
#[derive(Clone)]
pub struct MediaProxy {
    inner: Rc<ProxyInner>,
}

/// Non-owning handle, used by element listeners and [`Forward`] tokens.
#[derive(Clone, Default)]
pub struct WeakMediaProxy {
    inner: Weak<ProxyInner>,
}

impl WeakMediaProxy {
    pub fn upgrade(&self) -> Option<MediaProxy> {
        self.inner.upgrade().map(|inner| MediaProxy { inner })
    }
}

impl fmt::Debug for WeakMediaProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakMediaProxy")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Builder for [`MediaProxy`].
pub struct MediaProxyBuilder {
    options: ProxyOptions,
    factory: Option<Box<dyn ElementFactory>>,
    platform: Option<Box<dyn PlatformSniffer>>,
    clock: Option<Arc<dyn Clock>>,
    bindings: Vec<(EventKind, Listener<ProxyEvent>)>,
    middleware: MiddlewareRegistry,
}

impl MediaProxyBuilder {
    pub fn new(options: ProxyOptions) -> Self {
        Self {
            options,
            factory: None,
            platform: None,
            clock: None,
            bindings: Vec::new(),
            middleware: MiddlewareRegistry::new(),
        }
    }

    /// Factory used to create the element. Required.
    pub fn element_factory(mut self, factory: impl ElementFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Environment used for vendor attribute decisions. Defaults to an
    /// unknown, non-WeChat platform.
    pub fn platform(mut self, platform: impl PlatformSniffer + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    /// Clock stamping classified errors. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Host callback for `kind`, removed again on teardown.
    pub fn bind<F>(mut self, kind: impl Into<EventKind>, callback: F) -> Self
    where
        F: Fn(&ProxyEvent) + 'static,
    {
        self.bindings.push((kind.into(), Rc::new(callback)));
        self
    }

    /// Interceptor installed before any event can arrive.
    pub fn middleware(mut self, event: MediaEventName, interceptor: Interceptor) -> Self {
        self.middleware.set(event, interceptor);
        self
    }

    /// Create the element and wire up the proxy.
    ///
    /// Fails only when no factory was supplied. A factory error leaves the
    /// proxy without an element.
    pub fn build(self) -> Result<MediaProxy> {
        let factory = self.factory.ok_or_else(|| PlaybackError::CapabilityMissing {
            capability: "ElementFactory".to_string(),
            message: "an element factory is required to create the media element. \
                      Web: use bridge_wasm::WebElementFactory."
                .to_string(),
        })?;
        let platform = self
            .platform
            .unwrap_or_else(|| Box::new(StaticPlatform::default()));

        let config = MediaConfig::from_options(&self.options, platform.as_ref());
        let element = match factory.create_element(config.kind, &config.attributes) {
            Ok(element) => {
                if self.options.autoplay_muted {
                    element.set_muted(true);
                }
                if self.options.autoplay {
                    element.set_autoplay(true);
                }
                Some(element)
            }
            Err(err) => {
                warn!(error = %err, kind = %config.kind, "element creation failed, proxy has no element");
                None
            }
        };
        debug!(kind = %config.kind, attributes = config.attributes.len(), "media proxy created");

        let emitter = EventEmitter::new();
        let bindings = self
            .bindings
            .into_iter()
            .map(|(kind, callback)| (kind, emitter.on_listener(kind, callback)))
            .collect();

        let proxy = MediaProxy {
            inner: Rc::new(ProxyInner {
                config: RefCell::new(Some(config)),
                element: RefCell::new(element),
                shadow: Cell::new(ShadowState::default()),
                handlers: RefCell::new(None),
                attached: RefCell::new(Vec::new()),
                middleware: RefCell::new(self.middleware),
                emitter,
                bindings: RefCell::new(bindings),
                timers: RefCell::new(HashMap::new()),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                destroyed: Cell::new(false),
            }),
        };
        proxy.attach_video_events(None);
        Ok(proxy)
    }
}

impl MediaProxy {
    pub fn builder(options: ProxyOptions) -> MediaProxyBuilder {
        MediaProxyBuilder::new(options)
    }

    pub fn downgrade(&self) -> WeakMediaProxy {
        WeakMediaProxy {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same proxy.
    pub fn ptr_eq(&self, other: &MediaProxy) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn element(&self) -> Option<Rc<dyn MediaElement>> {
        self.inner.element.borrow().clone()
    }

    /// Resolved element configuration, `None` after teardown.
    pub fn media_config(&self) -> Option<MediaConfig> {
        self.inner.config.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    pub fn on<F>(&self, kind: impl Into<EventKind>, listener: F) -> SubscriptionId
    where
        F: Fn(&ProxyEvent) + 'static,
    {
        self.inner.emitter.on(kind.into(), listener)
    }

    pub fn once<F>(&self, kind: impl Into<EventKind>, listener: F) -> SubscriptionId
    where
        F: Fn(&ProxyEvent) + 'static,
    {
        self.inner.emitter.once(kind.into(), listener)
    }

    pub fn off(&self, kind: impl Into<EventKind>, id: SubscriptionId) -> bool {
        self.inner.emitter.off(&kind.into(), id)
    }

    pub fn off_all(&self) {
        self.inner.emitter.off_all();
    }

    pub fn listener_count(&self, kind: impl Into<EventKind>) -> usize {
        self.inner.emitter.listener_count(&kind.into())
    }

    fn emit(&self, event: ProxyEvent) -> usize {
        let kind = event.kind();
        self.inner.emitter.emit(&kind, &event)
    }

    // ------------------------------------------------------------------
    // Middleware
    // ------------------------------------------------------------------

    /// Merge interceptors into the registry. Later entries win.
    pub fn set_events_middleware<I>(&self, middlewares: I)
    where
        I: IntoIterator<Item = (MediaEventName, Interceptor)>,
    {
        if self.is_destroyed() {
            trace!("ignoring middleware on destroyed proxy");
            return;
        }
        self.inner.middleware.borrow_mut().extend(middlewares);
    }

    /// Drop the interceptors for `events`.
    pub fn remove_events_middleware<I>(&self, events: I)
    where
        I: IntoIterator<Item = MediaEventName>,
    {
        let removed = self.inner.middleware.borrow_mut().remove_all(events);
        trace!(removed, "event middleware removed");
    }

    pub fn has_middleware(&self, event: MediaEventName) -> bool {
        self.inner.middleware.borrow().contains(event)
    }

    // ------------------------------------------------------------------
    // Element listeners
    // ------------------------------------------------------------------

    /// Install the handler set on `element`, or on the owned element.
    ///
    /// Attaching twice to the same element is a no-op.
    pub fn attach_video_events(&self, element: Option<&Rc<dyn MediaElement>>) {
        if self.is_destroyed() {
            return;
        }
        let Some(target) = element.cloned().or_else(|| self.element()) else {
            return;
        };

        {
            let mut attached = self.inner.attached.borrow_mut();
            attached.retain(|weak| weak.strong_count() > 0);
            if attached.iter().any(|weak| same_element(weak, &target)) {
                trace!("handlers already attached");
                return;
            }
            attached.push(Rc::downgrade(&target));
        }

        let handlers = self.handler_set();
        for (name, listener) in &handlers.listeners {
            target.add_event_listener(name.as_str(), listener);
        }
        trace!(events = handlers.listeners.len(), "handlers attached");
    }

    /// Remove the handler set from `element`, or from the owned element.
    pub fn detach_video_events(&self, element: Option<&Rc<dyn MediaElement>>) {
        let Some(target) = element.cloned().or_else(|| self.element()) else {
            return;
        };
        self.inner
            .attached
            .borrow_mut()
            .retain(|weak| weak.strong_count() > 0 && !same_element(weak, &target));

        let handlers = self.inner.handlers.borrow().clone();
        if let Some(handlers) = handlers {
            for (name, listener) in &handlers.listeners {
                target.remove_event_listener(name.as_str(), listener);
            }
            trace!("handlers detached");
        }
    }

    fn handler_set(&self) -> Rc<HandlerSet> {
        if let Some(handlers) = self.inner.handlers.borrow().as_ref() {
            return Rc::clone(handlers);
        }

        let listeners = MediaEventName::ALL
            .iter()
            .map(|&name| {
                let proxy = self.downgrade();
                let listener: EventListener = Rc::new(move |raw: &RawMediaEvent| {
                    let Some(proxy) = proxy.upgrade() else {
                        return Ok(());
                    };
                    proxy
                        .dispatch(name, raw)
                        .map_err(|err| err.into_listener_error(name))
                });
                (name, listener)
            })
            .collect();

        let handlers = Rc::new(HandlerSet { listeners });
        *self.inner.handlers.borrow_mut() = Some(Rc::clone(&handlers));
        handlers
    }

    /// Replace the owned element, moving the handler set over.
    ///
    /// Returns the previous element. Ignored after teardown.
    pub fn swap_element(&self, element: Rc<dyn MediaElement>) -> Option<Rc<dyn MediaElement>> {
        if self.is_destroyed() {
            return None;
        }
        let previous = self.element();
        if let Some(previous) = previous.as_ref() {
            self.detach_video_events(Some(previous));
        }
        *self.inner.element.borrow_mut() = Some(Rc::clone(&element));
        self.reset_playhead_shadow();
        self.attach_video_events(Some(&element));
        debug!("media element swapped");
        previous
    }

    // ------------------------------------------------------------------
    // Event pipeline
    // ------------------------------------------------------------------

    /// Route one raw element event through middleware to subscribers.
    ///
    /// An interceptor failure does not lose the event: unless the
    /// interceptor already forwarded, the default forwarding runs before the
    /// failure is returned. A token the interceptor kept is spent at that
    /// point, so each raw event reaches subscribers at most once.
    pub fn dispatch(&self, name: MediaEventName, raw: &RawMediaEvent) -> Result<()> {
        if self.is_destroyed() {
            trace!(event = %name, "dropping event on destroyed proxy");
            return Ok(());
        }
        trace!(event = %name, "dispatching media event");
        self.refresh_shadow(name);

        let event = MediaEvent::new(name, raw.clone(), self.downgrade());
        let interceptor = self.inner.middleware.borrow().get(name);
        let Some(interceptor) = interceptor else {
            self.forward_event(event);
            return Ok(());
        };

        let forwarded = Rc::new(Cell::new(false));
        let forward = Forward::new(self.downgrade(), Rc::clone(&forwarded));
        match interceptor(self, event.clone(), forward) {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!(event = %name, error = %source, "event middleware failed");
                if !forwarded.replace(true) {
                    self.forward_event(event);
                }
                Err(PlaybackError::Middleware { event: name, source })
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), resolving the name from the raw event type.
    pub fn dispatch_raw(&self, raw: &RawMediaEvent) -> Result<()> {
        let name = raw
            .event_type
            .parse::<MediaEventName>()
            .map_err(|_| PlaybackError::UnknownEvent(raw.event_type.clone()))?;
        self.dispatch(name, raw)
    }

    /// Default forwarding: classify errors, emit everything else.
    pub(crate) fn forward_event(&self, event: MediaEvent) {
        if self.is_destroyed() {
            return;
        }
        if event.event_name == MediaEventName::Error {
            self.emit_media_error();
            return;
        }
        self.emit(ProxyEvent::Media(event));
    }

    fn emit_media_error(&self) {
        let Some(element) = self.element() else {
            return;
        };
        let Some(info) = element.error() else {
            trace!("error event without element error");
            return;
        };
        let context = ErrorContext::capture(element.as_ref(), self.current_time(), self.duration());
        let classified = media_error::classify(&info, context, self.inner.clock.now());
        warn!(
            code = classified.code,
            error_type = %classified.error_type,
            src = %redact_url(&classified.context.current_src),
            "media error"
        );
        self.emit(ProxyEvent::Error(classified));
    }

    fn refresh_shadow(&self, name: MediaEventName) {
        let Some(element) = self.element() else {
            return;
        };
        match name {
            MediaEventName::TimeUpdate => {
                if let Some(time) = element.current_time() {
                    self.update_shadow(|shadow| shadow.current_time = time);
                }
            }
            MediaEventName::DurationChange => {
                let duration = element.duration();
                self.update_shadow(|shadow| shadow.duration = duration);
            }
            _ => {}
        }
    }

    fn update_shadow(&self, update: impl FnOnce(&mut ShadowState)) {
        let mut shadow = self.inner.shadow.get();
        update(&mut shadow);
        self.inner.shadow.set(shadow);
    }

    fn reset_playhead_shadow(&self) {
        self.update_shadow(|shadow| {
            shadow.current_time = 0.0;
            shadow.duration = 0.0;
        });
    }

    // ------------------------------------------------------------------
    // Playback control
    // ------------------------------------------------------------------

    /// Start playback. `None` without an element.
    pub fn play(&self) -> Option<PlayFuture> {
        self.element().map(|element| element.play())
    }

    pub fn pause(&self) {
        self.write(|element| element.pause());
    }

    pub fn can_play_type(&self, mime_type: &str) -> Result<CanPlayType> {
        self.element()
            .map(|element| element.can_play_type(mime_type))
            .ok_or(PlaybackError::NoElement)
    }

    /// Buffered interval around the playhead, using `buffered` instead of the
    /// element's own ranges when given.
    pub fn get_buffered_range(&self, buffered: Option<&TimeRanges>) -> BufferedRange {
        let Some(element) = self.element() else {
            return BufferedRange::ZERO;
        };
        let native;
        let ranges = match buffered {
            Some(ranges) => ranges,
            None => {
                native = element.buffered();
                &native
            }
        };
        let current_time = element
            .current_time()
            .unwrap_or_else(|| self.inner.shadow.get().current_time);
        buffered::containing_range(ranges, current_time)
    }

    // ------------------------------------------------------------------
    // Source
    // ------------------------------------------------------------------

    pub fn src(&self) -> String {
        self.read(|element| element.src())
    }

    /// Request a new source.
    ///
    /// Subscribers see `urlchange` before the element is touched. When the
    /// element plays an in-memory stream the assignment is left to the
    /// pipeline feeding it.
    pub fn set_src(&self, url: &str) -> SrcAssignment {
        if self.is_destroyed() {
            return SrcAssignment::Detached;
        }
        debug!(url = %redact_url(url), "source change requested");
        self.emit(ProxyEvent::UrlChange {
            url: url.to_string(),
        });
        self.reset_playhead_shadow();

        let Some(element) = self.element() else {
            return SrcAssignment::Detached;
        };
        if is_in_memory_stream(&element.current_src()) || is_in_memory_stream(&element.src()) {
            debug!("in-memory stream attached, deferring source assignment");
            self.forward_event(MediaEvent::new(
                MediaEventName::Waiting,
                RawMediaEvent::synthetic(MediaEventName::Waiting.as_str()),
                self.downgrade(),
            ));
            return SrcAssignment::Deferred;
        }
        element.set_src(url);
        SrcAssignment::Assigned
    }

    pub fn current_src(&self) -> String {
        self.read(|element| element.current_src())
    }

    pub fn set_current_src(&self, url: &str) {
        self.write(|element| element.set_current_src(url));
    }

    pub fn cross_origin(&self) -> Option<String> {
        self.read(|element| element.cross_origin())
    }

    pub fn set_cross_origin(&self, value: Option<&str>) {
        self.write(|element| element.set_cross_origin(value));
    }

    pub fn preload(&self) -> String {
        self.read(|element| element.preload())
    }

    pub fn set_preload(&self, value: &str) {
        self.write(|element| element.set_preload(value));
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Element position, or the last position seen on `timeupdate`.
    pub fn current_time(&self) -> f64 {
        self.element()
            .and_then(|element| element.current_time())
            .unwrap_or_else(|| self.inner.shadow.get().current_time)
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.write(|element| element.set_current_time(seconds));
    }

    /// Duration as of the last `durationchange`.
    pub fn duration(&self) -> f64 {
        self.inner.shadow.get().duration
    }

    pub fn buffered(&self) -> TimeRanges {
        self.read(|element| element.buffered())
    }

    /// Buffered ranges sorted with sub-half-second holes merged.
    pub fn buffered2(&self) -> Vec<BufferedRange> {
        buffered::normalize_ranges(&self.buffered(), DEFAULT_MAX_HOLE)
    }

    /// First buffered interval covering the playhead.
    pub fn buffered_point(&self) -> BufferedRange {
        let Some(element) = self.element() else {
            return BufferedRange::ZERO;
        };
        buffered::buffered_point(&element.buffered(), self.current_time())
    }

    pub fn played(&self) -> TimeRanges {
        self.read(|element| element.played())
    }

    pub fn seekable(&self) -> TimeRanges {
        self.read(|element| element.seekable())
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn paused(&self) -> bool {
        self.read(|element| element.paused())
    }

    pub fn ended(&self) -> bool {
        self.read(|element| element.ended())
    }

    pub fn seeking(&self) -> bool {
        self.read(|element| element.seeking())
    }

    pub fn network_state(&self) -> u16 {
        self.read(|element| element.network_state())
    }

    pub fn ready_state(&self) -> u16 {
        self.read(|element| element.ready_state())
    }

    pub fn error(&self) -> Option<MediaErrorInfo> {
        self.read(|element| element.error())
    }

    /// Name of the current error code, e.g. `MEDIA_ERR_NETWORK`.
    pub fn error_note(&self) -> Option<&'static str> {
        self.error()
            .and_then(|error| media_error::error_note(error.code))
    }

    // ------------------------------------------------------------------
    // Flags & levels
    // ------------------------------------------------------------------

    pub fn autoplay(&self) -> bool {
        self.read(|element| element.autoplay())
    }

    pub fn set_autoplay(&self, value: bool) {
        self.write(|element| element.set_autoplay(value));
    }

    pub fn looping(&self) -> bool {
        self.read(|element| element.looping())
    }

    pub fn set_looping(&self, value: bool) {
        self.write(|element| element.set_looping(value));
    }

    pub fn muted(&self) -> bool {
        self.read(|element| element.muted())
    }

    pub fn set_muted(&self, value: bool) {
        self.write(|element| element.set_muted(value));
    }

    pub fn default_muted(&self) -> bool {
        self.read(|element| element.default_muted())
    }

    pub fn set_default_muted(&self, value: bool) {
        self.write(|element| element.set_default_muted(value));
    }

    pub fn volume(&self) -> f64 {
        self.read(|element| element.volume())
    }

    pub fn set_volume(&self, value: f64) {
        self.write(|element| element.set_volume(value));
    }

    pub fn playback_rate(&self) -> f64 {
        self.read(|element| element.playback_rate())
    }

    /// Sets both the default and the live rate so the rate survives reloads.
    pub fn set_playback_rate(&self, rate: f64) {
        self.write(|element| {
            element.set_default_playback_rate(rate);
            element.set_playback_rate(rate);
        });
    }

    // ------------------------------------------------------------------
    // Started flag
    // ------------------------------------------------------------------

    pub fn has_start(&self) -> bool {
        self.inner.shadow.get().has_start
    }

    /// Record whether playback has started and emit `hasstart`.
    ///
    /// Every call emits, including one that repeats the current value, so
    /// subscribers see one `hasstart` per assignment rather than per change.
    pub fn set_has_start(&self, has_start: bool) {
        if self.is_destroyed() {
            return;
        }
        self.update_shadow(|shadow| shadow.has_start = has_start);
        debug!(has_start, "started flag set");
        self.emit(ProxyEvent::HasStart { has_start });
    }

    /// Host-facing variant of [`set_has_start`](Self::set_has_start).
    /// Non-boolean values are ignored. Returns whether the value was accepted.
    pub fn set_has_start_value(&self, value: &serde_json::Value) -> bool {
        match value.as_bool() {
            Some(has_start) => {
                self.set_has_start(has_start);
                true
            }
            None => {
                trace!(%value, "ignoring non-boolean started flag");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Take ownership of a host timer. Replacing a key cancels the old timer.
    pub fn register_interval(&self, key: impl Into<String>, handle: impl TimerHandle + 'static) {
        let mut handle: Box<dyn TimerHandle> = Box::new(handle);
        if self.is_destroyed() {
            handle.cancel();
            return;
        }
        let previous = self.inner.timers.borrow_mut().insert(key.into(), handle);
        if let Some(mut previous) = previous {
            previous.cancel();
        }
    }

    /// Cancel and forget the timer under `key`.
    pub fn clear_interval(&self, key: &str) -> bool {
        let handle = self.inner.timers.borrow_mut().remove(key);
        match handle {
            Some(mut handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_interval(&self, key: &str) -> bool {
        self.inner.timers.borrow().contains_key(key)
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release the element and every registration. Subsequent calls are no-ops.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            trace!("media proxy already destroyed");
            return;
        }
        debug!("destroying media proxy");

        if let Some(element) = self.element() {
            element.pause();
            element.remove_src_attribute();
        }
        self.inner.shadow.set(ShadowState::default());
        self.inner.config.borrow_mut().take();

        let timers: Vec<_> = self.inner.timers.borrow_mut().drain().collect();
        for (key, mut handle) in timers {
            trace!(key = %key, "clearing interval");
            handle.cancel();
        }

        self.emit(ProxyEvent::Destroy);

        let attached: Vec<_> = self
            .inner
            .attached
            .borrow_mut()
            .drain(..)
            .filter_map(|weak| weak.upgrade())
            .collect();
        let handlers = self.inner.handlers.borrow_mut().take();
        if let Some(handlers) = handlers {
            for element in &attached {
                for (name, listener) in &handlers.listeners {
                    element.remove_event_listener(name.as_str(), listener);
                }
            }
        }

        let bindings: Vec<_> = self.inner.bindings.borrow_mut().drain(..).collect();
        for (kind, id) in bindings {
            self.inner.emitter.off(&kind, id);
        }
        self.inner.middleware.borrow_mut().clear();
        self.inner.element.borrow_mut().take();
        self.inner.emitter.off_all();
    }

    fn read<T: Default>(&self, read: impl FnOnce(&dyn MediaElement) -> T) -> T {
        self.element()
            .map(|element| read(element.as_ref()))
            .unwrap_or_default()
    }

    fn write(&self, write: impl FnOnce(&dyn MediaElement)) {
        if let Some(element) = self.element() {
            write(element.as_ref());
        }
    }
}

impl fmt::Debug for MediaProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaProxy")
            .field("has_element", &self.inner.element.borrow().is_some())
            .field("shadow", &self.inner.shadow.get())
            .field("middleware", &*self.inner.middleware.borrow())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

fn is_in_memory_stream(url: &str) -> bool {
    url.starts_with(IN_MEMORY_STREAM_PREFIX)
}

fn same_element(weak: &Weak<dyn MediaElement>, element: &Rc<dyn MediaElement>) -> bool {
    std::ptr::eq(
        weak.as_ptr() as *const (),
        Rc::as_ptr(element) as *const (),
    )
}
