//! Integration tests for the media proxy.
//!
//! This suite drives a proxy through an in-memory element and verifies:
//! - Listener installation and removal on elements
//! - Shadow time/duration bookkeeping
//! - Middleware suppression, deferral and fail-open forwarding
//! - Error classification
//! - Source changes and teardown

use bridge_traits::{
    AttributeValue, BridgeError, CanPlayType, CallbackTimer, ElementFactory, EventListener,
    MediaAttributes, MediaElement, MediaErrorInfo, MediaKind, OsFamily, PlatformSniffer,
    PlayFuture, RawMediaEvent, TimeRanges,
};
use core_playback::{
    interceptor, BufferedRange, ErrorType, EventKind, Forward, MediaEventName, MediaProxy,
    PlaybackError, ProxyEvent, ProxyOptions, SrcAssignment,
};
use futures::FutureExt;
use mockall::mock;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ============================================================================
// In-memory element
// ============================================================================

#[derive(Default)]
struct ElementState {
    src: String,
    current_src: String,
    current_time: Option<f64>,
    duration: f64,
    buffered: Vec<(f64, f64)>,
    paused: bool,
    ended: bool,
    error: Option<MediaErrorInfo>,
    autoplay: bool,
    muted: bool,
    volume: f64,
    playback_rate: f64,
    default_playback_rate: f64,
    src_removed: bool,
    pause_calls: usize,
    play_calls: usize,
}

#[derive(Default)]
struct FakeElement {
    state: RefCell<ElementState>,
    listeners: RefCell<Vec<(String, EventListener)>>,
}

impl FakeElement {
    fn new() -> Rc<Self> {
        let element = Rc::new(Self::default());
        element.update(|state| {
            state.paused = true;
            state.current_time = Some(0.0);
            state.volume = 1.0;
            state.playback_rate = 1.0;
            state.default_playback_rate = 1.0;
        });
        element
    }

    fn update(&self, f: impl FnOnce(&mut ElementState)) {
        f(&mut self.state.borrow_mut());
    }

    /// Dispatch `event_type` to every registered listener, like the DOM does.
    fn fire(&self, event_type: &str) -> Vec<bridge_traits::error::Result<()>> {
        let listeners: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| kind == event_type)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let raw = RawMediaEvent::new(event_type);
        listeners.iter().map(|listener| listener(&raw)).collect()
    }

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn listeners_for(&self, event_type: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| kind == event_type)
            .count()
    }
}

impl MediaElement for FakeElement {
    fn play(&self) -> PlayFuture {
        self.update(|state| {
            state.play_calls += 1;
            state.paused = false;
        });
        futures::future::ready(Ok(())).boxed_local()
    }

    fn pause(&self) {
        self.update(|state| {
            state.pause_calls += 1;
            state.paused = true;
        });
    }

    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        if mime_type.starts_with("video/mp4") {
            CanPlayType::Probably
        } else {
            CanPlayType::No
        }
    }

    fn src(&self) -> String {
        self.state.borrow().src.clone()
    }

    fn set_src(&self, url: &str) {
        self.update(|state| {
            state.src = url.to_string();
            state.current_src = url.to_string();
        });
    }

    fn remove_src_attribute(&self) {
        self.update(|state| {
            state.src.clear();
            state.src_removed = true;
        });
    }

    fn current_src(&self) -> String {
        self.state.borrow().current_src.clone()
    }

    fn set_current_src(&self, _url: &str) {}

    fn cross_origin(&self) -> Option<String> {
        None
    }

    fn set_cross_origin(&self, _value: Option<&str>) {}

    fn preload(&self) -> String {
        "auto".to_string()
    }

    fn set_preload(&self, _value: &str) {}

    fn current_time(&self) -> Option<f64> {
        self.state.borrow().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.update(|state| state.current_time = Some(seconds));
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn buffered(&self) -> TimeRanges {
        TimeRanges::new(self.state.borrow().buffered.clone())
    }

    fn played(&self) -> TimeRanges {
        TimeRanges::empty()
    }

    fn seekable(&self) -> TimeRanges {
        TimeRanges::empty()
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn seeking(&self) -> bool {
        false
    }

    fn network_state(&self) -> u16 {
        2
    }

    fn ready_state(&self) -> u16 {
        4
    }

    fn error(&self) -> Option<MediaErrorInfo> {
        self.state.borrow().error.clone()
    }

    fn autoplay(&self) -> bool {
        self.state.borrow().autoplay
    }

    fn set_autoplay(&self, value: bool) {
        self.update(|state| state.autoplay = value);
    }

    fn looping(&self) -> bool {
        false
    }

    fn set_looping(&self, _value: bool) {}

    fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn set_muted(&self, value: bool) {
        self.update(|state| state.muted = value);
    }

    fn default_muted(&self) -> bool {
        false
    }

    fn set_default_muted(&self, _value: bool) {}

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&self, value: f64) {
        self.update(|state| state.volume = value);
    }

    fn playback_rate(&self) -> f64 {
        self.state.borrow().playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.update(|state| state.playback_rate = rate);
    }

    fn default_playback_rate(&self) -> f64 {
        self.state.borrow().default_playback_rate
    }

    fn set_default_playback_rate(&self, rate: f64) {
        self.update(|state| state.default_playback_rate = rate);
    }

    fn add_event_listener(&self, event_type: &str, listener: &EventListener) {
        let mut listeners = self.listeners.borrow_mut();
        let exists = listeners
            .iter()
            .any(|(kind, existing)| kind == event_type && Rc::ptr_eq(existing, listener));
        if !exists {
            listeners.push((event_type.to_string(), Rc::clone(listener)));
        }
    }

    fn remove_event_listener(&self, event_type: &str, listener: &EventListener) {
        self.listeners
            .borrow_mut()
            .retain(|(kind, existing)| !(kind == event_type && Rc::ptr_eq(existing, listener)));
    }
}

struct FakeFactory {
    element: Rc<FakeElement>,
}

impl ElementFactory for FakeFactory {
    fn create_element(
        &self,
        _kind: MediaKind,
        _attributes: &MediaAttributes,
    ) -> bridge_traits::error::Result<Rc<dyn MediaElement>> {
        Ok(self.element.clone())
    }
}

mock! {
    Factory {}

    impl ElementFactory for Factory {
        fn create_element(
            &self,
            kind: MediaKind,
            attributes: &MediaAttributes,
        ) -> bridge_traits::error::Result<Rc<dyn MediaElement>>;
    }
}

mock! {
    Platform {}

    impl PlatformSniffer for Platform {
        fn is_wechat(&self) -> bool;
        fn os_family(&self) -> OsFamily;
    }
}

fn build_proxy(options: ProxyOptions) -> (MediaProxy, Rc<FakeElement>) {
    let element = FakeElement::new();
    let proxy = MediaProxy::builder(options)
        .element_factory(FakeFactory {
            element: element.clone(),
        })
        .build()
        .unwrap();
    (proxy, element)
}

/// Records the kinds of every event delivered for `kinds`.
fn record(proxy: &MediaProxy, kinds: &[EventKind]) -> Rc<RefCell<Vec<ProxyEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in kinds {
        let seen = Rc::clone(&seen);
        proxy.on(*kind, move |event: &ProxyEvent| seen.borrow_mut().push(event.clone()));
    }
    seen
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_factory_receives_resolved_attributes() {
    let element = FakeElement::new();
    let returned = element.clone();

    let mut factory = MockFactory::new();
    factory
        .expect_create_element()
        .withf(|kind, attributes| {
            *kind == MediaKind::Audio
                && attributes.get("x5-video-player-type") == Some(&AttributeValue::from("h5"))
                && !attributes.contains_key("playsinline")
                && attributes.get("loop") == Some(&AttributeValue::from("loop"))
        })
        .times(1)
        .return_once_st(move |_, _| Ok(returned as Rc<dyn MediaElement>));

    let mut platform = MockPlatform::new();
    platform.expect_is_wechat().return_const(true);
    platform.expect_os_family().return_const(OsFamily::Android);

    let options = ProxyOptions::default()
        .with_media_type(MediaKind::Audio)
        .with_x5_player_type("h5")
        .with_loop(true)
        .with_autoplay(true)
        .with_autoplay_muted(true);

    let proxy = MediaProxy::builder(options)
        .element_factory(factory)
        .platform(platform)
        .build()
        .unwrap();

    assert!(proxy.muted());
    assert!(proxy.autoplay());
    assert_eq!(proxy.media_config().unwrap().kind, MediaKind::Audio);
    assert_eq!(element.listener_count(), MediaEventName::ALL.len());
}

#[test]
fn test_bindings_receive_events_until_destroy() {
    let element = FakeElement::new();
    let ended = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ended);

    let proxy = MediaProxy::builder(ProxyOptions::default())
        .element_factory(FakeFactory {
            element: element.clone(),
        })
        .bind(MediaEventName::Ended, move |_| counter.set(counter.get() + 1))
        .build()
        .unwrap();

    element.fire("ended");
    assert_eq!(ended.get(), 1);
    assert_eq!(proxy.listener_count(MediaEventName::Ended), 1);

    proxy.destroy();
    element.fire("ended");
    assert_eq!(ended.get(), 1);
    assert_eq!(proxy.listener_count(MediaEventName::Ended), 0);
}

// ============================================================================
// Listener installation
// ============================================================================

#[test]
fn test_attach_is_idempotent() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Play.into()]);

    proxy.attach_video_events(None);
    proxy.attach_video_events(None);
    assert_eq!(element.listeners_for("play"), 1);
    assert_eq!(element.listener_count(), MediaEventName::ALL.len());

    element.fire("play");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_detach_is_idempotent() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Pause.into()]);

    proxy.detach_video_events(None);
    proxy.detach_video_events(None);
    assert_eq!(element.listener_count(), 0);

    element.fire("pause");
    assert!(seen.borrow().is_empty());

    proxy.attach_video_events(None);
    element.fire("pause");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_attach_to_secondary_element() {
    let (proxy, _element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Waiting.into()]);

    let other = FakeElement::new();
    let other_dyn: Rc<dyn MediaElement> = other.clone();
    proxy.attach_video_events(Some(&other_dyn));
    proxy.attach_video_events(Some(&other_dyn));
    assert_eq!(other.listeners_for("waiting"), 1);

    other.fire("waiting");
    assert_eq!(seen.borrow().len(), 1);

    proxy.detach_video_events(Some(&other_dyn));
    assert_eq!(other.listener_count(), 0);
}

#[test]
fn test_swap_element_moves_handlers() {
    let (proxy, first) = build_proxy(ProxyOptions::default());
    first.update(|state| state.current_time = Some(8.0));
    first.fire("timeupdate");

    let second = FakeElement::new();
    let previous = proxy.swap_element(second.clone()).unwrap();

    assert!(std::ptr::eq(
        Rc::as_ptr(&previous) as *const (),
        Rc::as_ptr(&first) as *const ()
    ));
    assert_eq!(first.listener_count(), 0);
    assert_eq!(second.listener_count(), MediaEventName::ALL.len());
    assert_eq!(proxy.duration(), 0.0);
    assert_eq!(proxy.current_time(), 0.0);
}

// ============================================================================
// Shadow state
// ============================================================================

#[test]
fn test_timeupdate_refreshes_shadow_time() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let observed = Rc::new(Cell::new(-1.0));
    let sink = Rc::clone(&observed);
    proxy.on(MediaEventName::TimeUpdate, move |event: &ProxyEvent| {
        let player = event.as_media().and_then(|event| event.player()).unwrap();
        sink.set(player.current_time());
    });

    element.update(|state| state.current_time = Some(12.5));
    element.fire("timeupdate");
    assert_eq!(observed.get(), 12.5);

    // The element can no longer report a position.
    element.update(|state| state.current_time = None);
    assert_eq!(proxy.current_time(), 12.5);
}

#[test]
fn test_duration_reads_shadow_only() {
    let (proxy, element) = build_proxy(ProxyOptions::default());

    element.update(|state| state.duration = 60.0);
    assert_eq!(proxy.duration(), 0.0);

    element.fire("durationchange");
    assert_eq!(proxy.duration(), 60.0);

    element.update(|state| state.duration = 90.0);
    assert_eq!(proxy.duration(), 60.0);
}

// ============================================================================
// Middleware
// ============================================================================

#[test]
fn test_middleware_suppresses_progress() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Progress.into()]);

    proxy.set_events_middleware([(MediaEventName::Progress, interceptor(|_, _, _| Ok(())))]);
    element.fire("progress");
    element.fire("progress");
    assert!(seen.borrow().is_empty());

    proxy.remove_events_middleware([MediaEventName::Progress]);
    assert!(!proxy.has_middleware(MediaEventName::Progress));
    element.fire("progress");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_middleware_receives_proxy_and_forwards() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Seeked.into()]);
    element.update(|state| state.buffered = vec![(0.0, 4.0)]);

    proxy.set_events_middleware([(
        MediaEventName::Seeked,
        interceptor(|proxy, event, forward| {
            if proxy.buffered().is_empty() {
                return Ok(());
            }
            forward.forward(event);
            Ok(())
        }),
    )]);

    element.fire("seeked");
    assert_eq!(seen.borrow().len(), 1);

    element.update(|state| state.buffered.clear());
    element.fire("seeked");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_deferred_forwarding() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::CanPlay.into()]);
    let parked: Rc<RefCell<Vec<(Forward, core_playback::MediaEvent)>>> = Rc::default();
    let queue = Rc::clone(&parked);

    proxy.set_events_middleware([(
        MediaEventName::CanPlay,
        interceptor(move |_, event, forward| {
            queue.borrow_mut().push((forward, event));
            Ok(())
        }),
    )]);

    element.fire("canplay");
    assert!(seen.borrow().is_empty());

    let (forward, event) = parked.borrow_mut().pop().unwrap();
    forward.forward(event);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_failing_middleware_fails_open() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Waiting.into()]);

    proxy.set_events_middleware([(
        MediaEventName::Waiting,
        interceptor(|_, _, _| Err(anyhow::anyhow!("stall detector crashed"))),
    )]);

    let results = element.fire("waiting");
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(BridgeError::ListenerFailed { event, message }) => {
            assert_eq!(event, "waiting");
            assert!(message.contains("stall detector crashed"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_failing_middleware_after_forward_emits_once() {
    let (proxy, _element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Stalled.into()]);

    proxy.set_events_middleware([(
        MediaEventName::Stalled,
        interceptor(|_, event, forward| {
            forward.forward(event);
            anyhow::bail!("post-processing failed")
        }),
    )]);

    let err = proxy
        .dispatch(MediaEventName::Stalled, &RawMediaEvent::new("stalled"))
        .unwrap_err();
    assert!(matches!(
        err,
        PlaybackError::Middleware {
            event: MediaEventName::Stalled,
            ..
        }
    ));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_kept_token_is_spent_when_middleware_fails() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::CanPlay.into()]);
    let parked: Rc<RefCell<Vec<(Forward, core_playback::MediaEvent)>>> = Rc::default();
    let queue = Rc::clone(&parked);

    proxy.set_events_middleware([(
        MediaEventName::CanPlay,
        interceptor(move |_, event, forward| {
            queue.borrow_mut().push((forward, event));
            anyhow::bail!("buffer check unavailable")
        }),
    )]);

    let results = element.fire("canplay");
    assert!(results[0].is_err());
    assert_eq!(seen.borrow().len(), 1);

    let (forward, event) = parked.borrow_mut().pop().unwrap();
    forward.forward(event);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_dispatch_raw_rejects_unknown_events() {
    let (proxy, _element) = build_proxy(ProxyOptions::default());
    let err = proxy
        .dispatch_raw(&RawMediaEvent::new("webkitbeginfullscreen"))
        .unwrap_err();
    assert!(matches!(err, PlaybackError::UnknownEvent(_)));
    assert!(proxy.dispatch_raw(&RawMediaEvent::new("pause")).is_ok());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_event_is_classified() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Error.into()]);

    element.update(|state| {
        state.current_time = Some(3.0);
        state.error = Some(MediaErrorInfo::new(2, "connection reset"));
    });
    element.fire("error");

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    let error = events[0].as_error().unwrap();
    assert_eq!(error.error_type, ErrorType::Network);
    assert_eq!(error.code, 2);
    assert_eq!(error.message, "connection reset");
    assert_eq!(error.context.current_time, 3.0);
    assert_eq!(error.context.ready_state, 4);
    assert_eq!(proxy.error_note(), Some("MEDIA_ERR_NETWORK"));
}

#[test]
fn test_error_forwarded_by_middleware_is_classified() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Error.into()]);
    element.update(|state| state.error = Some(MediaErrorInfo::new(3, "bad frame")));

    proxy.set_events_middleware([(
        MediaEventName::Error,
        interceptor(|_, event, forward| {
            forward.forward(event);
            Ok(())
        }),
    )]);

    proxy
        .dispatch(MediaEventName::Error, &RawMediaEvent::new("error"))
        .unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    let error = events[0].as_error().unwrap();
    assert_eq!(error.error_type, ErrorType::Decode);
    assert_eq!(error.message, "bad frame");
}

#[test]
fn test_error_through_failing_middleware_is_classified() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Error.into()]);
    element.update(|state| state.error = Some(MediaErrorInfo::new(3, "bad frame")));

    proxy.set_events_middleware([(
        MediaEventName::Error,
        interceptor(|_, _, _| Err(anyhow::anyhow!("reporter offline"))),
    )]);

    let err = proxy
        .dispatch(MediaEventName::Error, &RawMediaEvent::new("error"))
        .unwrap_err();
    assert!(matches!(
        err,
        PlaybackError::Middleware {
            event: MediaEventName::Error,
            ..
        }
    ));

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_error().unwrap().error_type, ErrorType::Decode);
}

#[test]
fn test_error_event_without_element_error_is_dropped() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Error.into()]);

    element.fire("error");
    assert!(seen.borrow().is_empty());
    assert_eq!(proxy.error_note(), None);
}

#[test]
fn test_unknown_error_code() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Error.into()]);

    element.update(|state| state.error = Some(MediaErrorInfo::new(5, "")));
    element.fire("error");

    assert_eq!(seen.borrow()[0].as_error().unwrap().error_type, ErrorType::Other);
    assert_eq!(proxy.error_note(), None);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_buffered_range_around_playhead() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    element.update(|state| {
        state.buffered = vec![(0.0, 5.0), (7.0, 10.0)];
        state.current_time = Some(3.0);
    });
    assert_eq!(proxy.get_buffered_range(None), BufferedRange::new(0.0, 5.0));

    element.update(|state| state.current_time = Some(6.0));
    assert_eq!(proxy.get_buffered_range(None), BufferedRange::ZERO);

    let override_ranges = TimeRanges::new(vec![(5.5, 6.5)]);
    assert_eq!(
        proxy.get_buffered_range(Some(&override_ranges)),
        BufferedRange::new(5.5, 6.5)
    );
}

#[test]
fn test_buffered_views() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    element.update(|state| {
        state.buffered = vec![(6.0, 9.0), (0.2, 3.0), (3.3, 5.0)];
        state.current_time = Some(4.0);
    });

    assert_eq!(
        proxy.buffered2(),
        vec![BufferedRange::new(0.0, 5.0), BufferedRange::new(6.0, 9.0)]
    );
    assert_eq!(proxy.buffered_point(), BufferedRange::new(3.3, 5.0));
}

#[test]
fn test_property_forwarding() {
    let (proxy, element) = build_proxy(ProxyOptions::default());

    proxy.set_volume(0.25);
    proxy.set_playback_rate(1.5);
    proxy.set_current_time(42.0);

    assert_eq!(proxy.volume(), 0.25);
    assert_eq!(proxy.playback_rate(), 1.5);
    assert_eq!(element.default_playback_rate(), 1.5);
    assert_eq!(proxy.current_time(), 42.0);
    assert!(proxy.paused());
    assert_eq!(proxy.ready_state(), 4);
    assert_eq!(proxy.can_play_type("video/mp4").unwrap(), CanPlayType::Probably);

    let play = proxy.play().unwrap();
    assert!(futures::executor::block_on(play).is_ok());
    assert!(!proxy.paused());

    proxy.pause();
    assert!(proxy.paused());
}

// ============================================================================
// Source changes
// ============================================================================

#[test]
fn test_set_src_assigns_after_urlchange() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let observed_src = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&observed_src);
    let observed = element.clone();
    proxy.on(EventKind::UrlChange, move |event: &ProxyEvent| {
        if let ProxyEvent::UrlChange { url } = event {
            *sink.borrow_mut() = Some((url.clone(), observed.src()));
        }
    });

    element.update(|state| state.duration = 30.0);
    element.fire("durationchange");

    let outcome = proxy.set_src("https://cdn.example.com/a.mp4");
    assert_eq!(outcome, SrcAssignment::Assigned);
    assert_eq!(element.src(), "https://cdn.example.com/a.mp4");
    assert_eq!(proxy.duration(), 0.0);

    // Subscribers saw the new URL while the element still had the old one.
    assert_eq!(
        observed_src.borrow().clone(),
        Some(("https://cdn.example.com/a.mp4".to_string(), String::new()))
    );
}

#[test]
fn test_set_src_defers_for_in_memory_current_src() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Waiting.into(), EventKind::UrlChange]);
    element.update(|state| state.current_src = "blob:https://site/42".to_string());

    let outcome = proxy.set_src("https://cdn.example.com/b.m3u8");
    assert_eq!(outcome, SrcAssignment::Deferred);
    assert_eq!(element.src(), "");

    let events = seen.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind(), EventKind::UrlChange);
    let waiting = events[1].as_media().unwrap();
    assert_eq!(waiting.event_name, MediaEventName::Waiting);
    assert!(waiting.raw.synthetic);
}

#[test]
fn test_set_src_defers_for_in_memory_src_attribute() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    element.update(|state| state.src = "blob:https://site/7".to_string());

    assert_eq!(proxy.set_src("https://cdn.example.com/c.flv"), SrcAssignment::Deferred);
    assert_eq!(element.src(), "blob:https://site/7");
}

#[test]
fn test_synthesized_waiting_bypasses_middleware() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Waiting.into()]);
    proxy.set_events_middleware([(MediaEventName::Waiting, interceptor(|_, _, _| Ok(())))]);
    element.update(|state| state.current_src = "blob:https://site/1".to_string());

    proxy.set_src("https://cdn.example.com/d.mp4");
    assert_eq!(seen.borrow().len(), 1);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_destroy_releases_everything() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[EventKind::Destroy, MediaEventName::Play.into()]);
    let cancelled = Rc::new(Cell::new(false));
    let flag = Rc::clone(&cancelled);
    proxy.register_interval("stall-check", CallbackTimer::new(move || flag.set(true)));

    element.update(|state| state.src = "https://cdn.example.com/e.mp4".to_string());
    element.update(|state| state.current_time = Some(9.0));
    element.fire("timeupdate");

    proxy.destroy();

    assert!(proxy.is_destroyed());
    assert!(cancelled.get());
    assert!(!proxy.has_interval("stall-check"));
    assert!(element.state.borrow().src_removed);
    assert_eq!(element.state.borrow().pause_calls, 1);
    assert_eq!(element.listener_count(), 0);
    assert!(proxy.element().is_none());
    assert!(proxy.media_config().is_none());
    assert_eq!(proxy.current_time(), 0.0);
    assert_eq!(proxy.volume(), 0.0);
    assert!(proxy.play().is_none());

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Destroy);
    assert_eq!(proxy.listener_count(EventKind::Destroy), 0);
}

#[test]
fn test_double_destroy_is_noop() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let destroyed = Rc::new(Cell::new(0));
    let counter = Rc::clone(&destroyed);
    proxy.on(EventKind::Destroy, move |_| counter.set(counter.get() + 1));

    proxy.destroy();
    proxy.destroy();

    assert_eq!(destroyed.get(), 1);
    assert_eq!(element.state.borrow().pause_calls, 1);
}

#[test]
fn test_destroy_from_event_handler() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Ended.into(), EventKind::Destroy]);
    proxy.on(MediaEventName::Ended, |event: &ProxyEvent| {
        if let Some(player) = event.as_media().and_then(|event| event.player()) {
            player.destroy();
        }
    });

    let results = element.fire("ended");
    assert!(results.iter().all(|result| result.is_ok()));
    assert!(proxy.is_destroyed());
    assert_eq!(element.listener_count(), 0);

    // The recorder subscribed before the destroying handler ran.
    assert_eq!(seen.borrow().len(), 2);
    element.fire("ended");
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_destroy_from_middleware() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    let seen = record(&proxy, &[MediaEventName::Emptied.into()]);
    proxy.set_events_middleware([(
        MediaEventName::Emptied,
        interceptor(|proxy, event, forward| {
            proxy.destroy();
            forward.forward(event);
            Ok(())
        }),
    )]);

    element.fire("emptied");
    assert!(proxy.is_destroyed());
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_mutations_after_destroy_are_ignored() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    proxy.destroy();

    assert_eq!(proxy.set_src("https://cdn.example.com/f.mp4"), SrcAssignment::Detached);
    proxy.set_has_start(true);
    assert!(!proxy.has_start());
    proxy.attach_video_events(Some(&(element.clone() as Rc<dyn MediaElement>)));
    assert_eq!(element.listener_count(), 0);
    assert!(proxy.swap_element(FakeElement::new()).is_none());

    let cancelled = Rc::new(Cell::new(false));
    let flag = Rc::clone(&cancelled);
    proxy.register_interval("late", CallbackTimer::new(move || flag.set(true)));
    assert!(cancelled.get());
    assert!(matches!(
        proxy.can_play_type("video/mp4"),
        Err(PlaybackError::NoElement)
    ));
}

#[test]
fn test_dropping_proxy_disarms_listeners() {
    let (proxy, element) = build_proxy(ProxyOptions::default());
    drop(proxy);

    let results = element.fire("play");
    assert!(results.iter().all(|result| result.is_ok()));
}

#[test]
fn test_replacing_interval_cancels_previous() {
    let (proxy, _element) = build_proxy(ProxyOptions::default());
    let first = Rc::new(Cell::new(false));
    let flag = Rc::clone(&first);
    proxy.register_interval("poll", CallbackTimer::new(move || flag.set(true)));
    proxy.register_interval("poll", CallbackTimer::new(|| {}));

    assert!(first.get());
    assert!(proxy.clear_interval("poll"));
    assert!(!proxy.clear_interval("poll"));
}
