//! `HTMLMediaElement` adapter and element factory.
//!
//! [`WebMediaElement`] implements [`MediaElement`] over a real DOM element.
//! Each registered [`EventListener`] is wrapped in a wasm-bindgen closure that
//! stays alive until the listener is removed or the adapter is dropped.

use crate::error::{js_error, WasmError, WasmResult};
use bridge_traits::{
    error::Result as BridgeResult, CanPlayType, ElementFactory, EventListener, MediaAttributes,
    MediaElement, MediaErrorInfo, MediaKind, PlayFuture, RawMediaEvent, TimeRanges,
};
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{trace, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlMediaElement};

type DomCallback = Closure<dyn FnMut(web_sys::Event)>;

struct Registration {
    event_type: String,
    listener: EventListener,
    callback: DomCallback,
}

/// [`MediaElement`] backed by an `HTMLMediaElement`.
pub struct WebMediaElement {
    element: HtmlMediaElement,
    registrations: RefCell<Vec<Registration>>,
}

impl WebMediaElement {
    /// Wrap an existing element.
    pub fn new(element: HtmlMediaElement) -> Self {
        Self {
            element,
            registrations: RefCell::new(Vec::new()),
        }
    }

    /// The underlying DOM element.
    pub fn html_element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl Drop for WebMediaElement {
    fn drop(&mut self) {
        for registration in self.registrations.get_mut().drain(..) {
            let _ = self.element.remove_event_listener_with_callback(
                &registration.event_type,
                registration.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

fn convert_ranges(ranges: web_sys::TimeRanges) -> TimeRanges {
    let pairs = (0..ranges.length())
        .filter_map(|index| match (ranges.start(index), ranges.end(index)) {
            (Ok(start), Ok(end)) => Some((start, end)),
            _ => None,
        })
        .collect();
    TimeRanges::new(pairs)
}

impl MediaElement for WebMediaElement {
    fn play(&self) -> PlayFuture {
        match self.element.play() {
            Ok(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|err| js_error("play", err))
            }
            .boxed_local(),
            Err(err) => futures::future::ready(Err(js_error("play", err))).boxed_local(),
        }
    }

    fn pause(&self) {
        if let Err(err) = self.element.pause() {
            warn!(error = %js_error("pause", err), "pause rejected");
        }
    }

    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        CanPlayType::from_dom(&self.element.can_play_type(mime_type))
    }

    fn src(&self) -> String {
        self.element.src()
    }

    fn set_src(&self, url: &str) {
        self.element.set_src(url);
    }

    fn remove_src_attribute(&self) {
        if let Err(err) = self.element.remove_attribute("src") {
            warn!(error = %js_error("removeAttribute", err), "failed to remove src");
        }
    }

    fn current_src(&self) -> String {
        self.element.current_src()
    }

    fn set_current_src(&self, _url: &str) {
        trace!("currentSrc is read-only in browsers");
    }

    fn cross_origin(&self) -> Option<String> {
        self.element.cross_origin()
    }

    fn set_cross_origin(&self, value: Option<&str>) {
        self.element.set_cross_origin(value);
    }

    fn preload(&self) -> String {
        self.element.preload()
    }

    fn set_preload(&self, value: &str) {
        self.element.set_preload(value);
    }

    fn current_time(&self) -> Option<f64> {
        let time = self.element.current_time();
        (!time.is_nan()).then_some(time)
    }

    fn set_current_time(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn buffered(&self) -> TimeRanges {
        convert_ranges(self.element.buffered())
    }

    fn played(&self) -> TimeRanges {
        convert_ranges(self.element.played())
    }

    fn seekable(&self) -> TimeRanges {
        convert_ranges(self.element.seekable())
    }

    fn paused(&self) -> bool {
        self.element.paused()
    }

    fn ended(&self) -> bool {
        self.element.ended()
    }

    fn seeking(&self) -> bool {
        self.element.seeking()
    }

    fn network_state(&self) -> u16 {
        self.element.network_state()
    }

    fn ready_state(&self) -> u16 {
        self.element.ready_state()
    }

    fn error(&self) -> Option<MediaErrorInfo> {
        self.element
            .error()
            .map(|error| MediaErrorInfo::new(error.code(), error.message()))
    }

    fn autoplay(&self) -> bool {
        self.element.autoplay()
    }

    fn set_autoplay(&self, value: bool) {
        self.element.set_autoplay(value);
    }

    fn looping(&self) -> bool {
        self.element.loop_()
    }

    fn set_looping(&self, value: bool) {
        self.element.set_loop(value);
    }

    fn muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&self, value: bool) {
        self.element.set_muted(value);
    }

    fn default_muted(&self) -> bool {
        self.element.default_muted()
    }

    fn set_default_muted(&self, value: bool) {
        self.element.set_default_muted(value);
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&self, value: f64) {
        self.element.set_volume(value);
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.element.set_playback_rate(rate);
    }

    fn default_playback_rate(&self) -> f64 {
        self.element.default_playback_rate()
    }

    fn set_default_playback_rate(&self, rate: f64) {
        self.element.set_default_playback_rate(rate);
    }

    fn add_event_listener(&self, event_type: &str, listener: &EventListener) {
        let mut registrations = self.registrations.borrow_mut();
        if registrations.iter().any(|registration| {
            registration.event_type == event_type && Rc::ptr_eq(&registration.listener, listener)
        }) {
            return;
        }

        let handler = Rc::clone(listener);
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let raw = RawMediaEvent::new(event.type_()).with_timestamp(event.time_stamp());
            if let Err(err) = handler(&raw) {
                warn!(event = %raw.event_type, error = %err, "media listener failed");
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        if let Err(err) = self
            .element
            .add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())
        {
            warn!(event = event_type, error = %js_error("addEventListener", err), "listener not installed");
            return;
        }

        registrations.push(Registration {
            event_type: event_type.to_string(),
            listener: Rc::clone(listener),
            callback,
        });
    }

    fn remove_event_listener(&self, event_type: &str, listener: &EventListener) {
        let removed = {
            let mut registrations = self.registrations.borrow_mut();
            let position = registrations.iter().position(|registration| {
                registration.event_type == event_type
                    && Rc::ptr_eq(&registration.listener, listener)
            });
            position.map(|index| registrations.remove(index))
        };

        if let Some(registration) = removed {
            let _ = self.element.remove_event_listener_with_callback(
                event_type,
                registration.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Creates media elements in the current document.
pub struct WebElementFactory {
    document: Document,
    container: Option<Element>,
}

impl WebElementFactory {
    /// Factory for the window's document. Elements are appended to
    /// `container` when one is given.
    pub fn new(container: Option<Element>) -> WasmResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| WasmError::NotAvailable("document".to_string()))?;
        Ok(Self {
            document,
            container,
        })
    }

    fn create(&self, kind: MediaKind, attributes: &MediaAttributes) -> WasmResult<HtmlMediaElement> {
        let element = self
            .document
            .create_element(kind.tag_name())?
            .dyn_into::<HtmlMediaElement>()
            .map_err(|_| WasmError::ElementType("HTMLMediaElement"))?;

        for (name, value) in attributes.iter().filter(|(_, value)| value.is_truthy()) {
            element.set_attribute(name, &value.to_string())?;
        }

        if let Some(container) = &self.container {
            container.append_child(&element)?;
        }
        Ok(element)
    }
}

impl ElementFactory for WebElementFactory {
    fn create_element(
        &self,
        kind: MediaKind,
        attributes: &MediaAttributes,
    ) -> BridgeResult<Rc<dyn MediaElement>> {
        let element = self.create(kind, attributes)?;
        trace!(kind = %kind, "media element created");
        Ok(Rc::new(WebMediaElement::new(element)))
    }
}
