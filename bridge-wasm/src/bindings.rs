//! JavaScript bindings for the media proxy
//!
//! Exposes [`MediaProxy`] to page scripts as `JsMediaProxy`.
//!
//! # Example
//!
//! ```javascript
//! const proxy = new JsMediaProxy(document.getElementById('player'), {
//!   autoplayMuted: true,
//!   'x5-video-player-type': 'h5',
//! });
//! const id = proxy.on('error', (err) => console.warn(err.errorType, err.code));
//! proxy.setSrc('https://cdn.example.com/movie.mp4');
//! await proxy.play();
//! proxy.off(id);
//! proxy.destroy();
//! ```

use crate::environment::UserAgentPlatform;
use crate::error::js_message;
use crate::media_element::WebElementFactory;
use crate::timers::IntervalTimer;
use core_playback::{EventKind, MediaProxy, ProxyEvent, ProxyOptions, SrcAssignment};
use core_runtime::events::SubscriptionId;
use js_sys::Function as JsFunction;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::warn;
use wasm_bindgen::prelude::*;

// =============================================================================
// Error Handling
// =============================================================================

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn event_payload(event: &ProxyEvent) -> JsValue {
    match event {
        ProxyEvent::Media(event) => JsValue::from_str(event.event_name.as_str()),
        ProxyEvent::Error(error) => {
            serde_wasm_bindgen::to_value(error).unwrap_or_else(|err| to_js_error(err))
        }
        ProxyEvent::UrlChange { url } => JsValue::from_str(url),
        ProxyEvent::HasStart { has_start } => JsValue::from_bool(*has_start),
        ProxyEvent::Destroy => JsValue::UNDEFINED,
    }
}

// =============================================================================
// Media Proxy
// =============================================================================

/// JavaScript-accessible media proxy
#[wasm_bindgen]
pub struct JsMediaProxy {
    proxy: MediaProxy,
    subscriptions: RefCell<HashMap<u32, (EventKind, SubscriptionId)>>,
    next_handle: Cell<u32>,
}

#[wasm_bindgen]
impl JsMediaProxy {
    /// Create the media element inside `container` using `options`
    /// (camelCase keys, vendor keys may be hyphenated).
    #[wasm_bindgen(constructor)]
    pub fn new(container: Option<web_sys::Element>, options: JsValue) -> Result<JsMediaProxy, JsValue> {
        console_error_panic_hook::set_once();

        let options: ProxyOptions = if options.is_undefined() || options.is_null() {
            ProxyOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
        };
        options.validate().map_err(to_js_error)?;

        let factory = WebElementFactory::new(container).map_err(to_js_error)?;
        let platform = UserAgentPlatform::from_window().map_err(to_js_error)?;
        let proxy = MediaProxy::builder(options)
            .element_factory(factory)
            .platform(platform)
            .build()
            .map_err(to_js_error)?;

        Ok(Self {
            proxy,
            subscriptions: RefCell::new(HashMap::new()),
            next_handle: Cell::new(1),
        })
    }

    /// Subscribe `callback` to an event name (`timeupdate`, `urlchange`, ...).
    /// Returns a handle for [`off`](Self::off).
    pub fn on(&self, event: &str, callback: JsFunction) -> Result<u32, JsValue> {
        let kind: EventKind = event.parse().map_err(to_js_error)?;
        let id = self.proxy.on(kind, move |event: &ProxyEvent| {
            if let Err(err) = callback.call1(&JsValue::NULL, &event_payload(event)) {
                warn!(event = %event.kind(), error = %js_message(&err), "subscriber threw");
            }
        });

        let handle = self.next_handle.get();
        self.next_handle.set(handle.wrapping_add(1));
        self.subscriptions.borrow_mut().insert(handle, (kind, id));
        Ok(handle)
    }

    /// Remove a subscription created by [`on`](Self::on).
    pub fn off(&self, handle: u32) -> bool {
        let entry = self.subscriptions.borrow_mut().remove(&handle);
        entry.map_or(false, |(kind, id)| self.proxy.off(kind, id))
    }

    /// Request a new source. Returns `assigned`, `deferred` or `detached`.
    #[wasm_bindgen(js_name = setSrc)]
    pub fn set_src(&self, url: &str) -> String {
        match self.proxy.set_src(url) {
            SrcAssignment::Assigned => "assigned",
            SrcAssignment::Deferred => "deferred",
            SrcAssignment::Detached => "detached",
        }
        .to_string()
    }

    /// Start playback. Resolves once playback begins.
    pub fn play(&self) -> Option<js_sys::Promise> {
        self.proxy.play().map(|play| {
            wasm_bindgen_futures::future_to_promise(async move {
                play.await.map(|_| JsValue::UNDEFINED).map_err(to_js_error)
            })
        })
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.proxy.pause();
    }

    /// Current position in seconds.
    #[wasm_bindgen(getter, js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.proxy.current_time()
    }

    /// Seek to `seconds`.
    #[wasm_bindgen(setter, js_name = currentTime)]
    pub fn set_current_time(&self, seconds: f64) {
        self.proxy.set_current_time(seconds);
    }

    /// Duration as of the last `durationchange`.
    #[wasm_bindgen(getter)]
    pub fn duration(&self) -> f64 {
        self.proxy.duration()
    }

    /// `[start, end]` of the buffered interval around the playhead.
    #[wasm_bindgen(js_name = getBufferedRange)]
    pub fn get_buffered_range(&self) -> Vec<f64> {
        self.proxy.get_buffered_range(None).as_pair().to_vec()
    }

    /// Name of the current media error code.
    #[wasm_bindgen(getter, js_name = errorNote)]
    pub fn error_note(&self) -> Option<String> {
        self.proxy.error_note().map(str::to_string)
    }

    /// Whether playback has started.
    #[wasm_bindgen(getter, js_name = hasStart)]
    pub fn has_start(&self) -> bool {
        self.proxy.has_start()
    }

    /// Set the started flag. Non-boolean values are ignored.
    #[wasm_bindgen(setter, js_name = hasStart)]
    pub fn set_has_start(&self, value: JsValue) {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(value) {
            Ok(value) => {
                self.proxy.set_has_start_value(&value);
            }
            Err(err) => warn!(error = %err, "ignoring started flag"),
        }
    }

    /// Call `callback` every `millis` milliseconds until cleared or destroyed.
    #[wasm_bindgen(js_name = setInterval)]
    pub fn set_interval(&self, key: &str, millis: u32, callback: JsFunction) {
        let timer = IntervalTimer::new(millis, move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                warn!(error = %js_message(&err), "interval callback threw");
            }
        });
        self.proxy.register_interval(key, timer);
    }

    /// Cancel the interval registered under `key`.
    #[wasm_bindgen(js_name = clearInterval)]
    pub fn clear_interval(&self, key: &str) -> bool {
        self.proxy.clear_interval(key)
    }

    /// Tear the proxy down. Safe to call more than once.
    pub fn destroy(&self) {
        self.subscriptions.borrow_mut().clear();
        self.proxy.destroy();
    }
}
