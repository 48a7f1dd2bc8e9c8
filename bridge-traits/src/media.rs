//! Media element bridge traits and supporting types.
//!
//! The core playback proxy never talks to a browser directly. It drives a
//! [`MediaElement`], which mirrors the capability surface of an HTML media
//! element: typed attribute access, `play`/`pause`, buffered interval
//! queries, the current error and DOM-style event listeners. Hosts create
//! elements through an [`ElementFactory`] so the proxy stays agnostic of how
//! the element is inserted into a document.
//!
//! All of these types are single-threaded: media elements belong to the
//! host's UI event loop, so listeners are `Rc` closures and element handles
//! are `Rc<dyn MediaElement>`.

use crate::error::Result;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Kind of playable element to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Tag name used when creating the element.
    pub fn tag_name(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Value of an element attribute as supplied by host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Whether the attribute should be written to the element at all.
    ///
    /// Factories skip falsy values (`false`, `0`, empty text) so that boolean
    /// attributes like `controls` are simply absent instead of `"false"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Bool(value) => *value,
            AttributeValue::Number(value) => *value != 0.0 && !value.is_nan(),
            AttributeValue::Text(value) => !value.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(f64::from(value))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Ordered attribute set applied to a freshly created element.
pub type MediaAttributes = BTreeMap<String, AttributeValue>;

/// Snapshot of a media element's time ranges (`buffered`, `played`, `seekable`).
///
/// Mirrors the DOM `TimeRanges` interface: indexed `start(i)` / `end(i)`
/// queries in seconds. Ranges are kept exactly as reported, including any
/// inconsistencies, so callers can validate them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new(ranges: Vec<(f64, f64)>) -> Self {
        Self { ranges }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Start of the `index`-th range in seconds.
    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(start, _)| *start)
    }

    /// End of the `index`-th range in seconds.
    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, end)| *end)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ranges.iter().copied()
    }
}

impl From<Vec<(f64, f64)>> for TimeRanges {
    fn from(ranges: Vec<(f64, f64)>) -> Self {
        Self::new(ranges)
    }
}

/// Native media error as exposed by the element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaErrorInfo {
    /// Numeric error code (`1..=4` for standard media errors).
    pub code: u16,
    /// Implementation-specific diagnostic message, possibly empty.
    pub message: String,
}

impl MediaErrorInfo {
    pub const MEDIA_ERR_ABORTED: u16 = 1;
    pub const MEDIA_ERR_NETWORK: u16 = 2;
    pub const MEDIA_ERR_DECODE: u16 = 3;
    pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Answer of [`MediaElement::can_play_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanPlayType {
    No,
    Maybe,
    Probably,
}

impl CanPlayType {
    /// Parse the DOM answer (`""`, `"maybe"`, `"probably"`).
    pub fn from_dom(answer: &str) -> Self {
        match answer {
            "probably" => CanPlayType::Probably,
            "maybe" => CanPlayType::Maybe,
            _ => CanPlayType::No,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanPlayType::No => "",
            CanPlayType::Maybe => "maybe",
            CanPlayType::Probably => "probably",
        }
    }
}

/// Raw event as dispatched by the element.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMediaEvent {
    /// DOM event type, e.g. `"timeupdate"`.
    pub event_type: String,
    /// Host timestamp in milliseconds, `0.0` when unknown.
    pub timestamp: f64,
    /// `true` when the event was produced by the core instead of the element.
    pub synthetic: bool,
}

impl RawMediaEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: 0.0,
            synthetic: false,
        }
    }

    pub fn synthetic(event_type: impl Into<String>) -> Self {
        Self {
            synthetic: true,
            ..Self::new(event_type)
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Completion signal of [`MediaElement::play`].
pub type PlayFuture = LocalBoxFuture<'static, Result<()>>;

/// Listener installed on an element.
///
/// Identity is the `Rc` allocation: registering the same listener twice for
/// the same event type must not create a second registration.
pub type EventListener = Rc<dyn Fn(&RawMediaEvent) -> Result<()>>;

/// Capability surface the playback proxy requires from a playable element.
///
/// Every method takes `&self`; implementations use interior mutability the
/// way DOM objects do. Readers of absent values return the DOM defaults
/// (`0.0`, `false`, empty strings).
pub trait MediaElement {
    // Playback control

    /// Start playback. Resolves when playback actually begins.
    fn play(&self) -> PlayFuture;

    fn pause(&self);

    fn can_play_type(&self, mime_type: &str) -> CanPlayType;

    // Source

    fn src(&self) -> String;

    fn set_src(&self, url: &str);

    /// Remove the `src` attribute entirely (used on teardown).
    fn remove_src_attribute(&self);

    fn current_src(&self) -> String;

    /// Most hosts treat `currentSrc` as read-only and ignore this.
    fn set_current_src(&self, url: &str);

    fn cross_origin(&self) -> Option<String>;

    fn set_cross_origin(&self, value: Option<&str>);

    fn preload(&self) -> String;

    fn set_preload(&self, value: &str);

    // Time

    /// Current playback position, `None` if the element cannot report one.
    fn current_time(&self) -> Option<f64>;

    fn set_current_time(&self, seconds: f64);

    /// Media duration in seconds (`NaN` when unknown, as in the DOM).
    fn duration(&self) -> f64;

    fn buffered(&self) -> TimeRanges;

    fn played(&self) -> TimeRanges;

    fn seekable(&self) -> TimeRanges;

    // State

    fn paused(&self) -> bool;

    fn ended(&self) -> bool;

    fn seeking(&self) -> bool;

    fn network_state(&self) -> u16;

    fn ready_state(&self) -> u16;

    fn error(&self) -> Option<MediaErrorInfo>;

    // Flags & levels

    fn autoplay(&self) -> bool;

    fn set_autoplay(&self, value: bool);

    fn looping(&self) -> bool;

    fn set_looping(&self, value: bool);

    fn muted(&self) -> bool;

    fn set_muted(&self, value: bool);

    fn default_muted(&self) -> bool;

    fn set_default_muted(&self, value: bool);

    fn volume(&self) -> f64;

    fn set_volume(&self, value: f64);

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&self, rate: f64);

    fn default_playback_rate(&self) -> f64;

    fn set_default_playback_rate(&self, rate: f64);

    // Events

    /// Register `listener` for `event_type`. No-op when the same listener is
    /// already registered for that type.
    fn add_event_listener(&self, event_type: &str, listener: &EventListener);

    /// Remove a previously registered listener. Unknown listeners are ignored.
    fn remove_event_listener(&self, event_type: &str, listener: &EventListener);
}

/// Creates playable elements configured with an attribute set.
pub trait ElementFactory {
    /// Create a `kind` element with `attributes` applied.
    ///
    /// Only truthy attribute values (see [`AttributeValue::is_truthy`]) are
    /// written to the element.
    fn create_element(
        &self,
        kind: MediaKind,
        attributes: &MediaAttributes,
    ) -> Result<Rc<dyn MediaElement>>;
}
