//! # Media Event Types
//!
//! Names and payloads of everything the proxy emits to its subscribers.
//!
//! Raw element events are identified by [`MediaEventName`]. Subscribers
//! register against an [`EventKind`], which additionally covers the proxy's
//! own lifecycle signals (`urlchange`, `hasstart`, `destroy`). Every delivered
//! payload is a [`ProxyEvent`].

use crate::media_error::ClassifiedError;
use crate::proxy::{MediaProxy, WeakMediaProxy};
use bridge_traits::RawMediaEvent;
use std::fmt;
use std::str::FromStr;

/// The fixed set of element events the proxy listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaEventName {
    Play,
    Playing,
    Pause,
    Ended,
    Error,
    Seeking,
    Seeked,
    TimeUpdate,
    Waiting,
    CanPlay,
    CanPlayThrough,
    DurationChange,
    VolumeChange,
    LoadedData,
    LoadStart,
    Emptied,
    RateChange,
    Progress,
    Stalled,
    Suspend,
    Abort,
}

impl MediaEventName {
    /// Every handled event, in attach order.
    pub const ALL: [MediaEventName; 21] = [
        MediaEventName::Play,
        MediaEventName::Playing,
        MediaEventName::Pause,
        MediaEventName::Ended,
        MediaEventName::Error,
        MediaEventName::Seeking,
        MediaEventName::Seeked,
        MediaEventName::TimeUpdate,
        MediaEventName::Waiting,
        MediaEventName::CanPlay,
        MediaEventName::CanPlayThrough,
        MediaEventName::DurationChange,
        MediaEventName::VolumeChange,
        MediaEventName::LoadedData,
        MediaEventName::LoadStart,
        MediaEventName::Emptied,
        MediaEventName::RateChange,
        MediaEventName::Progress,
        MediaEventName::Stalled,
        MediaEventName::Suspend,
        MediaEventName::Abort,
    ];

    /// DOM event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaEventName::Play => "play",
            MediaEventName::Playing => "playing",
            MediaEventName::Pause => "pause",
            MediaEventName::Ended => "ended",
            MediaEventName::Error => "error",
            MediaEventName::Seeking => "seeking",
            MediaEventName::Seeked => "seeked",
            MediaEventName::TimeUpdate => "timeupdate",
            MediaEventName::Waiting => "waiting",
            MediaEventName::CanPlay => "canplay",
            MediaEventName::CanPlayThrough => "canplaythrough",
            MediaEventName::DurationChange => "durationchange",
            MediaEventName::VolumeChange => "volumechange",
            MediaEventName::LoadedData => "loadeddata",
            MediaEventName::LoadStart => "loadstart",
            MediaEventName::Emptied => "emptied",
            MediaEventName::RateChange => "ratechange",
            MediaEventName::Progress => "progress",
            MediaEventName::Stalled => "stalled",
            MediaEventName::Suspend => "suspend",
            MediaEventName::Abort => "abort",
        }
    }
}

impl FromStr for MediaEventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaEventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown media event: {s}"))
    }
}

impl fmt::Display for MediaEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription key: an element event or one of the proxy lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Media(MediaEventName),
    /// A new source URL was requested.
    UrlChange,
    /// The started flag was assigned.
    HasStart,
    /// The proxy is being torn down. Always the last event.
    Destroy,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Media(name) => name.as_str(),
            EventKind::UrlChange => "urlchange",
            EventKind::HasStart => "hasstart",
            EventKind::Destroy => "destroy",
        }
    }
}

impl From<MediaEventName> for EventKind {
    fn from(name: MediaEventName) -> Self {
        EventKind::Media(name)
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urlchange" => Ok(EventKind::UrlChange),
            "hasstart" => Ok(EventKind::HasStart),
            "destroy" => Ok(EventKind::Destroy),
            other => other.parse().map(EventKind::Media),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized element event: the raw payload plus name and player back-reference.
#[derive(Clone)]
pub struct MediaEvent {
    pub event_name: MediaEventName,
    pub raw: RawMediaEvent,
    player: WeakMediaProxy,
}

impl MediaEvent {
    pub fn new(event_name: MediaEventName, raw: RawMediaEvent, player: WeakMediaProxy) -> Self {
        Self {
            event_name,
            raw,
            player,
        }
    }

    /// The proxy that produced the event, if it is still alive.
    pub fn player(&self) -> Option<MediaProxy> {
        self.player.upgrade()
    }
}

impl fmt::Debug for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaEvent")
            .field("event_name", &self.event_name)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Payload delivered to proxy subscribers.
#[derive(Debug, Clone)]
pub enum ProxyEvent {
    Media(MediaEvent),
    /// Classified media error, delivered under the `error` event.
    Error(ClassifiedError),
    UrlChange { url: String },
    HasStart { has_start: bool },
    Destroy,
}

impl ProxyEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProxyEvent::Media(event) => EventKind::Media(event.event_name),
            ProxyEvent::Error(_) => EventKind::Media(MediaEventName::Error),
            ProxyEvent::UrlChange { .. } => EventKind::UrlChange,
            ProxyEvent::HasStart { .. } => EventKind::HasStart,
            ProxyEvent::Destroy => EventKind::Destroy,
        }
    }

    pub fn as_media(&self) -> Option<&MediaEvent> {
        match self {
            ProxyEvent::Media(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ClassifiedError> {
        match self {
            ProxyEvent::Error(error) => Some(error),
            _ => None,
        }
    }
}
