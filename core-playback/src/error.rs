//! # Playback Error Types
//!
//! Errors surfaced by the media proxy. Native media errors are not part of
//! this enum: they are classified and emitted as `error` events instead.

use crate::events::MediaEventName;
use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while driving a media proxy.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The proxy owns no element (creation failed or it was destroyed).
    #[error("No media element attached")]
    NoElement,

    /// A required host capability was not supplied to the builder.
    #[error("Missing capability {capability}: {message}")]
    CapabilityMissing { capability: String, message: String },

    /// An event interceptor failed. The event was still forwarded.
    #[error("Middleware for `{event}` failed: {source}")]
    Middleware {
        event: MediaEventName,
        source: anyhow::Error,
    },

    /// A raw event type outside the handled event set.
    #[error("Unknown media event: {0}")]
    UnknownEvent(String),

    /// Host-supplied options could not be parsed.
    #[error("Invalid proxy options: {0}")]
    InvalidOptions(String),

    /// Error reported by the platform bridge.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the error came from an event interceptor.
    pub fn is_middleware_failure(&self) -> bool {
        matches!(self, PlaybackError::Middleware { .. })
    }

    /// Converts the error into the form element listeners report back to the bridge.
    pub fn into_listener_error(self, event: MediaEventName) -> BridgeError {
        BridgeError::ListenerFailed {
            event: event.to_string(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        PlaybackError::InvalidOptions(err.to_string())
    }
}

/// Result type for proxy operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middleware_failure_maps_to_listener_error() {
        let err = PlaybackError::Middleware {
            event: MediaEventName::Progress,
            source: anyhow::anyhow!("buffer check failed"),
        };
        assert!(err.is_middleware_failure());

        match err.into_listener_error(MediaEventName::Progress) {
            BridgeError::ListenerFailed { event, message } => {
                assert_eq!(event, "progress");
                assert!(message.contains("buffer check failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bridge_errors_convert() {
        let err: PlaybackError = BridgeError::NotAvailable("document".into()).into();
        assert!(!err.is_middleware_failure());
        assert!(err.to_string().contains("document"));
    }
}
