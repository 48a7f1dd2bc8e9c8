//! # Media Error Classification
//!
//! Maps the element's native error code onto a stable [`ErrorType`] and
//! captures the playback context at the moment the error surfaced.

use bridge_traits::{MediaElement, MediaErrorInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human readable names of the standard codes, indexed by `code - 1`.
const ERROR_NOTES: [&str; 4] = [
    "MEDIA_ERR_ABORTED",
    "MEDIA_ERR_NETWORK",
    "MEDIA_ERR_DECODE",
    "MEDIA_ERR_SRC_NOT_SUPPORTED",
];

/// Stable error category derived from a native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Aborted,
    Network,
    Decode,
    SrcNotSupported,
    Other,
}

impl ErrorType {
    pub fn from_code(code: u16) -> Self {
        match code {
            MediaErrorInfo::MEDIA_ERR_ABORTED => ErrorType::Aborted,
            MediaErrorInfo::MEDIA_ERR_NETWORK => ErrorType::Network,
            MediaErrorInfo::MEDIA_ERR_DECODE => ErrorType::Decode,
            MediaErrorInfo::MEDIA_ERR_SRC_NOT_SUPPORTED => ErrorType::SrcNotSupported,
            _ => ErrorType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Aborted => "aborted",
            ErrorType::Network => "network",
            ErrorType::Decode => "decode",
            ErrorType::SrcNotSupported => "src_not_supported",
            ErrorType::Other => "other",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a standard media error code, `None` outside `1..=4`.
pub fn error_note(code: u16) -> Option<&'static str> {
    usize::from(code)
        .checked_sub(1)
        .and_then(|index| ERROR_NOTES.get(index))
        .copied()
}

/// Element state captured alongside a classified error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    pub current_time: f64,
    pub duration: f64,
    pub network_state: u16,
    pub ready_state: u16,
    pub current_src: String,
    pub src: String,
    pub ended: bool,
}

impl ErrorContext {
    /// Snapshot `element`, using the proxy's view of time and duration.
    pub fn capture(element: &dyn MediaElement, current_time: f64, duration: f64) -> Self {
        Self {
            current_time,
            duration,
            network_state: element.network_state(),
            ready_state: element.ready_state(),
            current_src: element.current_src(),
            src: element.src(),
            ended: element.ended(),
        }
    }
}

/// Normalized error emitted to subscribers under the `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub error_type: ErrorType,
    pub code: u16,
    pub message: String,
    #[serde(flatten)]
    pub context: ErrorContext,
    pub occurred_at: DateTime<Utc>,
}

impl ClassifiedError {
    pub fn note(&self) -> Option<&'static str> {
        error_note(self.code)
    }
}

/// Classify a native error.
pub fn classify(
    info: &MediaErrorInfo,
    context: ErrorContext,
    occurred_at: DateTime<Utc>,
) -> ClassifiedError {
    ClassifiedError {
        error_type: ErrorType::from_code(info.code),
        code: info.code,
        message: info.message.clone(),
        context,
        occurred_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_types() {
        assert_eq!(ErrorType::from_code(1), ErrorType::Aborted);
        assert_eq!(ErrorType::from_code(2), ErrorType::Network);
        assert_eq!(ErrorType::from_code(3), ErrorType::Decode);
        assert_eq!(ErrorType::from_code(4), ErrorType::SrcNotSupported);
        assert_eq!(ErrorType::from_code(0), ErrorType::Other);
        assert_eq!(ErrorType::from_code(42), ErrorType::Other);
    }

    #[test]
    fn error_note_table() {
        assert_eq!(error_note(1), Some("MEDIA_ERR_ABORTED"));
        assert_eq!(error_note(2), Some("MEDIA_ERR_NETWORK"));
        assert_eq!(error_note(4), Some("MEDIA_ERR_SRC_NOT_SUPPORTED"));
        assert_eq!(error_note(0), None);
        assert_eq!(error_note(5), None);
    }

    #[test]
    fn classified_error_serializes_flat() {
        let classified = classify(
            &MediaErrorInfo::new(3, "PIPELINE_ERROR_DECODE"),
            ErrorContext {
                current_time: 12.5,
                ready_state: 2,
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(classified.note(), Some("MEDIA_ERR_DECODE"));

        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["errorType"], "decode");
        assert_eq!(json["currentTime"], 12.5);
        assert_eq!(json["readyState"], 2);
    }
}
