//! # Proxy Configuration
//!
//! Host options for a media proxy and the element attribute set derived from
//! them.

use crate::error::{PlaybackError, Result};
use bridge_traits::{AttributeValue, MediaAttributes, MediaKind, PlatformSniffer};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Attribute carrying the element kind through the merged attribute set.
pub const MEDIA_TYPE_ATTRIBUTE: &str = "mediaType";

const X5_PLAYER_TYPE_ATTRIBUTE: &str = "x5-video-player-type";

/// Inline playback hints dropped when the X5 player type takes over.
const INLINE_ATTRIBUTES: [&str; 3] = ["playsinline", "webkit-playsinline", "x5-playsinline"];

/// Options supplied by the host when building a proxy.
///
/// Keys are camelCase. The vendor keys also accept their hyphenated
/// attribute spelling (`x5-video-player-type`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOptions {
    /// Start playback automatically.
    ///
    /// Default: false.
    #[serde(default)]
    pub autoplay: bool,

    /// Start muted so autoplay policies allow playback.
    ///
    /// Default: false.
    #[serde(default)]
    pub autoplay_muted: bool,

    /// Loop the media.
    ///
    /// Default: false.
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// Play inline instead of entering native fullscreen on mobile.
    ///
    /// Default: true.
    #[serde(default = "default_playsinline")]
    pub playsinline: bool,

    /// Allow AirPlay.
    ///
    /// Default: false.
    #[serde(default)]
    pub airplay: bool,

    /// X5 webview fullscreen mode.
    #[serde(default, alias = "x5-video-player-fullscreen")]
    pub x5_video_player_fullscreen: Option<bool>,

    /// X5 webview orientation (`portrait`, `landscape`, ...).
    #[serde(default, alias = "x5-video-orientation")]
    pub x5_video_orientation: Option<String>,

    /// X5 webview player type (e.g. `h5`). Only honored in WeChat on Android.
    #[serde(default, alias = "x5-video-player-type")]
    pub x5_video_player_type: Option<String>,

    /// Element kind to create.
    ///
    /// Default: video.
    #[serde(default)]
    pub media_type: MediaKind,

    /// Attribute overrides merged over the defaults.
    #[serde(default)]
    pub video_config: MediaAttributes,

    /// Raw attributes merged last; these win over everything else.
    #[serde(default)]
    pub video_attributes: MediaAttributes,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            autoplay_muted: false,
            looping: false,
            playsinline: default_playsinline(),
            airplay: false,
            x5_video_player_fullscreen: None,
            x5_video_orientation: None,
            x5_video_player_type: None,
            media_type: MediaKind::default(),
            video_config: MediaAttributes::new(),
            video_attributes: MediaAttributes::new(),
        }
    }
}

impl ProxyOptions {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let options: Self = serde_json::from_value(value)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.x5_video_player_type.as_deref(), Some(kind) if kind.trim().is_empty()) {
            return Err(PlaybackError::InvalidOptions(
                "x5VideoPlayerType must not be empty".to_string(),
            ));
        }
        if matches!(self.x5_video_orientation.as_deref(), Some(o) if o.trim().is_empty()) {
            return Err(PlaybackError::InvalidOptions(
                "x5VideoOrientation must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_autoplay_muted(mut self, muted: bool) -> Self {
        self.autoplay_muted = muted;
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_media_type(mut self, kind: MediaKind) -> Self {
        self.media_type = kind;
        self
    }

    pub fn with_x5_player_type(mut self, player_type: impl Into<String>) -> Self {
        self.x5_video_player_type = Some(player_type.into());
        self
    }

    pub fn with_video_config(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.video_config.insert(name.into(), value.into());
        self
    }

    pub fn with_video_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.video_attributes.insert(name.into(), value.into());
        self
    }
}

fn default_playsinline() -> bool {
    true
}

/// Resolved element configuration: kind plus the attributes to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    pub kind: MediaKind,
    pub attributes: MediaAttributes,
}

impl MediaConfig {
    /// Build the attribute set for `options` on `platform`.
    pub fn from_options(options: &ProxyOptions, platform: &dyn PlatformSniffer) -> Self {
        let mut attributes = MediaAttributes::new();
        let mut put = |name: &str, value: Option<AttributeValue>| {
            if let Some(value) = value {
                attributes.insert(name.to_string(), value);
            }
        };

        put("controls", Some(false.into()));
        put("autoplay", Some(options.autoplay.into()));
        put("playsinline", Some(options.playsinline.into()));
        put("x5-playsinline", Some(options.playsinline.into()));
        put("webkit-playsinline", Some(options.playsinline.into()));
        put(
            "x5-video-player-fullscreen",
            options.x5_video_player_fullscreen.map(AttributeValue::from),
        );
        put(
            "x5-video-orientation",
            options.x5_video_orientation.clone().map(AttributeValue::from),
        );
        put("airplay", Some(options.airplay.into()));
        put("webkit-airplay", Some(options.airplay.into()));
        put("tabindex", Some(2.into()));
        put(
            MEDIA_TYPE_ATTRIBUTE,
            Some(options.media_type.tag_name().into()),
        );

        attributes.extend(options.video_config.clone());
        attributes.extend(options.video_attributes.clone());

        if let Some(player_type) = options.x5_video_player_type.as_deref() {
            if platform.is_wechat() && platform.is_android() {
                debug!(player_type, "applying X5 player type");
                attributes.insert(X5_PLAYER_TYPE_ATTRIBUTE.to_string(), player_type.into());
                for name in INLINE_ATTRIBUTES {
                    attributes.remove(name);
                }
            }
        }

        if options.looping {
            attributes.insert("loop".to_string(), "loop".into());
        }

        let kind = match attributes.remove(MEDIA_TYPE_ATTRIBUTE) {
            Some(AttributeValue::Text(value)) => value.parse().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring media type attribute");
                options.media_type
            }),
            _ => options.media_type,
        };

        Self { kind, attributes }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{OsFamily, StaticPlatform};

    #[test]
    fn test_default_options() {
        let options = ProxyOptions::default();
        assert!(options.playsinline);
        assert!(!options.autoplay);
        assert_eq!(options.media_type, MediaKind::Video);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_from_json_accepts_aliases() {
        let options = ProxyOptions::from_json(
            r#"{
                "autoplayMuted": true,
                "loop": true,
                "x5-video-player-type": "h5",
                "x5VideoOrientation": "landscape",
                "mediaType": "audio",
                "videoAttributes": { "crossorigin": "anonymous" }
            }"#,
        )
        .unwrap();

        assert!(options.autoplay_muted);
        assert!(options.looping);
        assert!(options.playsinline);
        assert_eq!(options.x5_video_player_type.as_deref(), Some("h5"));
        assert_eq!(options.x5_video_orientation.as_deref(), Some("landscape"));
        assert_eq!(options.media_type, MediaKind::Audio);
        assert_eq!(
            options.video_attributes.get("crossorigin"),
            Some(&AttributeValue::from("anonymous"))
        );
    }

    #[test]
    fn test_options_validation() {
        let err = ProxyOptions::from_json(r#"{ "x5VideoPlayerType": " " }"#).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidOptions(_)));

        let err = ProxyOptions::from_json(r#"{ "autoplay": "yes" }"#).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidOptions(_)));
    }

    #[test]
    fn test_default_attribute_set() {
        let config = MediaConfig::from_options(&ProxyOptions::default(), &StaticPlatform::default());

        assert_eq!(config.kind, MediaKind::Video);
        assert_eq!(config.attribute("controls"), Some(&AttributeValue::Bool(false)));
        assert_eq!(config.attribute("playsinline"), Some(&AttributeValue::Bool(true)));
        assert_eq!(config.attribute("tabindex"), Some(&AttributeValue::Number(2.0)));
        assert!(config.attribute("x5-video-orientation").is_none());
        assert!(config.attribute("loop").is_none());
        assert!(config.attribute(MEDIA_TYPE_ATTRIBUTE).is_none());
    }

    #[test]
    fn test_raw_attributes_win() {
        let options = ProxyOptions::default()
            .with_video_config("controls", true)
            .with_video_config("preload", "auto")
            .with_video_attribute("controls", false)
            .with_video_attribute(MEDIA_TYPE_ATTRIBUTE, "audio");

        let config = MediaConfig::from_options(&options, &StaticPlatform::default());
        assert_eq!(config.attribute("controls"), Some(&AttributeValue::Bool(false)));
        assert_eq!(config.attribute("preload"), Some(&AttributeValue::from("auto")));
        assert_eq!(config.kind, MediaKind::Audio);
    }

    #[test]
    fn test_x5_player_type_on_wechat_android() {
        let options = ProxyOptions::default().with_x5_player_type("h5").with_loop(true);

        let config =
            MediaConfig::from_options(&options, &StaticPlatform::new(true, OsFamily::Android));
        assert_eq!(config.attribute("x5-video-player-type"), Some(&AttributeValue::from("h5")));
        assert!(config.attribute("playsinline").is_none());
        assert!(config.attribute("webkit-playsinline").is_none());
        assert!(config.attribute("x5-playsinline").is_none());
        assert_eq!(config.attribute("loop"), Some(&AttributeValue::from("loop")));

        let config = MediaConfig::from_options(&options, &StaticPlatform::new(true, OsFamily::Ios));
        assert!(config.attribute("x5-video-player-type").is_none());
        assert!(config.attribute("playsinline").is_some());
    }

    #[test]
    fn test_unknown_media_type_falls_back() {
        let options = ProxyOptions::default()
            .with_media_type(MediaKind::Audio)
            .with_video_attribute(MEDIA_TYPE_ATTRIBUTE, "hologram");
        let config = MediaConfig::from_options(&options, &StaticPlatform::default());
        assert_eq!(config.kind, MediaKind::Audio);
    }
}
