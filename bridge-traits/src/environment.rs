//! Host environment detection.
//!
//! Browser and OS sniffing is owned by the host; the core only asks the
//! handful of questions that change how a media element is configured.

use serde::{Deserialize, Serialize};

/// Operating system family reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Android,
    Ios,
    Windows,
    MacOs,
    Linux,
    #[default]
    Unknown,
}

/// Answers environment questions relevant to element configuration.
pub trait PlatformSniffer {
    /// Running inside the WeChat in-app browser (X5 webview).
    fn is_wechat(&self) -> bool;

    fn os_family(&self) -> OsFamily;

    fn is_android(&self) -> bool {
        self.os_family() == OsFamily::Android
    }
}

/// Fixed environment description, for hosts that sniff once up front and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaticPlatform {
    pub wechat: bool,
    pub os: OsFamily,
}

impl StaticPlatform {
    pub fn new(wechat: bool, os: OsFamily) -> Self {
        Self { wechat, os }
    }
}

impl PlatformSniffer for StaticPlatform {
    fn is_wechat(&self) -> bool {
        self.wechat
    }

    fn os_family(&self) -> OsFamily {
        self.os
    }
}
