//! User-agent based [`PlatformSniffer`].

use crate::error::{WasmError, WasmResult};
use bridge_traits::{OsFamily, PlatformSniffer};

/// Answers environment questions from the browser's user agent string.
#[derive(Debug, Clone)]
pub struct UserAgentPlatform {
    user_agent: String,
}

impl UserAgentPlatform {
    /// Read the user agent of the current window.
    pub fn from_window() -> WasmResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".to_string()))?;
        let user_agent = window.navigator().user_agent()?;
        Ok(Self::from_user_agent(user_agent))
    }

    /// Use an explicit user agent string.
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// The user agent this sniffer answers from.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl PlatformSniffer for UserAgentPlatform {
    fn is_wechat(&self) -> bool {
        self.user_agent.to_ascii_lowercase().contains("micromessenger")
    }

    fn os_family(&self) -> OsFamily {
        let ua = &self.user_agent;
        if ua.contains("Android") {
            OsFamily::Android
        } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
            OsFamily::Ios
        } else if ua.contains("Windows") {
            OsFamily::Windows
        } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
            OsFamily::MacOs
        } else if ua.contains("Linux") {
            OsFamily::Linux
        } else {
            OsFamily::Unknown
        }
    }
}
