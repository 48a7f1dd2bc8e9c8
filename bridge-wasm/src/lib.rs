//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the media bridge traits
//! defined in `bridge-traits`, built on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `WebMediaElement`: `MediaElement` over an `HTMLMediaElement`
//! - `WebElementFactory`: creates `<video>`/`<audio>` elements in the document
//! - `UserAgentPlatform`: WeChat / OS detection from `navigator.userAgent`
//! - `IntervalTimer`: `setInterval` as a cancellable `TimerHandle`
//! - `JsMediaProxy`: the media proxy exposed to page scripts
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{UserAgentPlatform, WebElementFactory};
//! use core_playback::{MediaProxy, ProxyOptions};
//!
//! let proxy = MediaProxy::builder(ProxyOptions::default())
//!     .element_factory(WebElementFactory::new(Some(container))?)
//!     .platform(UserAgentPlatform::from_window()?)
//!     .build()?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bindings;
pub mod environment;
pub mod error;
pub mod media_element;
pub mod timers;

// Re-export commonly used types
pub use bindings::JsMediaProxy;
pub use environment::UserAgentPlatform;
pub use error::{WasmError, WasmResult};
pub use media_element::{WebElementFactory, WebMediaElement};
pub use timers::IntervalTimer;
