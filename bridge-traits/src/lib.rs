//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the host
//! that owns the actual media element. Each trait represents a capability the
//! core requires but that is implemented differently per platform (browser,
//! embedded webview, native test harness).
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - Playable element: attributes, play/pause, buffered ranges, listeners
//! - [`ElementFactory`](media::ElementFactory) - Creates configured elements
//!
//! ### Environment
//! - [`PlatformSniffer`](environment::PlatformSniffer) - Browser/OS facts that affect element configuration
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`TimerHandle`](time::TimerHandle) - Cancellable host timers
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Web      | `bridge-wasm`       |
//! | Tests    | in-memory fakes in each crate's `tests/` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific failures (e.g.
//! rejected `play()` promises) into `BridgeError` with an actionable message.
//!
//! ## Threading
//!
//! Media elements live on the host's UI thread, so [`MediaElement`] and its
//! listeners are `Rc`-based and not `Send`. Clocks and log sinks use the
//! [`PlatformSendSync`](platform::PlatformSendSync) marker so native builds
//! can share them with `tracing` layers.

pub mod environment;
pub mod error;
pub mod media;
pub mod platform;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use environment::{OsFamily, PlatformSniffer, StaticPlatform};
pub use media::{
    AttributeValue, CanPlayType, ElementFactory, EventListener, MediaAttributes, MediaElement,
    MediaErrorInfo, MediaKind, PlayFuture, RawMediaEvent, TimeRanges,
};
pub use time::{
    CallbackTimer, Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock, TimerHandle,
};
