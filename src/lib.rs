//! Workspace facade crate.
//!
//! Re-exports the media proxy and its bridge traits so host applications can
//! depend on `media-proxy-workspace` alone. The browser adapters are pulled in
//! with the `wasm` feature on `wasm32` targets.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;

pub use core_playback::{
    BufferedRange, ClassifiedError, ErrorType, EventKind, MediaConfig, MediaEvent,
    MediaEventName, MediaProxy, MediaProxyBuilder, PlaybackError, ProxyEvent, ProxyOptions,
    SrcAssignment, ThroughputSampler,
};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm;
