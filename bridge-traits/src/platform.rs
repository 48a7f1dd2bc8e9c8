//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so bridge implementations such as
//! clocks and log sinks can be shared with `tracing` layers and async tasks.
//! WebAssembly builds run entirely on a single thread and cannot satisfy those
//! bounds because browser-provided objects (e.g., `web_sys` types) are not
//! thread-safe. The helper traits below make the required bounds conditional
//! without duplicating every trait definition.
//!
//! Media elements are deliberately *not* bound by these markers: they live on
//! the host's UI event loop on every target.

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
