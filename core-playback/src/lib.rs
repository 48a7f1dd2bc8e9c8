//! # Media Playback Module
//!
//! Proxy around a single playable media element.
//!
//! ## Overview
//!
//! This module handles:
//! - Element construction from host options (`config`)
//! - Event routing through per-event middleware (`middleware`)
//! - Classification of native media errors (`media_error`)
//! - Buffered range queries (`buffered`)
//! - Download speed sampling (`throughput`)
//!
//! The element itself is supplied by a bridge crate through the
//! `bridge_traits::MediaElement` and `ElementFactory` traits.

pub mod buffered;
pub mod config;
pub mod error;
pub mod events;
pub mod media_error;
pub mod middleware;
pub mod proxy;
pub mod throughput;

pub use buffered::BufferedRange;
pub use config::{MediaConfig, ProxyOptions};
pub use error::{PlaybackError, Result};
pub use events::{EventKind, MediaEvent, MediaEventName, ProxyEvent};
pub use media_error::{ClassifiedError, ErrorContext, ErrorType};
pub use middleware::{interceptor, Forward, Interceptor, MiddlewareRegistry};
pub use proxy::{MediaProxy, MediaProxyBuilder, SrcAssignment, WeakMediaProxy};
pub use throughput::ThroughputSampler;
