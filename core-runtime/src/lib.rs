//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Synchronous named event emitter
//!
//! ## Overview
//!
//! This crate contains the runtime utilities other modules depend on. It
//! establishes the logging conventions and the single-threaded publish /
//! subscribe mechanism the media proxy uses to talk to its host.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{EventEmitter, Listener, SubscriptionId};
