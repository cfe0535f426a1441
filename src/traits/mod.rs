//! Trait definitions for hardware, networking, and storage abstraction.
//!
//! This module defines the seams that allow metar-clock to:
//! - Drive a real serial display or an in-memory double
//! - Fetch observations from HTTP or from canned data
//! - Persist configuration to disk or to memory
//!
//! # Submodules
//!
//! - `hardware`: Serial link, monotonic clock, wall clock, delay
//! - `network`: Observation source and WiFi management
//! - `storage`: Configuration persistence

pub mod hardware;
pub mod network;
pub mod storage;

pub use hardware::*;
pub use network::*;
pub use storage::*;
