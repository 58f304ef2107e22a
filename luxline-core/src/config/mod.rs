//! Configuration types
//!
//! A display installation is described by a [`DisplayConfig`] chosen at
//! construction time. Hardware revisions differ in module count, module
//! width, register addresses and control-line wiring; each revision is a
//! different value of the same struct.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
