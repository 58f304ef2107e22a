//! Board-agnostic logic for alphanumeric LED display modules
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Display configuration (module wiring, register map, timing)
//! - Topology resolver (logical position -> module and local address)
//! - Register model (control word, register address spaces)
//! - Per-position flash bitmap
//! - Streaming character translator
//! - Scroll text buffer

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod flash;
pub mod register;
pub mod scroll;
pub mod topology;
pub mod translate;

pub use config::{ConfigError, DisplayConfig};
pub use flash::FlashBitmap;
pub use register::{Brightness, ControlWord, Register};
pub use scroll::ScrollBuffer;
pub use topology::{Location, Target, Topology};
pub use translate::Translator;
