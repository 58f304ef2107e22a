//! Luxline Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the display driver needs
//! from the board. The display bus is never wired to MCU pins directly;
//! it is reached through port-expander chips that expose whole 8-bit
//! ports, so the abstraction is a port expander rather than single pins.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  luxline-drivers (bus sequencer, text)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  luxline-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   MCP23S17    │       │  other 16-bit │
//! │  (SPI, HAEN)  │       │   expanders   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::PortExpander`] - Two 8-bit ports with per-pin direction

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

// Re-export key traits at crate root for convenience
pub use gpio::{Direction, Port, PortExpander};
