//! Hardware-facing side of the Luxline display driver
//!
//! - [`bus`]: timed read and write cycles over two port expanders
//! - [`display`]: cursor, direct and scroll text, control word, flash
//!   RAM, user-defined characters and self-test
//! - [`mcp23s17`]: SPI port expander implementing
//!   [`PortExpander`](luxline_hal::PortExpander)
//!
//! # Example
//!
//! ```ignore
//! let u1 = Mcp23s17::new(spi_u1, 0);
//! let u2 = Mcp23s17::new(spi_u2, 1);
//! let mut display = Display::new(u1, u2, delay, DisplayConfig::dual())?;
//! display.begin()?;
//! display.write_str("HELLO")?;
//!
//! display.set_mode(Mode::Scroll);
//! display.write_str("Grüße aus der Werkstatt")?;
//! loop {
//!     display.poll(now_ms())?;
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod display;
pub mod mcp23s17;

#[cfg(test)]
mod mock;

pub use bus::{BusSequencer, Error};
pub use display::{Display, Mode};
pub use mcp23s17::Mcp23s17;
