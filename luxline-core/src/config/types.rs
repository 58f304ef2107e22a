//! Configuration limits and timing parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum display modules per bus
pub const MAX_MODULES: usize = 8;

/// Maximum characters per module (module-local address is 3 bits)
pub const MAX_MODULE_WIDTH: u8 = 8;

/// Maximum logical positions across all modules
pub const MAX_POSITIONS: usize = 64;

/// Characters per HDSP-2112 module
pub const DEFAULT_MODULE_WIDTH: u8 = 8;

/// Scroll text buffer capacity in bytes (blanks included)
pub const SCROLL_CAPACITY: usize = 256;

/// Formatted write buffer capacity in bytes
pub const FORMAT_CAPACITY: usize = 64;

/// Bus and device timing
///
/// The datasheet minimums are far below what a port expander can
/// resolve, so the defaults use the smallest delay primitive available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// WR low time in µs (device minimum 100 ns)
    pub write_pulse_us: u32,
    /// RD low time before sampling in µs
    pub read_setup_us: u32,
    /// RES low time in µs (device minimum 300 ns)
    pub reset_pulse_us: u32,
    /// Wait after reset release in ms (device minimum 110 µs)
    pub reset_recovery_ms: u32,
    /// Time the clear bit is held in ms
    pub clear_hold_ms: u32,
    /// Self-test run time in ms
    pub self_test_hold_ms: u32,
    /// Settle time after the self-test bit is cleared, in ms
    pub self_test_settle_ms: u32,
    /// Scroll tick period in ms
    pub scroll_period_ms: u32,
}

impl Timing {
    /// HDSP-2112 timing driven through SPI port expanders
    pub const HDSP2112: Self = Self {
        write_pulse_us: 1,
        read_setup_us: 1,
        reset_pulse_us: 10,
        reset_recovery_ms: 1,
        clear_hold_ms: 1,
        self_test_hold_ms: 6000,
        self_test_settle_ms: 20,
        scroll_period_ms: 250,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::HDSP2112
    }
}
