//! Register model
//!
//! The HDSP-2112 exposes five register spaces on five address lines.
//! The control-word register packs brightness, flash, blink, clear and
//! self-test fields into one byte; the device has no partial-field
//! writes, so the whole byte is cached and re-sent on every change.

use bitfield::bitfield;

use crate::config::RegisterMap;

/// Rows per user-defined character (5 columns x 7 rows)
pub const UDC_ROWS: usize = 7;

/// Number of user-defined characters in device RAM
pub const UDC_COUNT: u8 = 16;

/// Device code of the first user-defined character
pub const UDC_FIRST_CODE: u8 = 128;

/// Mask of the module-local character address
const LOCAL_MASK: u8 = 0b0000_0111;

bitfield! {
    /// Control-word register
    ///
    /// - Bit 7: Clear flash and character RAM
    /// - Bit 6: Self-test request
    /// - Bit 5: Self-test result (read-only, 1 = passed)
    /// - Bit 4: Blink whole display
    /// - Bit 3: Flash enable (positions selected by flash RAM)
    /// - Bits 2-0: Brightness (0 = 100%, 7 = 0%)
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ControlWord(u8);
    impl Debug;
    pub u8, brightness_level, set_brightness_level: 2, 0;
    pub flash_enable, set_flash_enable: 3;
    pub blink_enable, set_blink_enable: 4;
    pub self_test_ok, _: 5;
    pub self_test, set_self_test: 6;
    pub clear, set_clear: 7;
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControlWord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ControlWord({=u8:#010b})", self.0)
    }
}

impl ControlWord {
    /// Power-on value: full brightness, everything off
    pub const fn new() -> Self {
        Self(0)
    }

    /// Wrap a raw byte, e.g. one read back from the device
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw byte to send to the device
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Current brightness
    pub fn brightness(&self) -> Brightness {
        Brightness::new(self.brightness_level())
    }

    /// Replace the brightness field, leaving the other fields untouched
    pub fn set_brightness(&mut self, brightness: Brightness) {
        self.set_brightness_level(brightness.level());
    }
}

/// Display brightness level
///
/// Level 0 is the brightest. Out-of-range levels are masked to 3 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u8);

impl Brightness {
    /// Nominal relative brightness per level, in percent
    const PERCENT: [u8; 8] = [100, 80, 53, 40, 27, 20, 13, 0];

    /// Brightest setting
    pub const FULL: Self = Self(0);

    /// Blanked display
    pub const OFF: Self = Self(7);

    /// Create a brightness level (0-7)
    pub const fn new(level: u8) -> Self {
        Self(level & 0b111)
    }

    /// Register value (0-7)
    pub const fn level(&self) -> u8 {
        self.0
    }

    /// Nominal brightness in percent
    pub const fn percent(&self) -> u8 {
        Self::PERCENT[self.0 as usize]
    }
}

/// Register address spaces of one module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// UDC address register (selects the glyph being programmed)
    UdcAddress,
    /// UDC RAM row (0-6) of the selected glyph
    UdcRow(u8),
    /// Control-word register
    ControlWord,
    /// Character RAM at a module-local position
    Character(u8),
    /// Flash RAM at a module-local position
    Flash(u8),
}

impl Register {
    /// Physical address on the address port
    ///
    /// Addresses are the same on every module; only the bus target
    /// differs.
    pub fn address(self, map: &RegisterMap) -> u8 {
        match self {
            Register::UdcAddress => map.udc_address,
            Register::UdcRow(row) => map.udc_ram | (row & LOCAL_MASK),
            Register::ControlWord => map.control_word,
            Register::Character(pos) => map.character_ram | (pos & LOCAL_MASK),
            Register::Flash(pos) => map.flash_ram | (pos & LOCAL_MASK),
        }
    }

    /// Flash RAM is selected by the FL line instead of an address bit
    pub const fn uses_flash_line(self) -> bool {
        matches!(self, Register::Flash(_))
    }
}
