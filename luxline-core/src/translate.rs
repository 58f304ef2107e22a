//! Character translator
//!
//! Streaming decoder from two-byte UTF-8 sequences to the single-byte
//! HDSP-2112 character set. ASCII passes through unchanged (the device
//! font aliases ASCII in 0x20-0x7F), user-defined-character codes
//! 128-143 pass through unchanged, and a small table maps accented
//! Latin characters onto the extended glyphs in 0x00-0x1F.
//!
//! The decoder is fed one byte at a time and keeps at most one pending
//! lead byte between calls, so a sequence split across two writes still
//! decodes.

use crate::register::{UDC_COUNT, UDC_FIRST_CODE};

/// First byte value treated as a lead byte
pub const LEAD_THRESHOLD: u8 = 0xC0;

/// Last code of the user-defined-character range
const UDC_LAST_CODE: u8 = UDC_FIRST_CODE + UDC_COUNT - 1;

/// `(lead, continuation) -> device code`
const TABLE: [((u8, u8), u8); 10] = [
    ((0xC3, 0x84), 0x13), // Ä
    ((0xC3, 0x96), 0x14), // Ö
    ((0xC3, 0x9C), 0x15), // Ü
    ((0xC3, 0xA4), 0x16), // ä
    ((0xC3, 0xB6), 0x17), // ö
    ((0xC3, 0xBC), 0x18), // ü
    ((0xC3, 0x9F), 0x19), // ß
    ((0xC2, 0xB5), 0x1A), // µ
    ((0xC2, 0xB0), 0x1D), // °
    ((0xC2, 0xA3), 0x1E), // £
];

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// No pending lead byte
    Idle,
    /// Waiting for the continuation of this lead byte
    Pending(u8),
}

/// Look up a two-byte sequence in the device table
pub fn lookup(lead: u8, continuation: u8) -> Option<u8> {
    TABLE
        .iter()
        .find(|(key, _)| *key == (lead, continuation))
        .map(|(_, code)| *code)
}

/// Streaming UTF-8 to device-code translator
#[derive(Debug, Clone)]
pub struct Translator {
    state: DecodeState,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// Create a translator in the idle state
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Whether a lead byte is waiting for its continuation
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DecodeState::Pending(_))
    }

    /// Drop any pending lead byte
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
    }

    /// Feed one input byte
    ///
    /// Returns `Some(code)` when a device character is complete, `None`
    /// when the byte was absorbed (lead byte) or dropped (unmapped
    /// sequence, stray continuation byte).
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        match self.state {
            DecodeState::Idle => match byte {
                0x00..=0x7F => Some(byte),
                UDC_FIRST_CODE..=UDC_LAST_CODE => Some(byte),
                LEAD_THRESHOLD..=0xFF => {
                    self.state = DecodeState::Pending(byte);
                    None
                }
                // Continuation byte without a lead
                _ => None,
            },
            DecodeState::Pending(lead) => {
                // Completed or not, the sequence ends here
                self.state = DecodeState::Idle;
                lookup(lead, byte)
            }
        }
    }
}
