//! Per-position flash bitmap
//!
//! One bit per logical position. The most significant used bit is the
//! left-most position, so for a 16 character line `0x8000` selects
//! position 0 and `0x0001` selects position 15.

use crate::config::MAX_POSITIONS;

/// Flash selection for every position of the display line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashBitmap {
    bits: u64,
    width: usize,
}

impl FlashBitmap {
    /// No position flashing
    pub fn new(width: usize) -> Self {
        Self {
            bits: 0,
            width: width.min(MAX_POSITIONS),
        }
    }

    /// Build from a left-aligned bit pattern; bits above `width` are ignored
    pub fn from_bits(bits: u64, width: usize) -> Self {
        let mut map = Self::new(width);
        map.bits = bits & map.mask();
        map
    }

    /// Raw bit pattern
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of positions covered
    pub fn width(&self) -> usize {
        self.width
    }

    fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    fn bit(&self, pos: usize) -> Option<u64> {
        (pos < self.width).then(|| 1u64 << (self.width - 1 - pos))
    }

    /// Whether the position is selected; out-of-range positions never are
    pub fn is_flashing(&self, pos: usize) -> bool {
        self.bit(pos).is_some_and(|b| self.bits & b != 0)
    }

    /// Select or deselect one position; out-of-range positions are ignored
    pub fn set(&mut self, pos: usize, flashing: bool) {
        if let Some(b) = self.bit(pos) {
            if flashing {
                self.bits |= b;
            } else {
                self.bits &= !b;
            }
        }
    }

    /// Iterate `(position, flashing)` from left to right
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        (0..self.width).map(move |pos| (pos, self.is_flashing(pos)))
    }
}
