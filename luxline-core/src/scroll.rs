//! Scroll text buffer
//!
//! Holds a payload between one screen of leading blanks and one screen
//! of trailing blanks. Each tick shows the window starting at the scroll
//! offset and moves the offset one position to the right; after the
//! payload has fully left the screen the offset wraps to the start.

use heapless::Vec;

/// Device code of a blank
pub const BLANK: u8 = b' ';

/// Padded text buffer with a sliding window
#[derive(Debug, Clone)]
pub struct ScrollBuffer<const N: usize> {
    text: Vec<u8, N>,
    offset: usize,
    width: usize,
}

impl<const N: usize> Default for ScrollBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ScrollBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            text: Vec::new(),
            offset: 0,
            width: 0,
        }
    }

    /// Replace the contents with `payload` padded by `width` blanks on each side
    ///
    /// The payload is truncated to leave room for the trailing blanks.
    /// Returns the number of payload bytes stored. `width` must leave
    /// room for both pads (`2 * width <= N`); otherwise the width is
    /// reduced to fit.
    pub fn load(&mut self, payload: &[u8], width: usize) -> usize {
        let width = width.min(N / 2);
        let room = N - 2 * width;
        let stored = payload.len().min(room);

        self.text.clear();
        self.offset = 0;
        self.width = width;

        // Lengths are bounded by N above, pushes cannot fail
        for _ in 0..width {
            let _ = self.text.push(BLANK);
        }
        let _ = self.text.extend_from_slice(&payload[..stored]);
        for _ in 0..width {
            let _ = self.text.push(BLANK);
        }

        stored
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.text.clear();
        self.offset = 0;
    }

    /// Padded text
    pub fn as_slice(&self) -> &[u8] {
        &self.text
    }

    /// Length of the padded text
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Current scroll offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Screen width the buffer was padded for
    pub fn width(&self) -> usize {
        self.width
    }

    /// Characters visible at the current offset
    pub fn window(&self) -> &[u8] {
        let start = self.offset.min(self.text.len());
        let end = (self.offset + self.width).min(self.text.len());
        &self.text[start..end]
    }

    /// Move the window one position right, wrapping after a full cycle
    pub fn advance(&mut self) {
        self.offset += 1;
        if self.offset > self.text.len().saturating_sub(self.width) {
            self.offset = 0;
        }
    }
}
