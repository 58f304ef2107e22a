//! Text and scroll engine
//!
//! [`Display`] owns the cursor, the control-word cache, the character
//! translator and the scroll buffer, and turns text operations into bus
//! cycles through a [`BusSequencer`].
//!
//! # Modes
//!
//! - [`Mode::Direct`]: each translated character is written at the
//!   cursor, which then moves one position right. Characters past the
//!   last position are dropped.
//! - [`Mode::Scroll`]: a buffer write ([`Display::write_bytes`],
//!   [`Display::write_str`]) replaces the scroll text; the caller drives
//!   the animation by calling [`Display::poll`] from its main loop.
//!   Single bytes and formatted text still go to the cursor.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use luxline_core::config::{ConfigError, DisplayConfig, FORMAT_CAPACITY, SCROLL_CAPACITY};
use luxline_core::flash::FlashBitmap;
use luxline_core::register::{Brightness, ControlWord, Register, UDC_COUNT, UDC_ROWS};
use luxline_core::scroll::{ScrollBuffer, BLANK};
use luxline_core::topology::{Target, Topology};
use luxline_core::translate::Translator;
use luxline_hal::PortExpander;

use crate::bus::{BusSequencer, Error};

/// Glyph rows only use the low five bits (5 columns)
const UDC_ROW_MASK: u8 = 0b0001_1111;

/// Text output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Characters go straight to the cursor position
    #[default]
    Direct,
    /// Buffer writes load the scroll text, [`Display::poll`] animates it
    Scroll,
}

/// Alphanumeric display made of one or more modules on a shared bus
pub struct Display<D, C, T> {
    bus: BusSequencer<D, C, T>,
    topology: Topology,
    control_word: ControlWord,
    flash: FlashBitmap,
    translator: Translator,
    pos: usize,
    mode: Mode,
    scroll: ScrollBuffer<SCROLL_CAPACITY>,
    last_tick_ms: u32,
}

impl<D, C, T, E> Display<D, C, T>
where
    D: PortExpander<Error = E>,
    C: PortExpander<Error = E>,
    T: DelayNs,
{
    /// Create a display; call [`Self::begin`] before use
    ///
    /// # Arguments
    /// - `data`: expander carrying the address and data ports
    /// - `control`: expander carrying the control port
    /// - `delay`: busy-wait delay provider
    /// - `config`: hardware variant
    pub fn new(data: D, control: C, delay: T, config: DisplayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let topology = Topology::from_config(&config);
        Ok(Self {
            bus: BusSequencer::new(data, control, delay, config),
            topology,
            control_word: ControlWord::new(),
            flash: FlashBitmap::new(topology.total_width()),
            translator: Translator::new(),
            pos: 0,
            mode: Mode::Direct,
            scroll: ScrollBuffer::new(),
            last_tick_ms: 0,
        })
    }

    /// Initialize the expanders and reset every module
    pub fn begin(&mut self) -> Result<(), Error<E>> {
        self.bus.init()?;
        self.after_reset()
    }

    /// Hardware reset of every module
    ///
    /// The cursor returns to 0, scrolling stops and the cached control
    /// word (brightness, flash, blink) is written back to the modules.
    /// Flash RAM is cleared by the reset.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.bus.reset()?;
        self.after_reset()
    }

    fn after_reset(&mut self) -> Result<(), Error<E>> {
        self.pos = 0;
        self.mode = Mode::Direct;
        self.translator.reset();
        self.scroll.clear();
        self.flash = FlashBitmap::new(self.topology.total_width());
        self.write_control_word(self.topology.all_modules())
    }

    /// Give back the expanders and the delay
    pub fn release(self) -> (D, C, T) {
        self.bus.into_parts()
    }

    /// Module arrangement
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Number of character positions
    pub fn total_width(&self) -> usize {
        self.topology.total_width()
    }

    /// Set the cursor, clamped to the last position
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = self.topology.clamp(pos);
    }

    /// Cursor position; equals [`Self::total_width`] when the line is full
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Select direct or scroll mode
    ///
    /// Leaving scroll mode drops the scroll text; the characters on
    /// screen stay as they are.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Direct {
            self.scroll.clear();
        }
        self.mode = mode;

        #[cfg(feature = "defmt")]
        defmt::debug!("display mode {}", mode);
    }

    /// Current output mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current scroll offset into the padded scroll text
    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset()
    }

    /// Whether the translator holds an unfinished multi-byte sequence
    pub fn is_decoding(&self) -> bool {
        self.translator.is_pending()
    }

    /// Write one input byte at the cursor; returns 1
    ///
    /// Always uses the direct path, also in scroll mode, so a character
    /// can be streamed byte by byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<usize, Error<E>> {
        self.write_direct(&[byte])
    }

    /// Write a byte stream in the current mode
    ///
    /// In scroll mode the whole buffer becomes the new scroll text.
    ///
    /// Returns the number of input bytes consumed, which is always
    /// `bytes.len()`; dropped or absorbed bytes count as consumed.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error<E>> {
        match self.mode {
            Mode::Direct => self.write_direct(bytes),
            Mode::Scroll => self.load_scroll(bytes),
        }
    }

    /// Write a string in the current mode
    pub fn write_str(&mut self, text: &str) -> Result<usize, Error<E>> {
        self.write_bytes(text.as_bytes())
    }

    /// Format text and write it directly, starting at `pos`
    ///
    /// The text is rendered into a buffer of [`FORMAT_CAPACITY`] bytes.
    /// Text that does not fit is not written at all and `Ok(0)` is
    /// returned.
    ///
    /// ```ignore
    /// display.write_at(0, format_args!("T={:3}C", temp))?;
    /// ```
    pub fn write_at(&mut self, pos: usize, args: fmt::Arguments<'_>) -> Result<usize, Error<E>> {
        let mut text: String<FORMAT_CAPACITY> = String::new();
        if fmt::Write::write_fmt(&mut text, args).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("formatted text exceeds {} bytes, dropped", FORMAT_CAPACITY);
            return Ok(0);
        }

        self.set_pos(pos);
        self.write_direct(text.as_bytes())
    }

    fn write_direct(&mut self, bytes: &[u8]) -> Result<usize, Error<E>> {
        for &byte in bytes {
            if let Some(code) = self.translator.feed(byte) {
                self.put_code(code)?;
            }
        }
        Ok(bytes.len())
    }

    /// Write a device code at the cursor and advance it
    fn put_code(&mut self, code: u8) -> Result<(), Error<E>> {
        if self.pos >= self.topology.total_width() {
            return Ok(());
        }

        let location = self.topology.resolve(self.pos);
        self.write(Register::Character(location.address), code, location.target())?;
        self.pos += 1;
        Ok(())
    }

    fn load_scroll(&mut self, bytes: &[u8]) -> Result<usize, Error<E>> {
        let mut codes: Vec<u8, SCROLL_CAPACITY> = Vec::new();
        for &byte in bytes {
            if let Some(code) = self.translator.feed(byte) {
                // Overflow is truncated by the scroll buffer anyway
                let _ = codes.push(code);
            }
        }

        let stored = self.scroll.load(&codes, self.topology.total_width());
        if stored < codes.len() {
            #[cfg(feature = "defmt")]
            defmt::warn!("scroll text truncated to {} characters", stored);
        }

        self.scroll_tick()?;
        Ok(bytes.len())
    }

    /// Poll the scroll animation
    ///
    /// Call this from the main loop with a millisecond timestamp. At most
    /// one redraw happens per call, and only once more than the scroll
    /// period has passed since the previous one. Returns `true` when the
    /// screen was redrawn.
    pub fn poll(&mut self, now_ms: u32) -> Result<bool, Error<E>> {
        if self.mode != Mode::Scroll || self.scroll.is_empty() {
            return Ok(false);
        }
        let period = self.bus.config().timing.scroll_period_ms;
        if now_ms.wrapping_sub(self.last_tick_ms) <= period {
            return Ok(false);
        }

        self.last_tick_ms = now_ms;
        self.scroll_tick()?;
        Ok(true)
    }

    /// Redraw the window at the scroll offset, then advance the offset
    fn scroll_tick(&mut self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("scroll tick at offset {}", self.scroll.offset());

        self.pos = 0;
        for i in 0..self.scroll.window().len() {
            let code = self.scroll.window()[i];
            self.put_code(code)?;
        }
        self.scroll.advance();
        Ok(())
    }

    /// Cached control word
    pub fn control_word(&self) -> ControlWord {
        self.control_word
    }

    /// Set the brightness of every module
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<(), Error<E>> {
        self.control_word.set_brightness(brightness);
        self.write_control_word(self.topology.all_modules())
    }

    /// Enable or disable flashing of the positions selected by [`Self::set_flash_bits`]
    pub fn set_flash_enable(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.control_word.set_flash_enable(enable);
        self.write_control_word(self.topology.all_modules())
    }

    /// Blink the whole display
    pub fn set_blink_enable(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.control_word.set_blink_enable(enable);
        self.write_control_word(self.topology.all_modules())
    }

    /// Flash bitmap last written to the modules
    pub fn flash_bits(&self) -> FlashBitmap {
        self.flash
    }

    /// Select which positions flash once flash is enabled
    ///
    /// `bitmap` must cover exactly [`Self::total_width`] positions; start
    /// from [`Self::flash_bits`] to get one of the right width. Every
    /// position is written, so positions not set in `bitmap` stop
    /// flashing.
    pub fn set_flash_bits(&mut self, bitmap: FlashBitmap) -> Result<(), Error<E>> {
        if bitmap.width() != self.topology.total_width() {
            return Err(Error::WidthMismatch);
        }

        for (pos, flashing) in bitmap.iter() {
            let location = self.topology.resolve(pos);
            self.write(Register::Flash(location.address), flashing as u8, location.target())?;
            self.flash.set(pos, flashing);
        }
        Ok(())
    }

    /// Make one position flash or stop flashing
    pub fn set_flash_at(&mut self, pos: usize, flashing: bool) -> Result<(), Error<E>> {
        if pos >= self.topology.total_width() {
            return Err(Error::InvalidTarget);
        }

        let location = self.topology.resolve(pos);
        self.write(Register::Flash(location.address), flashing as u8, location.target())?;
        self.flash.set(pos, flashing);
        Ok(())
    }

    /// Blank every position and clear flash RAM
    ///
    /// Uses the control-word clear bit, which wipes character and flash
    /// RAM of every module. Use [`Self::blank`] to keep the flash
    /// settings. The cursor returns to 0.
    pub fn clear(&mut self) -> Result<(), Error<E>> {
        let all = self.topology.all_modules();
        self.control_word.set_clear(true);
        let result = self.write_control_word(all);
        self.control_word.set_clear(false);
        result?;

        let hold = self.bus.config().timing.clear_hold_ms;
        self.bus.hold_ms(hold);
        self.write_control_word(all)?;
        self.flash = FlashBitmap::new(self.topology.total_width());
        self.pos = 0;
        Ok(())
    }

    /// Write a blank to every position, keeping flash RAM
    ///
    /// The cursor returns to 0.
    pub fn blank(&mut self) -> Result<(), Error<E>> {
        self.pos = 0;
        for _ in 0..self.topology.total_width() {
            self.put_code(BLANK)?;
        }
        self.pos = 0;
        Ok(())
    }

    /// Program one user-defined character (shown for code `128 + index`)
    ///
    /// # Arguments
    /// - `index`: glyph slot, 0-15
    /// - `rows`: 7 rows top to bottom, 5 pixels each in bits 4-0
    pub fn set_udc_glyph(&mut self, index: u8, rows: &[u8; UDC_ROWS]) -> Result<(), Error<E>> {
        if index >= UDC_COUNT {
            return Err(Error::InvalidGlyph);
        }

        let all = self.topology.all_modules();
        self.write(Register::UdcAddress, index, all)?;
        for (row, &bits) in rows.iter().enumerate() {
            self.write(Register::UdcRow(row as u8), bits & UDC_ROW_MASK, all)?;
        }
        Ok(())
    }

    /// Program consecutive user-defined characters starting at slot 0
    pub fn set_udc_font(&mut self, glyphs: &[[u8; UDC_ROWS]]) -> Result<(), Error<E>> {
        if glyphs.len() > UDC_COUNT as usize {
            return Err(Error::InvalidGlyph);
        }
        for (index, rows) in glyphs.iter().enumerate() {
            self.set_udc_glyph(index as u8, rows)?;
        }
        Ok(())
    }

    /// Run the built-in self-test of one module
    ///
    /// Blocks for the self-test hold time (several seconds). Returns
    /// `Ok(true)` when the module reports a pass. The module's display
    /// content is lost.
    pub fn self_test(&mut self, module: u8) -> Result<bool, Error<E>> {
        let target = Target::Module(module);
        if !self.topology.contains(target) {
            return Err(Error::InvalidTarget);
        }
        let timing = self.bus.config().timing;

        #[cfg(feature = "defmt")]
        defmt::debug!("self-test module {} started", module);

        self.control_word.set_self_test(true);
        let started = self.write_control_word(target);
        if started.is_err() {
            self.control_word.set_self_test(false);
        }
        started?;

        self.bus.hold_ms(timing.self_test_hold_ms);
        self.control_word.set_self_test(false);
        self.write_control_word(target)?;
        self.bus.hold_ms(timing.self_test_settle_ms);

        let address = Register::ControlWord.address(&self.bus.config().registers);
        let word = ControlWord::from_bits(self.bus.read_register(address, module)?);
        let passed = word.self_test_ok();

        #[cfg(feature = "defmt")]
        if passed {
            defmt::info!("self-test module {} passed", module);
        } else {
            defmt::warn!("self-test module {} failed", module);
        }

        Ok(passed)
    }

    fn write_control_word(&mut self, target: Target) -> Result<(), Error<E>> {
        self.write(Register::ControlWord, self.control_word.bits(), target)
    }

    /// Write a register, holding FL low for flash RAM
    fn write(&mut self, register: Register, data: u8, target: Target) -> Result<(), Error<E>> {
        let address = register.address(&self.bus.config().registers);
        if register.uses_flash_line() {
            self.bus.write_flash(address, data, target)
        } else {
            self.bus.write_register(address, data, target)
        }
    }
}

/// Formatting always writes directly at the cursor, whatever the mode
impl<D, C, T, E> fmt::Write for Display<D, C, T>
where
    D: PortExpander<Error = E>,
    C: PortExpander<Error = E>,
    T: DelayNs,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_direct(s.as_bytes())
            .map(|_| ())
            .map_err(|_| fmt::Error)
    }
}
