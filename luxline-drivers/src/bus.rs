//! Bus sequencer
//!
//! Issues timed cycles on the HDSP-2112 parallel bus. The bus is spread
//! over two port expanders:
//!
//! - the data expander carries the address lines (A0-A4) on one port
//!   and the data lines (D0-D7) on the other
//! - the control expander carries RES, FL, WR, RD and one chip-select
//!   line per module on a single port
//!
//! # Write cycle
//!
//! ```text
//! ADDR/DATA ──<  stable  >──────────────────────
//! CS        ─────┐               ┌──────────────
//!                └───────────────┘
//! WR        ─────────┐       ┌──────────────────
//!                    └───────┘
//!                    |<-tWR->|   (>= 100 ns, 1 µs used)
//! ```
//!
//! Address and data are driven before CS and WR fall, and CS is released
//! only after WR has returned high. All control lines are active-low and
//! idle high.

use embedded_hal::delay::DelayNs;
use luxline_core::config::{DisplayConfig, ExpanderPort};
use luxline_core::topology::Target;
use luxline_hal::{Direction, Port, PortExpander};

/// Bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Port-expander transport error
    Bus(E),
    /// Target names a module that does not exist, or a broadcast read
    InvalidTarget,
    /// User-defined-character index out of range
    InvalidGlyph,
    /// Flash bitmap built for a different number of positions
    WidthMismatch,
}

fn port(port: ExpanderPort) -> Port {
    match port {
        ExpanderPort::A => Port::A,
        ExpanderPort::B => Port::B,
    }
}

/// Timed bus access to a set of display modules
///
/// The sequencer is not reentrant; `&mut self` on every cycle keeps
/// strobe sequences from interleaving.
pub struct BusSequencer<D, C, T> {
    data: D,
    control: C,
    delay: T,
    config: DisplayConfig,
    /// Last value driven on the control port
    ctrl: u8,
}

impl<D, C, T, E> BusSequencer<D, C, T>
where
    D: PortExpander<Error = E>,
    C: PortExpander<Error = E>,
    T: DelayNs,
{
    /// Create a sequencer; no bus activity until [`Self::init`]
    pub fn new(data: D, control: C, delay: T, config: DisplayConfig) -> Self {
        Self {
            data,
            control,
            delay,
            config,
            ctrl: 0xFF,
        }
    }

    /// Configuration the sequencer was built with
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Last value driven on the control port
    pub fn control_lines(&self) -> u8 {
        self.ctrl
    }

    /// Give back the expanders and the delay
    pub fn into_parts(self) -> (D, C, T) {
        (self.data, self.control, self.delay)
    }

    /// Prepare both expanders and reset every module
    ///
    /// Enables hardware addressing (both expanders may share one SPI
    /// chip select), makes every pin an output, idles the control lines
    /// high and pulses RES.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.data.enable_hardware_address().map_err(Error::Bus)?;
        self.control.enable_hardware_address().map_err(Error::Bus)?;

        for p in [Port::A, Port::B] {
            self.data
                .set_port_direction(p, Direction::Output)
                .map_err(Error::Bus)?;
            self.control
                .set_port_direction(p, Direction::Output)
                .map_err(Error::Bus)?;
        }

        self.set_control(0xFF)?;
        self.reset()?;

        #[cfg(feature = "defmt")]
        defmt::info!("display bus ready, {} module(s)", self.config.module_count());

        Ok(())
    }

    /// Hardware reset of every module
    ///
    /// RES and all chip selects are held low for the reset pulse, then
    /// released; the modules need the recovery time before the first
    /// access. Character, flash and control-word RAM are cleared.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        let lines = self.config.control.reset | self.config.all_chip_selects();
        let timing = self.config.timing;

        let pulsed = self
            .drive_low(lines)
            .map(|_| self.delay.delay_us(timing.reset_pulse_us));
        let released = self.drive_high(lines);
        pulsed.and(released)?;
        self.delay.delay_ms(timing.reset_recovery_ms);

        #[cfg(feature = "defmt")]
        defmt::debug!("display reset");

        Ok(())
    }

    /// Busy-wait for the given number of milliseconds
    pub fn hold_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Write one register on the targeted module(s)
    pub fn write_register(&mut self, address: u8, data: u8, target: Target) -> Result<(), Error<E>> {
        let select = self.chip_selects(target)?;
        self.write_cycle(address, data, select)
    }

    /// Write one flash RAM cell on the targeted module(s)
    ///
    /// Flash RAM is selected by holding FL low around the write cycle;
    /// `address` is the module-local position and bit 0 of `data` the
    /// flash flag. FL is released even if the cycle fails.
    pub fn write_flash(&mut self, address: u8, data: u8, target: Target) -> Result<(), Error<E>> {
        let select = self.chip_selects(target)?;
        let flash = self.config.control.flash;

        let result = self
            .drive_low(flash)
            .and_then(|_| self.write_cycle(address, data, select));
        let released = self.drive_high(flash);

        result.and(released)
    }

    /// Read one register from a single module
    ///
    /// The data port is switched to input for the cycle and always
    /// switched back to output afterwards, also when the switch to input
    /// or the cycle fails; the first error is returned.
    pub fn read_register(&mut self, address: u8, module: u8) -> Result<u8, Error<E>> {
        let select = self.chip_selects(Target::Module(module))?;
        let wiring = self.config.wiring;

        self.data
            .write_port(port(wiring.address_port), address)
            .map_err(Error::Bus)?;

        // A partial switch may leave some data pins as inputs
        let value = self
            .data
            .set_port_direction(port(wiring.data_port), Direction::Input)
            .map_err(Error::Bus)
            .and_then(|_| self.read_cycle(select));
        let restored = self
            .data
            .set_port_direction(port(wiring.data_port), Direction::Output)
            .map_err(Error::Bus);

        let value = value?;
        restored?;
        Ok(value)
    }

    /// Chip-select mask for a target, rejected before any bus activity
    fn chip_selects(&self, target: Target) -> Result<u8, Error<E>> {
        match target {
            Target::All => Ok(self.config.all_chip_selects()),
            Target::Module(id) => self.config.chip_select(id).ok_or(Error::InvalidTarget),
        }
    }

    fn write_cycle(&mut self, address: u8, data: u8, select: u8) -> Result<(), Error<E>> {
        let wiring = self.config.wiring;
        let write = self.config.control.write;

        self.data
            .write_port(port(wiring.address_port), address)
            .map_err(Error::Bus)?;
        self.data
            .write_port(port(wiring.data_port), data)
            .map_err(Error::Bus)?;

        let pulse_us = self.config.timing.write_pulse_us;
        let strobed = self
            .drive_low(select)
            .and_then(|_| self.drive_low(write))
            .map(|_| self.delay.delay_us(pulse_us));

        // WR before CS, regardless of how far the cycle got
        let wr_released = self.drive_high(write);
        let cs_released = self.drive_high(select);

        strobed?;
        wr_released?;
        cs_released
    }

    fn read_cycle(&mut self, select: u8) -> Result<u8, Error<E>> {
        let read = self.config.control.read;
        let data_port = port(self.config.wiring.data_port);
        let setup_us = self.config.timing.read_setup_us;

        let value = self
            .drive_low(select)
            .and_then(|_| self.drive_low(read))
            .and_then(|_| {
                self.delay.delay_us(setup_us);
                self.data.read_port(data_port).map_err(Error::Bus)
            });

        // RD before CS, regardless of how far the cycle got
        let rd_released = self.drive_high(read);
        let cs_released = self.drive_high(select);

        let value = value?;
        rd_released?;
        cs_released?;
        Ok(value)
    }

    fn drive_low(&mut self, mask: u8) -> Result<(), Error<E>> {
        self.set_control(self.ctrl & !mask)
    }

    fn drive_high(&mut self, mask: u8) -> Result<(), Error<E>> {
        self.set_control(self.ctrl | mask)
    }

    fn set_control(&mut self, value: u8) -> Result<(), Error<E>> {
        self.ctrl = value;
        self.control
            .write_port(port(self.config.wiring.control_port), value)
            .map_err(Error::Bus)
    }
}
