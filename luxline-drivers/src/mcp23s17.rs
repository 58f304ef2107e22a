//! MCP23S17 SPI port expander
//!
//! 16 GPIO pins in two 8-bit ports. Registers are addressed in the
//! power-on bank layout (IOCON.BANK = 0). Up to eight expanders can share
//! one SPI chip select once hardware addressing (IOCON.HAEN) is enabled;
//! each then only answers to the opcode carrying its A2..A0 pin strapping.
//!
//! Every access is one SPI transaction:
//!
//! ```text
//! write: [0x40 | addr << 1, register, value]
//! read:  [0x41 | addr << 1, register, --   ] -> value in the third byte
//! ```

use embedded_hal::spi::SpiDevice;
use luxline_hal::gpio::{Direction, Port, PortExpander, PINS_PER_PORT};

const OPCODE: u8 = 0x40;
const OPCODE_READ: u8 = 0x01;

/// Highest hardware address (A2..A0)
pub const MAX_ADDRESS: u8 = 7;

const IODIRA: u8 = 0x00;
const IODIRB: u8 = 0x01;
const IOCON: u8 = 0x0A;
const GPIOA: u8 = 0x12;
const GPIOB: u8 = 0x13;

/// IOCON hardware address enable
const IOCON_HAEN: u8 = 0x08;

/// Expander errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI transport error
    Spi(E),
    /// Pin number above 15
    InvalidPin,
}

fn iodir(port: Port) -> u8 {
    match port {
        Port::A => IODIRA,
        Port::B => IODIRB,
    }
}

fn gpio(port: Port) -> u8 {
    match port {
        Port::A => GPIOA,
        Port::B => GPIOB,
    }
}

/// One MCP23S17 on an SPI device
pub struct Mcp23s17<SPI> {
    spi: SPI,
    address: u8,
    /// Cached IODIR registers, 1 = input
    iodir: [u8; 2],
}

impl<SPI: SpiDevice> Mcp23s17<SPI> {
    /// Create a driver for the expander strapped to `address` (masked to 0-7)
    pub fn new(spi: SPI, address: u8) -> Self {
        Self {
            spi,
            address: address & MAX_ADDRESS,
            // Power-on value: every pin an input
            iodir: [0xFF; 2],
        }
    }

    /// Hardware address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }

    fn opcode(&self) -> u8 {
        OPCODE | (self.address << 1)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        self.spi
            .write(&[self.opcode(), register, value])
            .map_err(Error::Spi)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Error<SPI::Error>> {
        let mut buf = [self.opcode() | OPCODE_READ, register, 0];
        self.spi.transfer_in_place(&mut buf).map_err(Error::Spi)?;
        Ok(buf[2])
    }

    fn write_iodir(&mut self, port: Port, value: u8) -> Result<(), Error<SPI::Error>> {
        self.write_register(iodir(port), value)?;
        self.iodir[port as usize] = value;
        Ok(())
    }
}

impl<SPI: SpiDevice> PortExpander for Mcp23s17<SPI> {
    type Error = Error<SPI::Error>;

    fn set_pin_direction(&mut self, pin: u8, direction: Direction) -> Result<(), Self::Error> {
        let port = Port::of_pin(pin).ok_or(Error::InvalidPin)?;
        let bit = 1 << (pin % PINS_PER_PORT);
        let current = self.iodir[port as usize];
        let value = match direction {
            Direction::Input => current | bit,
            Direction::Output => current & !bit,
        };
        self.write_iodir(port, value)
    }

    fn set_port_direction(&mut self, port: Port, direction: Direction) -> Result<(), Self::Error> {
        let value = match direction {
            Direction::Input => 0xFF,
            Direction::Output => 0x00,
        };
        self.write_iodir(port, value)
    }

    fn write_port(&mut self, port: Port, value: u8) -> Result<(), Self::Error> {
        self.write_register(gpio(port), value)
    }

    fn read_port(&mut self, port: Port) -> Result<u8, Self::Error> {
        self.read_register(gpio(port))
    }

    /// Set IOCON.HAEN
    ///
    /// Until HAEN is set every expander on the chip select answers to
    /// address 0, so the write goes out with address 0 and reaches all of
    /// them.
    fn enable_hardware_address(&mut self) -> Result<(), Self::Error> {
        self.spi
            .write(&[OPCODE, IOCON, IOCON_HAEN])
            .map_err(Error::Spi)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("MCP23S17 {}: hardware addressing on", self.address);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};
    use std::vec;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockSpi {
        /// Bytes of each transaction, as sent
        sent: Vec<Vec<u8>>,
        /// Byte clocked in during the third byte of a read
        reply: u8,
    }

    impl ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            let mut sent = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(buf) => sent.extend_from_slice(buf),
                    Operation::TransferInPlace(buf) => {
                        sent.extend_from_slice(buf);
                        if let Some(last) = buf.last_mut() {
                            *last = self.reply;
                        }
                    }
                    _ => unimplemented!(),
                }
            }
            self.sent.push(sent);
            Ok(())
        }
    }

    fn expander(address: u8) -> Mcp23s17<MockSpi> {
        Mcp23s17::new(MockSpi::default(), address)
    }

    #[test]
    fn test_opcode_carries_address() {
        let mut exp = expander(1);
        exp.write_port(Port::B, 0xA5).unwrap();
        assert_eq!(exp.release().sent, vec![vec![0x42, GPIOB, 0xA5]]);
    }

    #[test]
    fn test_address_masked() {
        assert_eq!(expander(9).address(), 1);
    }

    #[test]
    fn test_read_port() {
        let mut exp = expander(0);
        exp.spi.reply = 0x5A;
        assert_eq!(exp.read_port(Port::A), Ok(0x5A));
        assert_eq!(exp.release().sent, vec![vec![0x41, GPIOA, 0x00]]);
    }

    #[test]
    fn test_port_direction_single_write() {
        let mut exp = expander(0);
        exp.set_port_direction(Port::A, Direction::Output).unwrap();
        exp.set_port_direction(Port::B, Direction::Input).unwrap();
        assert_eq!(
            exp.release().sent,
            vec![vec![0x40, IODIRA, 0x00], vec![0x40, IODIRB, 0xFF]]
        );
    }

    #[test]
    fn test_pin_direction_keeps_other_pins() {
        let mut exp = expander(0);
        exp.set_pin_direction(3, Direction::Output).unwrap();
        exp.set_pin_direction(9, Direction::Output).unwrap();
        exp.set_pin_direction(3, Direction::Input).unwrap();

        let sent = exp.release().sent;
        assert_eq!(sent[0], vec![0x40, IODIRA, 0b1111_0111]);
        assert_eq!(sent[1], vec![0x40, IODIRB, 0b1111_1101]);
        assert_eq!(sent[2], vec![0x40, IODIRA, 0xFF]);
    }

    #[test]
    fn test_invalid_pin() {
        let mut exp = expander(0);
        assert_eq!(
            exp.set_pin_direction(16, Direction::Output),
            Err(Error::InvalidPin)
        );
        assert!(exp.release().sent.is_empty());
    }

    #[test]
    fn test_haen_uses_address_zero() {
        let mut exp = expander(1);
        exp.enable_hardware_address().unwrap();
        assert_eq!(exp.release().sent, vec![vec![0x40, IOCON, IOCON_HAEN]]);
    }
}
