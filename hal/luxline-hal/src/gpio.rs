//! Port-expander GPIO abstractions
//!
//! Provides the trait a 16-bit port expander (two 8-bit ports, A and B)
//! must implement to carry the display bus. Pins are numbered 0-15:
//! 0-7 are port A bits 0-7, 8-15 are port B bits 0-7.

/// Number of pins on one 8-bit port
pub const PINS_PER_PORT: u8 = 8;

/// Total number of pins on a two-port expander
pub const PIN_COUNT: u8 = 2 * PINS_PER_PORT;

/// One of the two 8-bit ports of an expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Port A (pins 0-7)
    A,
    /// Port B (pins 8-15)
    B,
}

impl Port {
    /// Number of the first pin belonging to this port
    pub const fn first_pin(self) -> u8 {
        match self {
            Port::A => 0,
            Port::B => PINS_PER_PORT,
        }
    }

    /// Port that owns the given pin number, if it is in range
    pub const fn of_pin(pin: u8) -> Option<Port> {
        if pin < PINS_PER_PORT {
            Some(Port::A)
        } else if pin < PIN_COUNT {
            Some(Port::B)
        } else {
            None
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Pin is driven by the expander
    Output,
    /// Pin is high impedance and can be sampled
    Input,
}

/// Two-port GPIO expander
///
/// Implementations own the transport to the chip (SPI, I2C) and perform
/// one bus transaction per call. Nothing is buffered: when a method
/// returns `Ok`, the new level is on the pins.
pub trait PortExpander {
    /// Error type for transport failures
    type Error;

    /// Configure the direction of a single pin (0-15)
    fn set_pin_direction(&mut self, pin: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Configure the direction of all eight pins of a port
    ///
    /// The default implementation configures the pins one by one.
    /// Implementations with a direction register should override it
    /// with a single write.
    fn set_port_direction(&mut self, port: Port, direction: Direction) -> Result<(), Self::Error> {
        let first = port.first_pin();
        for pin in first..first + PINS_PER_PORT {
            self.set_pin_direction(pin, direction)?;
        }
        Ok(())
    }

    /// Drive all eight pins of a port
    fn write_port(&mut self, port: Port, value: u8) -> Result<(), Self::Error>;

    /// Sample all eight pins of a port
    fn read_port(&mut self, port: Port) -> Result<u8, Self::Error>;

    /// Make the chip decode its hardware address pins
    ///
    /// Needed when several expanders share one chip-select line. Chips
    /// without address pins keep the default no-op.
    fn enable_hardware_address(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock expander that only records pin directions
    struct MockExpander {
        outputs: u16,
        calls: u8,
    }

    impl PortExpander for MockExpander {
        type Error = ();

        fn set_pin_direction(&mut self, pin: u8, direction: Direction) -> Result<(), ()> {
            if pin >= PIN_COUNT {
                return Err(());
            }
            self.calls += 1;
            match direction {
                Direction::Output => self.outputs |= 1 << pin,
                Direction::Input => self.outputs &= !(1 << pin),
            }
            Ok(())
        }

        fn write_port(&mut self, _port: Port, _value: u8) -> Result<(), ()> {
            Ok(())
        }

        fn read_port(&mut self, _port: Port) -> Result<u8, ()> {
            Ok(0)
        }
    }

    #[test]
    fn test_port_of_pin() {
        assert_eq!(Port::of_pin(0), Some(Port::A));
        assert_eq!(Port::of_pin(7), Some(Port::A));
        assert_eq!(Port::of_pin(8), Some(Port::B));
        assert_eq!(Port::of_pin(15), Some(Port::B));
        assert_eq!(Port::of_pin(16), None);
    }

    #[test]
    fn test_default_port_direction_touches_only_that_port() {
        let mut exp = MockExpander { outputs: 0, calls: 0 };

        exp.set_port_direction(Port::B, Direction::Output).unwrap();
        assert_eq!(exp.outputs, 0xFF00);
        assert_eq!(exp.calls, 8);

        exp.set_port_direction(Port::A, Direction::Output).unwrap();
        exp.set_port_direction(Port::B, Direction::Input).unwrap();
        assert_eq!(exp.outputs, 0x00FF);
    }

    #[test]
    fn test_hardware_address_defaults_to_noop() {
        let mut exp = MockExpander { outputs: 0, calls: 0 };
        assert_eq!(exp.enable_hardware_address(), Ok(()));
        assert_eq!(exp.calls, 0);
    }
}
