//! Test bench: recording port expanders wired to a model of two modules
//!
//! Both mock expanders share one [`Bench`], so the event log shows the
//! global order of port operations. Every falling WR edge is decoded
//! into a [`Cycle`] and applied to a model of the modules' RAM, using
//! the wiring of [`DisplayConfig::dual`](luxline_core::DisplayConfig::dual).

use core::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use luxline_hal::{Direction, Port, PortExpander};

const FL: u8 = 0b0000_0010;
const WR: u8 = 0b0000_0100;
const CS: [u8; 2] = [0b0001_0000, 0b0010_0000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    Data,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Direction(Chip, Port, Direction),
    Write(Chip, Port, u8),
    Read(Chip, Port),
    HardwareAddress(Chip),
    DelayUs(u32),
    DelayMs(u32),
}

/// Write cycle as seen by the modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub address: u8,
    pub data: u8,
    /// Chip-select lines held low
    pub selected: u8,
    /// FL held low
    pub flash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug)]
pub struct Bench {
    pub events: Vec<Event>,
    pub cycles: Vec<Cycle>,
    pub char_ram: [[u8; 8]; 2],
    pub flash_ram: [[u8; 8]; 2],
    pub control_word: [u8; 2],
    /// Value returned when the data expander is read
    pub read_value: u8,
    pub fail_reads: bool,
    /// Port writes that succeed before the next one fails (once)
    pub fail_write_after: Option<usize>,
    ports: [[u8; 2]; 2],
}

impl Bench {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            cycles: Vec::new(),
            char_ram: [[0; 8]; 2],
            flash_ram: [[0; 8]; 2],
            control_word: [0; 2],
            read_value: 0,
            fail_reads: false,
            fail_write_after: None,
            ports: [[0; 2], [0xFF; 2]],
        }
    }

    /// Character RAM of both modules, left to right
    pub fn text(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.char_ram[0]);
        out[8..].copy_from_slice(&self.char_ram[1]);
        out
    }

    /// Forget everything recorded so far, keep the RAM model
    pub fn clear_log(&mut self) {
        self.events.clear();
        self.cycles.clear();
    }

    fn write(&mut self, chip: Chip, port: Port, value: u8) -> Result<(), MockError> {
        match self.fail_write_after {
            Some(0) => {
                self.fail_write_after = None;
                return Err(MockError);
            }
            Some(n) => self.fail_write_after = Some(n - 1),
            None => {}
        }

        self.events.push(Event::Write(chip, port, value));
        let previous = self.ports[chip as usize][port as usize];
        self.ports[chip as usize][port as usize] = value;

        if chip == Chip::Control && port == Port::B && previous & WR != 0 && value & WR == 0 {
            let cycle = Cycle {
                address: self.ports[Chip::Data as usize][Port::A as usize],
                data: self.ports[Chip::Data as usize][Port::B as usize],
                selected: !value & (CS[0] | CS[1]),
                flash: value & FL == 0,
            };
            self.apply(cycle);
            self.cycles.push(cycle);
        }
        Ok(())
    }

    fn apply(&mut self, cycle: Cycle) {
        for (module, cs) in CS.iter().enumerate() {
            if cycle.selected & cs == 0 {
                continue;
            }
            let local = (cycle.address & 0b111) as usize;
            if cycle.flash {
                self.flash_ram[module][local] = cycle.data & 1;
            } else if cycle.address & 0b1_1000 == 0b1_1000 {
                self.char_ram[module][local] = cycle.data;
            } else if cycle.address == 0b1_0000 {
                self.control_word[module] = cycle.data;
            }
        }
    }
}

pub struct MockExpander {
    chip: Chip,
    bench: Rc<RefCell<Bench>>,
}

impl PortExpander for MockExpander {
    type Error = MockError;

    fn set_pin_direction(&mut self, pin: u8, direction: Direction) -> Result<(), MockError> {
        let port = Port::of_pin(pin).ok_or(MockError)?;
        self.set_port_direction(port, direction)
    }

    fn set_port_direction(&mut self, port: Port, direction: Direction) -> Result<(), MockError> {
        self.bench
            .borrow_mut()
            .events
            .push(Event::Direction(self.chip, port, direction));
        Ok(())
    }

    fn write_port(&mut self, port: Port, value: u8) -> Result<(), MockError> {
        self.bench.borrow_mut().write(self.chip, port, value)
    }

    fn read_port(&mut self, port: Port) -> Result<u8, MockError> {
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::Read(self.chip, port));
        if bench.fail_reads {
            Err(MockError)
        } else {
            Ok(bench.read_value)
        }
    }

    fn enable_hardware_address(&mut self) -> Result<(), MockError> {
        self.bench
            .borrow_mut()
            .events
            .push(Event::HardwareAddress(self.chip));
        Ok(())
    }
}

pub struct MockDelay {
    bench: Rc<RefCell<Bench>>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, us: u32) {
        self.bench.borrow_mut().events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bench.borrow_mut().events.push(Event::DelayMs(ms));
    }
}

pub type Shared = Rc<RefCell<Bench>>;

pub fn bench() -> (Shared, MockExpander, MockExpander, MockDelay) {
    let bench = Rc::new(RefCell::new(Bench::new()));
    let data = MockExpander {
        chip: Chip::Data,
        bench: bench.clone(),
    };
    let control = MockExpander {
        chip: Chip::Control,
        bench: bench.clone(),
    };
    let delay = MockDelay {
        bench: bench.clone(),
    };
    (bench, data, control, delay)
}
