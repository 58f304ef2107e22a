//! Hardware configuration types
//!
//! These types describe how the display modules are wired to the port
//! expanders: which port carries the address, data and control lines,
//! which control-port bit drives each strobe, and which chip-select line
//! belongs to each module.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{Timing, DEFAULT_MODULE_WIDTH, MAX_MODULES, MAX_MODULE_WIDTH};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No modules configured
    NoModules,
    /// More than [`MAX_MODULES`] modules
    TooManyModules,
    /// Module width is 0 or above [`MAX_MODULE_WIDTH`]
    InvalidWidth,
    /// A chip-select mask is empty
    MissingChipSelect,
    /// Chip-select masks overlap each other or a strobe line
    ChipSelectConflict,
    /// Address and data lines share one port
    WiringConflict,
}

/// Port of an expander chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExpanderPort {
    A,
    B,
}

/// Which expander ports carry the bus
///
/// Address and data ports live on the data expander, the control port on
/// the control expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusWiring {
    /// Address lines A0-A4
    pub address_port: ExpanderPort,
    /// Data lines D0-D7
    pub data_port: ExpanderPort,
    /// RES, FL, WR, RD and chip selects
    pub control_port: ExpanderPort,
}

impl Default for BusWiring {
    fn default() -> Self {
        Self {
            address_port: ExpanderPort::A,
            data_port: ExpanderPort::B,
            control_port: ExpanderPort::B,
        }
    }
}

/// Control-port bit masks for the shared strobes
///
/// All lines are active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlLines {
    /// RES (reset)
    pub reset: u8,
    /// FL (flash RAM select)
    pub flash: u8,
    /// WR (write strobe)
    pub write: u8,
    /// RD (read strobe)
    pub read: u8,
}

impl ControlLines {
    /// Mask of every strobe line
    pub const fn strobes(&self) -> u8 {
        self.reset | self.flash | self.write | self.read
    }
}

impl Default for ControlLines {
    fn default() -> Self {
        Self {
            reset: 0b0000_0001,
            flash: 0b0000_0010,
            write: 0b0000_0100,
            read: 0b0000_1000,
        }
    }
}

/// Register base addresses on the five address lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegisterMap {
    /// User-defined-character address register
    pub udc_address: u8,
    /// User-defined-character RAM (row in the low 3 bits)
    pub udc_ram: u8,
    /// Control-word register
    pub control_word: u8,
    /// Character RAM (position in the low 3 bits)
    pub character_ram: u8,
    /// Flash RAM (position in the low 3 bits, FL asserted)
    pub flash_ram: u8,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            udc_address: 0b0000_0000,
            udc_ram: 0b0000_1000,
            control_word: 0b0001_0000,
            character_ram: 0b0001_1000,
            flash_ram: 0b0000_0000,
        }
    }
}

/// One display module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleConfig {
    /// Chip-select line(s) on the control port
    pub chip_select: u8,
}

impl ModuleConfig {
    /// Module selected by the given control-port mask
    pub const fn new(chip_select: u8) -> Self {
        Self { chip_select }
    }
}

/// Complete display configuration
///
/// Modules are ordered left to right; module `i` owns logical positions
/// `i * module_width .. (i + 1) * module_width`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Characters per module
    pub module_width: u8,
    /// Modules, left to right
    pub modules: Vec<ModuleConfig, MAX_MODULES>,
    /// Register addresses
    pub registers: RegisterMap,
    /// Strobe bit assignments
    pub control: ControlLines,
    /// Port assignments
    pub wiring: BusWiring,
    /// Bus and device timing
    pub timing: Timing,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::dual()
    }
}

impl DisplayConfig {
    /// Configuration without modules, to be filled with [`Self::push_module`]
    pub fn empty() -> Self {
        Self {
            module_width: DEFAULT_MODULE_WIDTH,
            modules: Vec::new(),
            registers: RegisterMap::default(),
            control: ControlLines::default(),
            wiring: BusWiring::default(),
            timing: Timing::default(),
        }
    }

    /// Two HDSP-2112 modules side by side (16 characters)
    ///
    /// CS0 on control bit 4, CS1 on control bit 5.
    pub fn dual() -> Self {
        let mut config = Self::empty();
        // Capacity is MAX_MODULES, two pushes cannot fail
        let _ = config.modules.push(ModuleConfig::new(0b0001_0000));
        let _ = config.modules.push(ModuleConfig::new(0b0010_0000));
        config
    }

    /// A single HDSP-2112 module (8 characters), CS on control bit 4
    pub fn single() -> Self {
        let mut config = Self::empty();
        let _ = config.modules.push(ModuleConfig::new(0b0001_0000));
        config
    }

    /// Append a module to the right end of the display
    pub fn push_module(&mut self, chip_select: u8) -> Result<(), ConfigError> {
        self.modules
            .push(ModuleConfig::new(chip_select))
            .map_err(|_| ConfigError::TooManyModules)
    }

    /// Number of modules
    pub fn module_count(&self) -> u8 {
        self.modules.len() as u8
    }

    /// Number of logical positions across all modules
    pub fn total_width(&self) -> usize {
        self.modules.len() * self.module_width as usize
    }

    /// Chip-select mask of one module
    pub fn chip_select(&self, module: u8) -> Option<u8> {
        self.modules.get(module as usize).map(|m| m.chip_select)
    }

    /// Chip-select mask selecting every module at once
    pub fn all_chip_selects(&self) -> u8 {
        self.modules.iter().fold(0, |acc, m| acc | m.chip_select)
    }

    /// Check the configuration for wiring and size errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modules.is_empty() {
            return Err(ConfigError::NoModules);
        }
        if self.module_width == 0 || self.module_width > MAX_MODULE_WIDTH {
            return Err(ConfigError::InvalidWidth);
        }
        if self.wiring.address_port == self.wiring.data_port {
            return Err(ConfigError::WiringConflict);
        }

        let mut used = self.control.strobes();
        for module in &self.modules {
            if module.chip_select == 0 {
                return Err(ConfigError::MissingChipSelect);
            }
            if used & module.chip_select != 0 {
                return Err(ConfigError::ChipSelectConflict);
            }
            used |= module.chip_select;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_preset() {
        let config = DisplayConfig::dual();
        assert_eq!(config.module_count(), 2);
        assert_eq!(config.total_width(), 16);
        assert_eq!(config.chip_select(0), Some(0b0001_0000));
        assert_eq!(config.chip_select(1), Some(0b0010_0000));
        assert_eq!(config.chip_select(2), None);
        assert_eq!(config.all_chip_selects(), 0b0011_0000);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_single_preset() {
        let config = DisplayConfig::single();
        assert_eq!(config.total_width(), 8);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_empty_config_rejected() {
        assert_eq!(DisplayConfig::empty().validate(), Err(ConfigError::NoModules));
    }

    #[test]
    fn test_chip_select_conflicts() {
        let mut config = DisplayConfig::single();
        config.push_module(0b0001_0000).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ChipSelectConflict));

        // Overlapping the WR strobe
        let mut config = DisplayConfig::single();
        config.push_module(0b0000_0100).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ChipSelectConflict));

        let mut config = DisplayConfig::single();
        config.push_module(0).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::MissingChipSelect));
    }

    #[test]
    fn test_address_and_data_need_separate_ports() {
        let mut config = DisplayConfig::dual();
        config.wiring.data_port = ExpanderPort::A;
        assert_eq!(config.validate(), Err(ConfigError::WiringConflict));
    }

    #[test]
    fn test_width_limits() {
        let mut config = DisplayConfig::single();
        config.module_width = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidWidth));
        config.module_width = 9;
        assert_eq!(config.validate(), Err(ConfigError::InvalidWidth));
    }

    #[test]
    fn test_too_many_modules() {
        let mut config = DisplayConfig::empty();
        for _ in 0..MAX_MODULES {
            config.push_module(0b1000_0000).unwrap();
        }
        assert_eq!(config.push_module(0b1000_0000), Err(ConfigError::TooManyModules));
    }
}
