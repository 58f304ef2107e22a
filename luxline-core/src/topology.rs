//! Topology resolver
//!
//! Maps a logical character position on the whole display line to the
//! module that shows it and the module-local character address.

use crate::config::DisplayConfig;

/// Bus target of a register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// One module by index (0 = left-most)
    Module(u8),
    /// Every module at once (broadcast write)
    All,
}

/// Physical location of a logical position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    /// Module index
    pub module: u8,
    /// Character address within the module
    pub address: u8,
}

impl Location {
    /// Bus target for this location
    pub const fn target(&self) -> Target {
        Target::Module(self.module)
    }
}

/// Arrangement of equally wide modules forming one text line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Topology {
    module_count: u8,
    module_width: u8,
}

impl Topology {
    /// Create a topology of `module_count` modules of `module_width` characters
    ///
    /// Both values must be non-zero.
    pub const fn new(module_count: u8, module_width: u8) -> Self {
        Self {
            module_count,
            module_width,
        }
    }

    /// Topology described by a display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.module_count(), config.module_width)
    }

    /// Number of modules
    pub const fn module_count(&self) -> u8 {
        self.module_count
    }

    /// Characters per module
    pub const fn module_width(&self) -> u8 {
        self.module_width
    }

    /// Number of addressable positions
    pub const fn total_width(&self) -> usize {
        self.module_count as usize * self.module_width as usize
    }

    /// Clamp a position to the last valid one
    pub fn clamp(&self, pos: usize) -> usize {
        pos.min(self.total_width().saturating_sub(1))
    }

    /// Resolve a position in `0..total_width()` to module and local address
    pub fn resolve(&self, pos: usize) -> Location {
        let width = self.module_width as usize;
        Location {
            module: (pos / width) as u8,
            address: (pos % width) as u8,
        }
    }

    /// Broadcast target for writes that apply to every module
    pub const fn all_modules(&self) -> Target {
        Target::All
    }

    /// Check that a target names an existing module
    pub fn contains(&self, target: Target) -> bool {
        match target {
            Target::Module(id) => id < self.module_count,
            Target::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_dual() {
        let topo = Topology::new(2, 8);
        assert_eq!(topo.total_width(), 16);
        assert_eq!(topo.resolve(0), Location { module: 0, address: 0 });
        assert_eq!(topo.resolve(7), Location { module: 0, address: 7 });
        assert_eq!(topo.resolve(8), Location { module: 1, address: 0 });
        assert_eq!(topo.resolve(15), Location { module: 1, address: 7 });
    }

    #[test]
    fn test_clamp() {
        let topo = Topology::new(2, 8);
        assert_eq!(topo.clamp(3), 3);
        assert_eq!(topo.clamp(15), 15);
        assert_eq!(topo.clamp(16), 15);
        assert_eq!(topo.clamp(200), 15);
    }

    #[test]
    fn test_contains() {
        let topo = Topology::new(2, 8);
        assert!(topo.contains(Target::Module(0)));
        assert!(topo.contains(Target::Module(1)));
        assert!(!topo.contains(Target::Module(2)));
        assert!(topo.contains(topo.all_modules()));
    }

    #[test]
    fn test_from_config() {
        let topo = Topology::from_config(&DisplayConfig::dual());
        assert_eq!(topo, Topology::new(2, 8));
    }

    proptest! {
        #[test]
        fn prop_resolve_is_div_mod(count in 1u8..=8, width in 1u8..=8, seed in any::<usize>()) {
            let topo = Topology::new(count, width);
            let pos = seed % topo.total_width();
            let loc = topo.resolve(pos);
            prop_assert_eq!(loc.module as usize, pos / width as usize);
            prop_assert_eq!(loc.address as usize, pos % width as usize);
            prop_assert!(topo.contains(loc.target()));
        }

        #[test]
        fn prop_resolve_monotonic(count in 1u8..=8, width in 1u8..=8) {
            let topo = Topology::new(count, width);
            let mut last = 0u8;
            for pos in 0..topo.total_width() {
                let module = topo.resolve(pos).module;
                prop_assert!(module >= last);
                last = module;
            }
            prop_assert_eq!(last, count - 1);
        }
    }
}
