//! Device configuration - fixed parameters of one EEPROM

use crate::chip::{Chip, Features};
use crate::error::{Error, Result};
use crate::protocol::DEFAULT_MAX_POLL_ITERATIONS;
use crate::spi::AddressWidth;

use super::page::PageSplitter;

/// Default bound on a single internal write cycle
///
/// The 25xx parts specify a 5 ms write cycle (6 ms on the 25xx1024).
pub const DEFAULT_WRITE_TIMEOUT_MS: u32 = 10;

/// Immutable parameters of one EEPROM
///
/// Constructed once and handed to [`Eeprom::new`](super::Eeprom::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Width of the address field on the wire
    pub address_width: AddressWidth,
    /// Array size in bytes
    pub total_size: u32,
    /// Write page size in bytes
    pub page_size: u16,
    /// Upper bound on one internal write cycle, in milliseconds
    pub write_timeout_ms: u32,
    /// Consecutive clock samples without a tick before polling gives up
    pub max_poll_iterations: u32,
    /// Optional instructions the part implements
    pub features: Features,
}

impl DeviceConfig {
    /// Validate and build a configuration
    ///
    /// # Errors
    /// `InvalidConfig` if the array is empty or larger than the address
    /// width can reach, or if `page_size` is zero or does not divide the
    /// array size.
    pub fn new(address_width: AddressWidth, total_size: u32, page_size: u16) -> Result<Self> {
        if total_size == 0 || total_size > address_width.max_size() {
            return Err(Error::InvalidConfig);
        }
        if page_size == 0 || total_size % page_size as u32 != 0 {
            return Err(Error::InvalidConfig);
        }

        Ok(Self {
            address_width,
            total_size,
            page_size,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            max_poll_iterations: DEFAULT_MAX_POLL_ITERATIONS,
            features: Features::empty(),
        })
    }

    /// Configuration for a built-in part
    pub fn from_chip(chip: &Chip) -> Result<Self> {
        Ok(Self::new(chip.address_width, chip.total_size, chip.page_size)?.with_features(chip.features))
    }

    /// Configuration for a part loaded from a chip database
    #[cfg(feature = "std")]
    pub fn from_entry(entry: &crate::chip::ChipEntry) -> Result<Self> {
        Ok(Self::new(entry.address_width, entry.total_size, entry.page_size)?.with_features(entry.features))
    }

    /// Set the write-cycle timeout
    pub fn with_write_timeout(mut self, timeout_ms: u32) -> Self {
        self.write_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll iteration ceiling
    pub fn with_max_poll_iterations(mut self, iterations: u32) -> Self {
        self.max_poll_iterations = iterations;
        self
    }

    /// Set the optional instruction set
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Page arithmetic for this part
    pub fn splitter(&self) -> PageSplitter {
        PageSplitter::new(self.page_size as u32)
    }

    /// Check if an address range is valid for this part
    ///
    /// The inclusive range `[addr, addr + len - 1]` must lie inside the
    /// array. Zero-length ranges are not valid.
    pub fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        if len == 0 || addr >= self.total_size {
            return false;
        }
        let end = (addr as u64).saturating_add(len as u64);
        end <= self.total_size as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::find_chip;

    #[test]
    fn test_rejects_inconsistent_geometry() {
        assert_eq!(DeviceConfig::new(AddressWidth::Bits8, 512, 16), Err(Error::InvalidConfig));
        assert_eq!(DeviceConfig::new(AddressWidth::Bits16, 0, 16), Err(Error::InvalidConfig));
        assert_eq!(DeviceConfig::new(AddressWidth::Bits16, 1024, 0), Err(Error::InvalidConfig));
        assert_eq!(DeviceConfig::new(AddressWidth::Bits16, 1024, 24), Err(Error::InvalidConfig));
        assert!(DeviceConfig::new(AddressWidth::Bits9, 512, 16).is_ok());
    }

    #[test]
    fn test_from_chip() {
        let config = DeviceConfig::from_chip(find_chip("25LC1024").unwrap()).unwrap();
        assert_eq!(config.address_width, AddressWidth::Bits24);
        assert_eq!(config.page_size, 256);
        assert_eq!(config.write_timeout_ms, DEFAULT_WRITE_TIMEOUT_MS);
        assert!(config.features.contains(Features::CHIP_ERASE));
    }

    #[test]
    fn test_valid_range_is_inclusive() {
        let config = DeviceConfig::new(AddressWidth::Bits8, 256, 16).unwrap();
        assert!(config.is_valid_range(0, 256));
        assert!(config.is_valid_range(255, 1));
        assert!(!config.is_valid_range(255, 2));
        assert!(!config.is_valid_range(256, 1));
        assert!(!config.is_valid_range(0, 0));
        assert!(!config.is_valid_range(1, usize::MAX));
    }
}
