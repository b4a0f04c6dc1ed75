//! EEPROM feature flags

use bitflags::bitflags;

bitflags! {
    /// Optional instructions a part implements
    ///
    /// Every 25xx part supports READ, WRITE, WREN, WRDI, RDSR and WRSR. The
    /// flags below cover the extra instruction set of the larger parts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "std", serde(transparent))]
    pub struct Features: u32 {
        /// Page erase (0x42)
        const PAGE_ERASE      = 1 << 0;
        /// Sector erase (0xD8)
        const SECTOR_ERASE    = 1 << 1;
        /// Chip erase (0xC7)
        const CHIP_ERASE      = 1 << 2;
        /// Deep power-down (0xB9)
        const DEEP_POWER_DOWN = 1 << 3;
        /// Release from deep power-down and read signature (0xAB)
        const SIGNATURE       = 1 << 4;

        /// Full erase instruction set of the 25xx512
        const ERASE = Self::PAGE_ERASE.bits()
            | Self::SECTOR_ERASE.bits()
            | Self::CHIP_ERASE.bits();
    }
}

impl Default for Features {
    fn default() -> Self {
        Features::empty()
    }
}
