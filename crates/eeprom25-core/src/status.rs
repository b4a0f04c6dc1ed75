//! STATUS register
//!
//! Bit layout of the 25xx STATUS register:
//!
//! | Bit | 7    | 6-4 | 3   | 2   | 1   | 0   |
//! |-----|------|-----|-----|-----|-----|-----|
//! |     | WPEN | -   | BP1 | BP0 | WEL | WIP |
//!
//! Only BP1, BP0 and WPEN are writable. WIP and WEL are read-only.

use crate::spi::opcodes;
use bitflags::bitflags;

bitflags! {
    /// Value of the STATUS register
    ///
    /// Reserved bits read from the device are retained as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Write-in-progress: an internal write cycle is running
        const WIP  = opcodes::SR_WIP;
        /// Write enable latch: writes are accepted
        const WEL  = opcodes::SR_WEL;
        /// Block protect bit 0
        const BP0  = opcodes::SR_BP0;
        /// Block protect bit 1
        const BP1  = opcodes::SR_BP1;
        /// Write-protect enable (WP pin guards the STATUS register)
        const WPEN = opcodes::SR_WPEN;
    }
}

impl Status {
    /// Bits the WRSR instruction can change
    pub const WRITABLE: Self = Self::BP0.union(Self::BP1).union(Self::WPEN);

    /// Interpret a raw register value, keeping reserved bits
    pub const fn from_raw(value: u8) -> Self {
        Self::from_bits_retain(value)
    }

    /// Returns true while an internal write cycle is running
    pub const fn wip(&self) -> bool {
        self.contains(Self::WIP)
    }

    /// Returns true if the write enable latch is set
    pub const fn wel(&self) -> bool {
        self.contains(Self::WEL)
    }

    /// Returns true if write-protect enable is set
    pub const fn wpen(&self) -> bool {
        self.contains(Self::WPEN)
    }

    /// Decode the block protect bits
    pub const fn block_protection(&self) -> BlockProtection {
        BlockProtection::from_bits(self.bits())
    }

    /// Replace the block protect bits
    pub fn set_block_protection(&mut self, level: BlockProtection) {
        self.remove(Self::BP0 | Self::BP1);
        self.insert(Self::from_bits_retain(level.to_bits()));
    }

    /// Set or clear write-protect enable
    pub fn set_wpen(&mut self, enable: bool) {
        self.set(Self::WPEN, enable);
    }

    /// Set or clear the WIP flag (used by emulators)
    pub fn set_wip(&mut self, busy: bool) {
        self.set(Self::WIP, busy);
    }

    /// Set or clear the WEL flag (used by emulators)
    pub fn set_wel(&mut self, enabled: bool) {
        self.set(Self::WEL, enabled);
    }

    /// The value to send with WRSR (non-writable bits cleared)
    pub const fn writable_bits(&self) -> u8 {
        self.bits() & Self::WRITABLE.bits()
    }
}

/// Block protection levels (BP1:BP0)
///
/// Selects which upper fraction of the array is protected against writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockProtection {
    /// No protection (BP1=0, BP0=0)
    #[default]
    None,
    /// Upper 1/4 of the array protected (BP1=0, BP0=1)
    UpperQuarter,
    /// Upper 1/2 of the array protected (BP1=1, BP0=0)
    UpperHalf,
    /// Whole array protected (BP1=1, BP0=1)
    All,
}

impl BlockProtection {
    /// Register bits for this level, already shifted into place
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::UpperQuarter => opcodes::SR_BP0,
            Self::UpperHalf => opcodes::SR_BP1,
            Self::All => opcodes::SR_BP0 | opcodes::SR_BP1,
        }
    }

    /// Decode the level from a raw register value
    pub const fn from_bits(status: u8) -> Self {
        match (status & opcodes::SR_BP1 != 0, status & opcodes::SR_BP0 != 0) {
            (false, false) => Self::None,
            (false, true) => Self::UpperQuarter,
            (true, false) => Self::UpperHalf,
            (true, true) => Self::All,
        }
    }

    /// First protected address for an array of `total_size` bytes
    ///
    /// Returns `None` when nothing is protected.
    pub const fn protected_start(self, total_size: u32) -> Option<u32> {
        match self {
            Self::None => None,
            Self::UpperQuarter => Some(total_size - total_size / 4),
            Self::UpperHalf => Some(total_size / 2),
            Self::All => Some(0),
        }
    }
}

impl core::fmt::Display for BlockProtection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::UpperQuarter => write!(f, "upper 1/4"),
            Self::UpperHalf => write!(f, "upper 1/2"),
            Self::All => write!(f, "all"),
        }
    }
}
