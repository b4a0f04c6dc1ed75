//! Address width types

/// Width of the address field of memory array commands
///
/// Selected once per device. Parts with up to 9 address bits use a single
/// address byte; the 9th bit (A8) travels in bit 3 of the opcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// 8-bit address, 1 address byte (25xx010A, 25xx020A)
    Bits8,
    /// 9-bit address, 1 address byte plus A8 in the opcode (25xx040A)
    Bits9,
    /// 16-bit address, 2 address bytes (25xx080 .. 25xx512)
    #[default]
    Bits16,
    /// 24-bit address, 3 address bytes (25xx1024)
    Bits24,
}

impl AddressWidth {
    /// Pick the framing variant covering `bits` address bits
    ///
    /// Returns `None` for zero or more than 24 bits.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1..=8 => Some(Self::Bits8),
            9 => Some(Self::Bits9),
            10..=16 => Some(Self::Bits16),
            17..=24 => Some(Self::Bits24),
            _ => None,
        }
    }

    /// Returns the number of address bits the framing carries
    pub const fn bits(&self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits9 => 9,
            Self::Bits16 => 16,
            Self::Bits24 => 24,
        }
    }

    /// Returns the number of address bytes following the opcode
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::Bits8 | Self::Bits9 => 1,
            Self::Bits16 => 2,
            Self::Bits24 => 3,
        }
    }

    /// Returns the size of the address space in bytes
    pub const fn max_size(&self) -> u32 {
        1 << self.bits()
    }

    /// Returns true if `address` fits in this width
    pub const fn contains(&self, address: u32) -> bool {
        address < self.max_size()
    }

    /// Encode the address bytes (big-endian) into `buf`
    ///
    /// For [`AddressWidth::Bits9`] only the low byte is written; the caller
    /// folds A8 into the opcode.
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        match self {
            Self::Bits8 | Self::Bits9 => {
                buf[0] = address as u8;
            }
            Self::Bits16 => {
                buf[0] = (address >> 8) as u8;
                buf[1] = address as u8;
            }
            Self::Bits24 => {
                buf[0] = (address >> 16) as u8;
                buf[1] = (address >> 8) as u8;
                buf[2] = address as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits() {
        assert_eq!(AddressWidth::from_bits(0), None);
        assert_eq!(AddressWidth::from_bits(7), Some(AddressWidth::Bits8));
        assert_eq!(AddressWidth::from_bits(8), Some(AddressWidth::Bits8));
        assert_eq!(AddressWidth::from_bits(9), Some(AddressWidth::Bits9));
        assert_eq!(AddressWidth::from_bits(10), Some(AddressWidth::Bits16));
        assert_eq!(AddressWidth::from_bits(16), Some(AddressWidth::Bits16));
        assert_eq!(AddressWidth::from_bits(17), Some(AddressWidth::Bits24));
        assert_eq!(AddressWidth::from_bits(24), Some(AddressWidth::Bits24));
        assert_eq!(AddressWidth::from_bits(25), None);
    }

    #[test]
    fn test_max_size() {
        assert_eq!(AddressWidth::Bits8.max_size(), 256);
        assert_eq!(AddressWidth::Bits9.max_size(), 512);
        assert_eq!(AddressWidth::Bits16.max_size(), 64 * 1024);
        assert_eq!(AddressWidth::Bits24.max_size(), 16 * 1024 * 1024);
        assert!(AddressWidth::Bits9.contains(0x1FF));
        assert!(!AddressWidth::Bits9.contains(0x200));
    }
}
