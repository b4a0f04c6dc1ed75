//! Built-in part table

use super::features::Features;
use crate::spi::AddressWidth;

/// A 25xx EEPROM part
///
/// The 25LC (2.5 V) and 25AA (1.8 V) variants of a density share one entry;
/// the table names them `25xx...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip {
    /// Part name with the voltage letters replaced by `xx` (e.g. "25xx256")
    pub name: &'static str,
    /// Array size in bytes
    pub total_size: u32,
    /// Write page size in bytes
    pub page_size: u16,
    /// Width of the address field on the wire
    pub address_width: AddressWidth,
    /// Optional instructions
    pub features: Features,
    /// Electronic signature returned by RDID, if the part has one
    pub signature: Option<u8>,
}

impl Chip {
    const fn new(name: &'static str, total_size: u32, page_size: u16, address_width: AddressWidth) -> Self {
        Self {
            name,
            total_size,
            page_size,
            address_width,
            features: Features::empty(),
            signature: None,
        }
    }

    const fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    const fn with_signature(mut self, signature: u8) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Returns true if `query` names this part
    ///
    /// Case-insensitive. The `xx` in the table name matches `LC`, `AA` or `xx`,
    /// so "25LC256", "25aa256" and "25xx256" all select the same entry.
    pub fn matches(&self, query: &str) -> bool {
        let name = self.name.as_bytes();
        let query = query.as_bytes();
        if name.len() != query.len() {
            return false;
        }
        name.iter().zip(query).all(|(&n, &q)| {
            if n == b'x' {
                matches!(q.to_ascii_uppercase(), b'X' | b'L' | b'C' | b'A')
            } else {
                n.eq_ignore_ascii_case(&q)
            }
        })
    }

    /// Number of write pages in the array
    pub const fn page_count(&self) -> u32 {
        self.total_size / self.page_size as u32
    }
}

/// Every 25xx part the driver knows about, smallest first
pub static CHIPS: &[Chip] = &[
    Chip::new("25xx010A", 128, 16, AddressWidth::Bits8),
    Chip::new("25xx020A", 256, 16, AddressWidth::Bits8),
    Chip::new("25xx040A", 512, 16, AddressWidth::Bits9),
    Chip::new("25xx080C", 1024, 16, AddressWidth::Bits16),
    Chip::new("25xx080D", 1024, 32, AddressWidth::Bits16),
    Chip::new("25xx160C", 2048, 16, AddressWidth::Bits16),
    Chip::new("25xx160D", 2048, 32, AddressWidth::Bits16),
    Chip::new("25xx320A", 4 * 1024, 32, AddressWidth::Bits16),
    Chip::new("25xx640A", 8 * 1024, 32, AddressWidth::Bits16),
    Chip::new("25xx128", 16 * 1024, 64, AddressWidth::Bits16),
    Chip::new("25xx256", 32 * 1024, 64, AddressWidth::Bits16),
    Chip::new("25xx512", 64 * 1024, 128, AddressWidth::Bits16)
        .with_features(Features::ERASE.union(Features::DEEP_POWER_DOWN).union(Features::SIGNATURE))
        .with_signature(0x29),
    Chip::new("25xx1024", 128 * 1024, 256, AddressWidth::Bits24)
        .with_features(Features::ERASE.union(Features::DEEP_POWER_DOWN).union(Features::SIGNATURE))
        .with_signature(0x29),
];

/// Look up a built-in part by name
pub fn find_chip(name: &str) -> Option<&'static Chip> {
    CHIPS.iter().find(|c| c.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_chip_accepts_both_voltage_variants() {
        let lc = find_chip("25LC256").unwrap();
        let aa = find_chip("25aa256").unwrap();
        assert_eq!(lc, aa);
        assert_eq!(lc.total_size, 32 * 1024);
        assert_eq!(lc.page_size, 64);
        assert!(find_chip("25LC2560").is_none());
        assert!(find_chip("W25Q128").is_none());
    }

    #[test]
    fn test_table_is_consistent() {
        for chip in CHIPS {
            assert!(chip.total_size <= chip.address_width.max_size(), "{}", chip.name);
            assert_eq!(chip.total_size % chip.page_size as u32, 0, "{}", chip.name);
            assert!(chip.page_size.is_power_of_two(), "{}", chip.name);
        }
    }

    #[test]
    fn test_nine_bit_part() {
        let chip = find_chip("25LC040A").unwrap();
        assert_eq!(chip.address_width, AddressWidth::Bits9);
        assert_eq!(chip.page_count(), 32);
    }

    #[test]
    fn test_erase_features() {
        assert!(find_chip("25LC1024").unwrap().features.contains(Features::CHIP_ERASE));
        assert!(find_chip("25LC256").unwrap().features.is_empty());
    }
}
