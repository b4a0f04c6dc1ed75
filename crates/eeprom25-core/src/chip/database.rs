//! Chip database for runtime loading and lookup
//!
//! Parts that are not in the built-in table can be described in RON files:
//!
//! ```ron
//! (
//!     vendor: "Microchip",
//!     chips: [
//!         (name: "25LC256", size: KiB(32), page_size: 64, address_bits: 16),
//!     ],
//! )
//! ```

use alloc::{format, string::String, vec::Vec};
use std::fs;
use std::io;
use std::path::Path;

use super::types::CHIPS;
use super::Features;
use crate::spi::AddressWidth;

/// Why a chip definition file was not loaded
#[derive(Debug)]
pub enum ChipDbError {
    /// Reading the file or directory failed
    Io(io::Error),
    /// The file is not valid RON for a vendor definition
    Parse(ron::error::SpannedError),
    /// The file parsed but describes an impossible part
    Validation(String),
}

impl From<io::Error> for ChipDbError {
    fn from(e: io::Error) -> Self {
        ChipDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ChipDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        ChipDbError::Parse(e)
    }
}

impl std::fmt::Display for ChipDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read chip file: {}", e),
            Self::Parse(e) => write!(f, "malformed chip file: {}", e),
            Self::Validation(msg) => write!(f, "invalid part: {}", msg),
        }
    }
}

impl std::error::Error for ChipDbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

/// Array size as written in a chip file
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(u32),
    /// Size in kibibytes (1024 bytes)
    KiB(u32),
}

impl Size {
    /// Size in bytes, or `None` if it does not fit in a `u32`
    pub fn to_bytes(self) -> Option<u32> {
        match self {
            Size::B(n) => Some(n),
            Size::KiB(n) => n.checked_mul(1024),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(default)]
struct FeaturesDef {
    page_erase: bool,
    sector_erase: bool,
    chip_erase: bool,
    deep_power_down: bool,
    signature: bool,
}

impl From<FeaturesDef> for Features {
    fn from(def: FeaturesDef) -> Self {
        let mut f = Features::empty();
        f.set(Features::PAGE_ERASE, def.page_erase);
        f.set(Features::SECTOR_ERASE, def.sector_erase);
        f.set(Features::CHIP_ERASE, def.chip_erase);
        f.set(Features::DEEP_POWER_DOWN, def.deep_power_down);
        f.set(Features::SIGNATURE, def.signature);
        f
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ChipDef {
    name: String,
    size: Size,
    page_size: u16,
    address_bits: u8,
    #[serde(default)]
    features: FeaturesDef,
    #[serde(default)]
    signature: Option<u8>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct VendorDef {
    vendor: String,
    chips: Vec<ChipDef>,
}

/// A part loaded at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipEntry {
    /// Vendor name (e.g., "Microchip")
    pub vendor: String,
    /// Part name as written in the file
    pub name: String,
    /// Array size in bytes
    pub total_size: u32,
    /// Write page size in bytes
    pub page_size: u16,
    /// Width of the address field on the wire
    pub address_width: AddressWidth,
    /// Optional instructions
    pub features: Features,
    /// Electronic signature returned by RDID, if any
    pub signature: Option<u8>,
}

impl ChipEntry {
    fn from_def(vendor: &str, def: ChipDef) -> Result<Self, ChipDbError> {
        let address_width = AddressWidth::from_bits(def.address_bits).ok_or_else(|| {
            ChipDbError::Validation(format!(
                "{}: unsupported address width of {} bits",
                def.name, def.address_bits
            ))
        })?;
        let total_size = def.size.to_bytes().ok_or_else(|| {
            ChipDbError::Validation(format!("{}: size {:?} overflows", def.name, def.size))
        })?;

        if total_size == 0 {
            return Err(ChipDbError::Validation(format!("{}: empty array", def.name)));
        }
        if total_size > address_width.max_size() {
            return Err(ChipDbError::Validation(format!(
                "{}: {} bytes do not fit a {}-bit address",
                def.name,
                total_size,
                address_width.bits()
            )));
        }
        if def.page_size == 0 || total_size % def.page_size as u32 != 0 {
            return Err(ChipDbError::Validation(format!(
                "{}: page size {} does not divide {} bytes",
                def.name, def.page_size, total_size
            )));
        }

        let features = Features::from(def.features);
        // erase instructions carry a single address byte, so A8 is unreachable
        if address_width == AddressWidth::Bits9
            && features.intersects(Features::PAGE_ERASE | Features::SECTOR_ERASE)
        {
            return Err(ChipDbError::Validation(format!(
                "{}: page or sector erase is not supported with 9-bit addressing",
                def.name
            )));
        }

        Ok(Self {
            vendor: vendor.into(),
            name: def.name,
            total_size,
            page_size: def.page_size,
            address_width,
            features,
            signature: def.signature,
        })
    }

    /// Returns true if `query` names this part (case-insensitive)
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
    }
}

/// Runtime chip database
///
/// Starts out empty; [`ChipDatabase::builtin`] seeds it with the static table.
#[derive(Debug, Clone, Default)]
pub struct ChipDatabase {
    chips: Vec<ChipEntry>,
}

impl ChipDatabase {
    /// An empty database
    pub fn new() -> Self {
        Self { chips: Vec::new() }
    }

    /// Create a database holding the built-in parts
    pub fn builtin() -> Self {
        let chips = CHIPS
            .iter()
            .map(|c| ChipEntry {
                vendor: "Microchip".into(),
                name: c.name.into(),
                total_size: c.total_size,
                page_size: c.page_size,
                address_width: c.address_width,
                features: c.features,
                signature: c.signature,
            })
            .collect();
        Self { chips }
    }

    /// Load one RON file, returning the number of parts added
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ChipDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load chip definitions from a RON string
    ///
    /// Nothing is added if any entry fails validation.
    pub fn load_ron(&mut self, content: &str) -> Result<usize, ChipDbError> {
        let vendor_def: VendorDef = ron::from_str(content)?;
        let entries = vendor_def
            .chips
            .into_iter()
            .map(|def| ChipEntry::from_def(&vendor_def.vendor, def))
            .collect::<Result<Vec<_>, _>>()?;

        let count = entries.len();
        self.chips.extend(entries);
        Ok(count)
    }

    /// Load every `*.ron` file in `dir`
    ///
    /// Files are read in name order so that later files predictably override
    /// earlier ones.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ChipDbError> {
        let mut paths = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, io::Error>>()?;
        paths.retain(|p| p.extension().is_some_and(|ext| ext == "ron"));
        paths.sort();

        let mut total = 0;
        for path in &paths {
            total += self.load_file(path)?;
        }
        Ok(total)
    }

    /// All entries, built-in first, in load order
    pub fn chips(&self) -> &[ChipEntry] {
        &self.chips
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Returns true if nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Find a chip by exact name
    ///
    /// Entries loaded from files take precedence over built-in ones, so a file
    /// can override a built-in definition.
    pub fn find_by_name(&self, name: &str) -> Option<&ChipEntry> {
        self.chips.iter().rev().find(|c| c.matches(name)).or_else(|| {
            // "25LC256" should still find the built-in "25xx256"
            let builtin = super::find_chip(name)?;
            self.chips.iter().rev().find(|c| c.name == builtin.name)
        })
    }

    /// Iterate over all entries in load order
    pub fn iter(&self) -> impl Iterator<Item = &ChipEntry> {
        self.chips.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ron() {
        let ron = r#"
        (
            vendor: "Microchip",
            chips: [
                (name: "25LC256", size: KiB(32), page_size: 64, address_bits: 16),
                (
                    name: "25LC1024",
                    size: KiB(128),
                    page_size: 256,
                    address_bits: 24,
                    features: (page_erase: true, sector_erase: true, chip_erase: true, signature: true),
                    signature: Some(0x29),
                ),
            ],
        )
        "#;

        let mut db = ChipDatabase::new();
        let count = db.load_ron(ron).unwrap();

        assert_eq!(count, 2);
        assert_eq!(db.len(), 2);

        let chip = db.find_by_name("25lc256").unwrap();
        assert_eq!(chip.vendor, "Microchip");
        assert_eq!(chip.total_size, 32 * 1024);
        assert_eq!(chip.address_width, AddressWidth::Bits16);
        assert!(chip.features.is_empty());

        let big = db.find_by_name("25LC1024").unwrap();
        assert_eq!(big.address_width, AddressWidth::Bits24);
        assert!(big.features.contains(Features::ERASE | Features::SIGNATURE));
        assert!(!big.features.contains(Features::DEEP_POWER_DOWN));
        assert_eq!(big.signature, Some(0x29));
    }

    #[test]
    fn test_rejects_oversized_part() {
        let ron = r#"(vendor: "X", chips: [(name: "bad", size: KiB(1), page_size: 16, address_bits: 8)])"#;
        let mut db = ChipDatabase::new();
        assert!(matches!(db.load_ron(ron), Err(ChipDbError::Validation(_))));
        assert!(db.is_empty());
    }

    #[test]
    fn test_rejects_bad_page_size() {
        let ron = r#"(vendor: "X", chips: [(name: "bad", size: B(256), page_size: 24, address_bits: 8)])"#;
        let mut db = ChipDatabase::new();
        assert!(matches!(db.load_ron(ron), Err(ChipDbError::Validation(_))));
    }

    #[test]
    fn test_builtin_lookup_by_vendor_name() {
        let db = ChipDatabase::builtin();
        assert_eq!(db.len(), CHIPS.len());
        let chip = db.find_by_name("25AA040A").unwrap();
        assert_eq!(chip.name, "25xx040A");
        assert_eq!(chip.address_width, AddressWidth::Bits9);
    }

    #[test]
    fn test_file_entry_overrides_builtin() {
        let mut db = ChipDatabase::builtin();
        db.load_ron(r#"(vendor: "Custom", chips: [(name: "25xx256", size: KiB(32), page_size: 32, address_bits: 16)])"#)
            .unwrap();
        assert_eq!(db.find_by_name("25xx256").unwrap().page_size, 32);
    }

    #[test]
    fn test_override_reached_through_vendor_name() {
        let mut db = ChipDatabase::builtin();
        db.load_ron(r#"(vendor: "Custom", chips: [(name: "25xx256", size: KiB(32), page_size: 32, address_bits: 16)])"#)
            .unwrap();
        let chip = db.find_by_name("25LC256").unwrap();
        assert_eq!(chip.vendor, "Custom");
    }

    #[test]
    fn test_size_conversion() {
        assert_eq!(Size::B(256).to_bytes(), Some(256));
        assert_eq!(Size::KiB(4).to_bytes(), Some(4096));
        assert_eq!(Size::KiB(128).to_bytes(), Some(131072));
        assert_eq!(Size::KiB(4194304).to_bytes(), None);
    }

    #[test]
    fn test_oversized_kib_rejected() {
        let ron = r#"(vendor: "X", chips: [(name: "huge", size: KiB(4194304), page_size: 64, address_bits: 24)])"#;
        let mut db = ChipDatabase::new();
        assert!(matches!(db.load_ron(ron), Err(ChipDbError::Validation(_))));
    }

    #[test]
    fn test_zero_size_rejected() {
        let ron = r#"(vendor: "X", chips: [(name: "empty", size: B(0), page_size: 16, address_bits: 16)])"#;
        let mut db = ChipDatabase::new();
        assert!(matches!(db.load_ron(ron), Err(ChipDbError::Validation(_))));
    }

    #[test]
    fn test_9bit_erase_features_rejected() {
        let ron = r#"(vendor: "X", chips: [(name: "odd", size: B(512), page_size: 16, address_bits: 9,
            features: (sector_erase: true))])"#;
        let mut db = ChipDatabase::new();
        assert!(matches!(db.load_ron(ron), Err(ChipDbError::Validation(_))));

        let ron = r#"(vendor: "X", chips: [(name: "sig", size: B(512), page_size: 16, address_bits: 9,
            features: (signature: true), signature: Some(0x29))])"#;
        assert!(db.load_ron(ron).is_ok());
    }
}
