//! 25LCxxxx/25AAxxxx instruction set
//!
//! Opcodes shared by the whole family, followed by the additional
//! instructions only implemented by the 25xx512 and 25xx1024.

// ============================================================================
// Memory array
// ============================================================================

/// Read data from memory array beginning at selected address
pub const READ: u8 = 0x03;
/// Write data to memory array beginning at selected address
pub const WRITE: u8 = 0x02;

// ============================================================================
// Write control
// ============================================================================

/// Set the write enable latch (enable write operations)
pub const WREN: u8 = 0x06;
/// Reset the write enable latch (disable write operations)
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status register operations
// ============================================================================

/// Read STATUS register
pub const RDSR: u8 = 0x05;
/// Write STATUS register
pub const WRSR: u8 = 0x01;

// ============================================================================
// 25xx512 / 25xx1024 only
// ============================================================================

/// Page erase - erase one page in memory array
pub const PE: u8 = 0x42;
/// Sector erase - erase one sector in memory array
pub const SE: u8 = 0xD8;
/// Chip erase - erase all sectors in memory array
pub const CE: u8 = 0xC7;
/// Release from deep power-down and read electronic signature
pub const RDID: u8 = 0xAB;
/// Deep power-down mode
pub const DPD: u8 = 0xB9;

// ============================================================================
// Status register bits
// ============================================================================

/// Write-in-progress
pub const SR_WIP: u8 = 1 << 0;
/// Write enable latch
pub const SR_WEL: u8 = 1 << 1;
/// Block protect bit 0
pub const SR_BP0: u8 = 1 << 2;
/// Block protect bit 1
pub const SR_BP1: u8 = 1 << 3;
/// Write-protect enable
pub const SR_WPEN: u8 = 1 << 7;

/// Opcode bit carrying address bit A8 on 9-bit parts (25xx040)
pub const A8_OPCODE_BIT: u8 = 1 << 3;

/// Value the array reads back as after an erase
pub const ERASED_VALUE: u8 = 0xFF;
