//! Command framer
//!
//! Builds the opcode + address header of memory array commands.

use super::opcodes::{A8_OPCODE_BIT, READ, WRITE};
use super::AddressWidth;
use core::ops::Deref;
use heapless::Vec;

/// Longest possible header: opcode plus three address bytes
pub const MAX_FRAME_LEN: usize = 4;

/// Opcode and address bytes of one command, ready to transmit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl CommandFrame {
    /// The opcode byte actually sent (including a folded A8 bit)
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// The frame as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Deref for CommandFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Assemble the command header for `opcode` at `address`
///
/// The address must fit `width`; higher bits are silently dropped. On 9-bit
/// parts A8 is folded into READ and WRITE only; every other opcode goes out
/// unchanged.
pub fn assemble(width: AddressWidth, opcode: u8, address: u32) -> CommandFrame {
    debug_assert!(width.contains(address), "address 0x{:X} exceeds {:?}", address, width);

    let opcode = match (width, opcode) {
        (AddressWidth::Bits9, READ | WRITE) if address & (1 << 8) != 0 => opcode | A8_OPCODE_BIT,
        _ => opcode,
    };

    let mut buf = [0u8; MAX_FRAME_LEN];
    buf[0] = opcode;
    let len = 1 + width.bytes() as usize;
    width.encode(address, &mut buf[1..len]);

    let mut bytes = Vec::new();
    // Cannot fail: len <= MAX_FRAME_LEN
    let _ = bytes.extend_from_slice(&buf[..len]);
    CommandFrame { bytes }
}
