//! SPI types and command framing
//!
//! This module provides the address-width selection, chip-select modes,
//! the 25xx instruction set and the command framer.

mod address;
mod chip_select;
mod frame;
pub mod opcodes;

pub use address::AddressWidth;
pub use chip_select::CsMode;
pub use frame::{assemble, CommandFrame, MAX_FRAME_LEN};
pub use opcodes::*;
