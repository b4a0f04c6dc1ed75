//! Transport traits and abstractions
//!
//! This module defines the byte-oriented, chip-select aware link the driver
//! talks to the EEPROM through.

mod traits;

pub use traits::*;
