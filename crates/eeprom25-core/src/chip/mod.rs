//! EEPROM part definitions
//!
//! A built-in table of the 25xx family is always available. With the `std`
//! feature additional parts can be loaded from RON files.

mod features;
mod types;

#[cfg(feature = "std")]
mod database;

pub use features::Features;
pub use types::*;

#[cfg(feature = "std")]
pub use database::*;
