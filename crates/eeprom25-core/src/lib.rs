//! eeprom25-core - Driver for 25LCxxxx/25AAxxxx SPI EEPROMs
//!
//! This crate translates byte-range read/write/erase requests into the
//! command sequences understood by the Microchip 25xx family of serial
//! EEPROMs. It is designed to be `no_std` compatible for use in embedded
//! environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`) and the
//!   RON chip database
//! - `alloc` - Enable heap allocation (boxed transports)
//! - `is_sync` - Compile the driver as blocking code instead of `async`
//!
//! # Example
//!
//! ```ignore
//! use eeprom25_core::{chip, Eeprom, DeviceConfig};
//!
//! fn store<T: eeprom25_core::transport::Transport>(transport: T) -> eeprom25_core::Result<()> {
//!     let config = DeviceConfig::from_chip(chip::find_chip("25LC256").unwrap())?;
//!     let mut eeprom = Eeprom::new(transport, config);
//!     eeprom.init()?;
//!     eeprom.write(0x0100, b"hello")?;
//!     eeprom.wait_idle()?;
//!     let mut buf = [0u8; 5];
//!     eeprom.read(0x0100, &mut buf)?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod eeprom;
pub mod error;
pub mod protocol;
pub mod spi;
pub mod status;
pub mod transport;

pub use eeprom::{DeviceConfig, Eeprom, PageSplitter};
pub use error::{Error, ErrorKind, Result};
pub use status::{BlockProtection, Status};
