//! eeprom25-linux-spi - 25xx EEPROMs on a Linux spidev node
//!
//! [`LinuxSpi`] implements [`Transport`](eeprom25_core::transport::Transport)
//! on top of `/dev/spidevX.Y`, so a part wired to a board's SPI controller
//! can be driven by [`eeprom25_core::Eeprom`] from user space.
//!
//! ```no_run
//! use eeprom25_core::{chip, DeviceConfig, Eeprom};
//! use eeprom25_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! let spi = LinuxSpi::new(LinuxSpiConfig::new("/dev/spidev0.0").with_speed(2_000_000));
//! let part = chip::find_chip("25LC256").ok_or("unknown part")?;
//! let mut eeprom = Eeprom::new(spi, DeviceConfig::from_chip(part)?);
//! eeprom.init()?;
//!
//! let mut buf = [0u8; 16];
//! eeprom.read(0, &mut buf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! From the command line:
//!
//! ```bash
//! eeprom25 read -t linux_spi:dev=/dev/spidev0.0 -c 25LC256 -o dump.bin
//! eeprom25 status -t linux_spi:dev=/dev/spidev0.0,spispeed=4000,mode=3 -c 25LC256
//! ```
//!
//! The kernel needs `CONFIG_SPI_SPIDEV`, the user needs read/write access to
//! the node, and the EEPROM's HOLD pin must be tied high.

pub mod device;
pub mod error;

pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

/// Boxed, unopened transport built from CLI options
///
/// Options: `dev=<path>` (required), `spispeed=<kHz>` (default 1000),
/// `mode=<0|3>` (default 0). The node is opened by
/// [`Transport::init`](eeprom25_core::transport::Transport::init).
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn eeprom25_core::transport::Transport + Send>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    Ok(Box::new(LinuxSpi::new(config)))
}
