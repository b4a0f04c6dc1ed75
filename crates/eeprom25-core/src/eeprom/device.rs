//! EEPROM driver
//!
//! [`Eeprom`] owns a transport and sequences the 25xx command protocol on
//! top of it:
//!
//! - Every WRITE is preceded by WREN, and the previous write cycle must have
//!   finished (WIP clear) before WREN is sent.
//! - Writes are split at page boundaries; each page is a separate WRITE
//!   instruction with its own write cycle.
//! - Reads are a single READ instruction of any length but are refused while
//!   a write cycle is running.
//!
//! Uses `maybe_async` to support both sync and async modes.

use crate::chip::Features;
use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::opcodes;
use crate::status::{BlockProtection, Status};
use crate::transport::Transport;
use maybe_async::maybe_async;

use super::config::DeviceConfig;

/// Largest range [`Eeprom::erase`] accepts in one call
pub const ERASE_BUFFER_SIZE: usize = 256;

/// Driver for one 25xx EEPROM
///
/// Each instance carries its own initialization state, so any number of
/// devices can be driven side by side.
///
/// # Example
///
/// ```ignore
/// use eeprom25_core::{chip, DeviceConfig, Eeprom};
///
/// let config = DeviceConfig::from_chip(chip::find_chip("25LC640A").unwrap())?;
/// let mut eeprom = Eeprom::new(spi, config);
/// eeprom.init()?;
/// eeprom.write(0x40, b"calibration")?;
/// ```
#[derive(Debug)]
pub struct Eeprom<T> {
    transport: T,
    config: DeviceConfig,
    initialized: bool,
}

impl<T: Transport> Eeprom<T> {
    /// Create a driver; no bus traffic happens until [`Eeprom::init`]
    pub fn new(transport: T, config: DeviceConfig) -> Self {
        Self {
            transport,
            config,
            initialized: false,
        }
    }

    /// Get the device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns true once [`Eeprom::init`] has succeeded and until
    /// [`Eeprom::deinit`] succeeds
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get a reference to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the driver and return the transport
    pub fn release(self) -> T {
        self.transport
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Precondition checks shared by read and write
    fn check_request(&self, addr: u32, len: usize) -> Result<()> {
        self.ensure_initialized()?;
        if len == 0 {
            return Err(Error::InvalidLength);
        }
        if !self.config.is_valid_range(addr, len) {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(())
    }

    fn require(&self, feature: Features) -> Result<()> {
        if self.config.features.contains(feature) {
            Ok(())
        } else {
            Err(Error::OpcodeNotSupported)
        }
    }
}

#[maybe_async]
impl<T: Transport> Eeprom<T> {
    /// Bring up the transport and check that the device answers
    ///
    /// Sends WREN and reads the latch back. Only if it reads as set is the
    /// driver marked initialized.
    ///
    /// # Errors
    /// * `InitFailed` - WEL did not read back as set
    /// * any transport error
    pub async fn init(&mut self) -> Result<()> {
        self.transport.init().await?;
        protocol::write_enable(&mut self.transport).await?;

        if !protocol::check_wel(&mut self.transport).await? {
            log::warn!("WEL not set after WREN; is a device connected?");
            return Err(Error::InitFailed);
        }

        log::debug!(
            "EEPROM ready: {} bytes, {}-byte pages, {}-bit addressing",
            self.config.total_size,
            self.config.page_size,
            self.config.address_width.bits()
        );
        self.initialized = true;
        Ok(())
    }

    /// Clear the write enable latch and mark the driver uninitialized
    ///
    /// # Errors
    /// * `DeinitFailed` - WEL still reads as set after WRDI; the driver stays
    ///   initialized
    /// * any transport error
    pub async fn deinit(&mut self) -> Result<()> {
        protocol::write_disable(&mut self.transport).await?;

        if protocol::check_wel(&mut self.transport).await? {
            log::warn!("WEL still set after WRDI");
            return Err(Error::DeinitFailed);
        }

        self.initialized = false;
        Ok(())
    }

    /// Write `data` starting at `addr`
    ///
    /// The range is split at page boundaries. Before each page the previous
    /// write cycle is awaited (bounded by the configured timeout) and WEL is
    /// set. The write cycle of the last page is not awaited; use
    /// [`Eeprom::wait_idle`] before reading back.
    ///
    /// # Errors
    /// * `NotInitialized`, `InvalidLength`, `AddressOutOfBounds` - before any
    ///   bus traffic
    /// * `WriteTimeout` - a previous write cycle did not finish; the
    ///   remaining pages are not written
    /// * any transport error, aborting the remaining pages
    pub async fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.check_request(addr, data.len())?;

        let splitter = self.config.splitter();
        let mut offset = 0usize;

        for (page_addr, len) in splitter.chunks(addr, data.len() as u32) {
            let chunk = &data[offset..offset + len as usize];
            log::debug!("write page chunk: {:#07x} + {}", page_addr, len);

            self.wait_previous_write().await?;
            protocol::write_enable(&mut self.transport).await?;
            protocol::program_page(&mut self.transport, self.config.address_width, page_addr, chunk).await?;

            offset += len as usize;
        }

        Ok(())
    }

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// WIP is checked once; reads are not queued behind a running write
    /// cycle.
    ///
    /// # Errors
    /// * `NotInitialized`, `InvalidLength`, `AddressOutOfBounds` - before any
    ///   bus traffic
    /// * `Busy` - a write cycle is running; no READ instruction was sent
    /// * any transport error
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.check_request(addr, buf.len())?;

        if protocol::is_busy(&mut self.transport).await? {
            log::debug!("read at {:#07x} refused: write in progress", addr);
            return Err(Error::Busy);
        }

        log::debug!("read: {:#07x} + {}", addr, buf.len());
        protocol::read_array(&mut self.transport, self.config.address_width, addr, buf).await
    }

    /// Fill `len` bytes starting at `addr` with the erased value (0xFF)
    ///
    /// Goes through [`Eeprom::write`], so page splitting and write cycle
    /// handling are the same. At most [`ERASE_BUFFER_SIZE`] bytes per call.
    ///
    /// # Errors
    /// * `InvalidLength` - `len` is zero or larger than [`ERASE_BUFFER_SIZE`]
    /// * everything [`Eeprom::write`] returns
    pub async fn erase(&mut self, addr: u32, len: usize) -> Result<()> {
        self.ensure_initialized()?;
        if len > ERASE_BUFFER_SIZE {
            return Err(Error::InvalidLength);
        }

        let staging = [opcodes::ERASED_VALUE; ERASE_BUFFER_SIZE];
        self.write(addr, &staging[..len]).await
    }

    /// Set the block protection level
    ///
    /// Read-modify-write of the STATUS register; WPEN is preserved. The
    /// protection only guards the array while the WP pin is driven low,
    /// which the driver cannot observe.
    pub async fn set_protection(&mut self, level: BlockProtection) -> Result<()> {
        self.ensure_initialized()?;

        let mut status = protocol::read_status(&mut self.transport).await?;
        status.set_block_protection(level);
        log::debug!("set block protection: {}", level);
        self.write_status(status).await
    }

    /// Decode the current block protection level
    pub async fn protection(&mut self) -> Result<BlockProtection> {
        Ok(self.read_status().await?.block_protection())
    }

    /// Enable or disable the WP pin's guard over the STATUS register
    pub async fn set_write_protect_enable(&mut self, enable: bool) -> Result<()> {
        self.ensure_initialized()?;

        let mut status = protocol::read_status(&mut self.transport).await?;
        status.set_wpen(enable);
        self.write_status(status).await
    }

    /// Read the STATUS register
    pub async fn read_status(&mut self) -> Result<Status> {
        protocol::read_status(&mut self.transport).await
    }

    /// Write the STATUS register and wait for the write cycle
    ///
    /// Only BP1, BP0 and WPEN are written.
    pub async fn write_status(&mut self, status: Status) -> Result<()> {
        self.ensure_initialized()?;

        self.wait_previous_write().await?;
        protocol::write_enable(&mut self.transport).await?;
        protocol::write_status(&mut self.transport, status).await?;
        self.wait_idle().await
    }

    /// Returns true while a write cycle is running
    pub async fn is_busy(&mut self) -> Result<bool> {
        protocol::is_busy(&mut self.transport).await
    }

    /// Wait for the current write cycle to finish
    ///
    /// Bounded by the configured write timeout and poll ceiling.
    pub async fn wait_idle(&mut self) -> Result<()> {
        protocol::wait_for_write_completion(
            &mut self.transport,
            self.config.write_timeout_ms,
            self.config.max_poll_iterations,
        )
        .await
    }

    /// Set the write enable latch
    pub async fn write_enable(&mut self) -> Result<()> {
        protocol::write_enable(&mut self.transport).await
    }

    /// Clear the write enable latch
    pub async fn write_disable(&mut self) -> Result<()> {
        protocol::write_disable(&mut self.transport).await
    }

    /// Erase the page containing `addr` (PE)
    pub async fn page_erase(&mut self, addr: u32) -> Result<()> {
        self.require(Features::PAGE_ERASE)?;
        self.erase_command(opcodes::PE, addr).await
    }

    /// Erase the sector containing `addr` (SE)
    pub async fn sector_erase(&mut self, addr: u32) -> Result<()> {
        self.require(Features::SECTOR_ERASE)?;
        self.erase_command(opcodes::SE, addr).await
    }

    /// Erase the whole array (CE)
    ///
    /// Does not wait for the (long) erase cycle.
    pub async fn chip_erase(&mut self) -> Result<()> {
        self.require(Features::CHIP_ERASE)?;
        self.ensure_initialized()?;

        self.wait_previous_write().await?;
        protocol::write_enable(&mut self.transport).await?;
        log::debug!("chip erase");
        protocol::send_instruction(&mut self.transport, opcodes::CE).await
    }

    /// Release from deep power-down and read the electronic signature
    pub async fn read_signature(&mut self) -> Result<u8> {
        self.require(Features::SIGNATURE)?;
        protocol::read_signature(&mut self.transport, self.config.address_width).await
    }

    /// Enter deep power-down
    ///
    /// Only [`Eeprom::read_signature`] wakes the device up again.
    pub async fn deep_power_down(&mut self) -> Result<()> {
        self.require(Features::DEEP_POWER_DOWN)?;
        self.ensure_initialized()?;

        self.wait_previous_write().await?;
        protocol::send_instruction(&mut self.transport, opcodes::DPD).await
    }

    async fn erase_command(&mut self, opcode: u8, addr: u32) -> Result<()> {
        self.ensure_initialized()?;
        if !self.config.is_valid_range(addr, 1) {
            return Err(Error::AddressOutOfBounds);
        }

        self.wait_previous_write().await?;
        protocol::write_enable(&mut self.transport).await?;
        log::debug!("erase {:#04x} at {:#07x}", opcode, addr);
        protocol::erase_at(&mut self.transport, self.config.address_width, opcode, addr).await
    }

    async fn wait_previous_write(&mut self) -> Result<()> {
        self.wait_idle().await
    }
}
