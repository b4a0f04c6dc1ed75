//! spidev-backed [`Transport`]
//!
//! spidev has no call that only asserts chip-select, so bytes sent while
//! chip-select is held are queued and go out as one `SPI_IOC_MESSAGE` when
//! the data phase arrives or chip-select is released. A receive that must
//! leave chip-select asserted sets `cs_change` on its last transfer, which
//! makes the kernel keep the line active after the message.

use crate::error::{LinuxSpiError, Result};

use eeprom25_core::error::{Error as CoreError, Result as CoreResult};
use eeprom25_core::spi::CsMode;
use eeprom25_core::transport::Transport;

use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

const SPIDEV_BUFSIZ: &str = "/sys/module/spidev/parameters/bufsiz";

/// 1 MHz works with every 25xx part at any supply voltage
const DEFAULT_SPEED_HZ: u32 = 1_000_000;

/// SPI modes the 25xx parts accept
pub mod mode {
    /// CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

mod ioctl {
    use nix::ioctl_write_ptr;

    const MAGIC: u8 = b'k';

    ioctl_write_ptr!(write_mode, MAGIC, 1, u8);
    ioctl_write_ptr!(write_bits_per_word, MAGIC, 3, u8);
    ioctl_write_ptr!(write_max_speed_hz, MAGIC, 4, u32);

    /// `sizeof(struct spi_ioc_transfer)`
    pub const TRANSFER_SIZE: usize = 32;

    /// `SPI_IOC_MESSAGE(n)`, i.e. `_IOW('k', 0, char[n * TRANSFER_SIZE])`
    pub fn message(n: usize) -> libc::c_ulong {
        let size = (n * TRANSFER_SIZE) as u32;
        ((1u32 << 30) | (size << 16) | ((MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// Kernel `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

impl SpiIocTransfer {
    fn new(len: usize, speed_hz: u32) -> Self {
        Self {
            len: len as u32,
            speed_hz,
            bits_per_word: 8,
            ..Default::default()
        }
    }
}

/// Transfers for one message: `tx` clocked out, then `rx` clocked in
///
/// With `keep_cs` the final transfer sets `cs_change`, leaving chip-select
/// asserted once the message completes.
fn build_message(tx: &[u8], rx: &mut [u8], speed_hz: u32, keep_cs: bool) -> Vec<SpiIocTransfer> {
    let mut transfers = Vec::with_capacity(2);

    if !tx.is_empty() {
        let mut t = SpiIocTransfer::new(tx.len(), speed_hz);
        t.tx_buf = tx.as_ptr() as u64;
        transfers.push(t);
    }
    if !rx.is_empty() {
        let mut t = SpiIocTransfer::new(rx.len(), speed_hz);
        t.rx_buf = rx.as_mut_ptr() as u64;
        transfers.push(t);
    }
    if let Some(last) = transfers.last_mut() {
        last.cs_change = u8::from(keep_cs);
    }

    transfers
}

/// Where and how to reach the EEPROM
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// spidev node, e.g. `/dev/spidev0.0`
    pub device: String,
    /// Clock rate in Hz
    pub speed_hz: u32,
    /// SPI mode, 0 or 3
    pub mode: u8,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
        }
    }
}

impl LinuxSpiConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }
}

/// EEPROM transport over a Linux spidev node
///
/// Created closed; [`Transport::init`] (or [`LinuxSpi::open`]) opens and
/// configures the node.
pub struct LinuxSpi {
    config: LinuxSpiConfig,
    file: Option<File>,
    /// Largest message spidev accepts
    bufsiz: usize,
    /// Command bytes queued under the current chip-select window
    queued: Vec<u8>,
    epoch: Instant,
}

impl LinuxSpi {
    /// Create a transport without touching the device
    pub fn new(config: LinuxSpiConfig) -> Self {
        Self {
            config,
            file: None,
            bufsiz: 0,
            queued: Vec::new(),
            epoch: Instant::now(),
        }
    }

    /// Create a transport and open the device right away
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        let mut spi = Self::new(config.clone());
        spi.open_device()?;
        Ok(spi)
    }

    pub fn config(&self) -> &LinuxSpiConfig {
        &self.config
    }

    fn open_device(&mut self) -> Result<()> {
        if self.config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.config.device)
            .map_err(|source| LinuxSpiError::Open {
                path: self.config.device.clone(),
                source,
            })?;
        let fd = file.as_raw_fd();

        let mode = self.config.mode;
        let bits: u8 = 8;
        let speed = self.config.speed_hz;
        configure(fd, "mode", mode as u32, |fd| unsafe {
            ioctl::write_mode(fd, &mode)
        })?;
        configure(fd, "bits per word", bits as u32, |fd| unsafe {
            ioctl::write_bits_per_word(fd, &bits)
        })?;
        configure(fd, "max speed", speed, |fd| unsafe {
            ioctl::write_max_speed_hz(fd, &speed)
        })?;

        self.bufsiz = spidev_bufsiz();
        log::info!(
            "linux_spi: {} ready (mode {}, {} kHz, {} byte messages)",
            self.config.device,
            mode,
            speed / 1000,
            self.bufsiz
        );

        self.file = Some(file);
        Ok(())
    }

    fn fd(&self) -> Result<RawFd> {
        self.file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .ok_or_else(|| LinuxSpiError::NotOpen(self.config.device.clone()))
    }

    /// Run one SPI_IOC_MESSAGE
    fn message(&self, tx: &[u8], rx: &mut [u8], keep_cs: bool) -> Result<()> {
        let fd = self.fd()?;
        let len = tx.len() + rx.len();
        if len > self.bufsiz {
            return Err(LinuxSpiError::TooLong {
                len,
                limit: self.bufsiz,
            });
        }

        let transfers = build_message(tx, rx, self.config.speed_hz, keep_cs);
        if transfers.is_empty() {
            return Ok(());
        }

        log::trace!("linux_spi: {} out, {} in, keep_cs={}", tx.len(), rx.len(), keep_cs);
        let ret = unsafe { libc::ioctl(fd, ioctl::message(transfers.len()), transfers.as_ptr()) };
        if ret < 0 {
            return Err(LinuxSpiError::Message(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Flush the queued command bytes and clock in `buf`
    ///
    /// A `buf` too large for one message is split; every message but the
    /// last keeps chip-select asserted.
    fn read_phase(&mut self, buf: &mut [u8], keep_cs: bool) -> Result<()> {
        let tx = core::mem::take(&mut self.queued);
        if tx.len() + buf.len() <= self.bufsiz {
            return self.message(&tx, buf, keep_cs);
        }

        self.message(&tx, &mut [], true)?;
        let count = buf.len().div_ceil(self.bufsiz);
        for (i, chunk) in buf.chunks_mut(self.bufsiz).enumerate() {
            self.message(&[], chunk, i + 1 < count || keep_cs)?;
        }
        Ok(())
    }
}

fn configure<F>(fd: RawFd, setting: &'static str, value: u32, op: F) -> Result<()>
where
    F: FnOnce(RawFd) -> nix::Result<libc::c_int>,
{
    op(fd).map(drop).map_err(|e| LinuxSpiError::Configure {
        setting,
        value,
        source: std::io::Error::from_raw_os_error(e as i32),
    })
}

fn to_core(e: LinuxSpiError) -> CoreError {
    log::error!("linux_spi: {}", e);
    match e {
        LinuxSpiError::NotOpen(_) | LinuxSpiError::NoDevice | LinuxSpiError::Open { .. } => {
            CoreError::TransportNotReady
        }
        _ => CoreError::TransportError,
    }
}

impl Transport for LinuxSpi {
    fn init(&mut self) -> CoreResult<()> {
        if self.file.is_none() {
            // Any failure to bring the node up leaves the transport unusable
            self.open_device().map_err(|e| {
                to_core(e);
                CoreError::TransportNotReady
            })?;
        }
        Ok(())
    }

    fn transmit(&mut self, data: &[u8], cs: CsMode) -> CoreResult<()> {
        if cs.asserts() {
            self.queued.clear();
        }
        self.queued.extend_from_slice(data);

        if cs.deasserts() {
            let tx = core::mem::take(&mut self.queued);
            self.message(&tx, &mut [], false).map_err(to_core)?;
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], cs: CsMode) -> CoreResult<()> {
        if cs.asserts() {
            self.queued.clear();
        }
        self.read_phase(buf, !cs.deasserts()).map_err(to_core)
    }

    fn now_ms(&mut self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

/// spidev message size limit, falling back to the system page size
fn spidev_bufsiz() -> usize {
    let from_sysfs = std::fs::read_to_string(SPIDEV_BUFSIZ)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0);

    match from_sysfs {
        Some(n) => n,
        None => {
            let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
            log::debug!("linux_spi: {} unreadable, assuming {} bytes", SPIDEV_BUFSIZ, page);
            page
        }
    }
}

/// Build a [`LinuxSpiConfig`] from `key=value` options
///
/// Accepts `dev=<path>` (required), `spispeed=<kHz>` and `mode=<0|3>`.
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxSpiConfig> {
    let mut config = LinuxSpiConfig::default();

    for &(key, value) in options {
        match key {
            "dev" => config.device = value.to_string(),
            "spispeed" => {
                config.speed_hz = value
                    .parse::<u32>()
                    .ok()
                    .and_then(|khz| khz.checked_mul(1000))
                    .ok_or_else(|| LinuxSpiError::Option(format!("spispeed={}", value)))?;
            }
            "mode" => {
                config.mode = match value {
                    "0" => mode::MODE_0,
                    "3" => mode::MODE_3,
                    _ => {
                        return Err(LinuxSpiError::Option(format!(
                            "mode={} (25xx parts support 0 or 3)",
                            value
                        )))
                    }
                };
            }
            _ => log::warn!("linux_spi: ignoring unknown option {}={}", key, value),
        }
    }

    if config.device.is_empty() {
        return Err(LinuxSpiError::NoDevice);
    }
    Ok(config)
}
