//! eeprom25-dummy - In-memory 25xx EEPROM emulator for testing
//!
//! [`DummyEeprom`] implements [`Transport`] and answers the 25xx instruction
//! set the way a real part does: commands execute when chip-select is
//! released, writes need the write enable latch, page writes wrap within
//! the page, and every write starts a write cycle that keeps WIP set for a
//! number of simulated milliseconds. The simulated clock advances by one
//! millisecond every time [`Transport::now_ms`] is called.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use eeprom25_core::chip::{Chip, Features};
use eeprom25_core::error::{Error, Result};
use eeprom25_core::spi::{opcodes, AddressWidth, CsMode};
use eeprom25_core::status::Status;
use eeprom25_core::transport::Transport;

/// Configuration for the emulated part
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Array size in bytes
    pub total_size: u32,
    /// Write page size in bytes
    pub page_size: u32,
    /// Address field width
    pub address_width: AddressWidth,
    /// Optional instructions
    pub features: Features,
    /// Value returned by RDID
    pub signature: Option<u8>,
    /// Length of one internal write cycle in simulated milliseconds
    pub write_cycle_ms: u32,
}

impl DummyConfig {
    /// Emulate a built-in part
    pub fn from_chip(chip: &Chip) -> Self {
        Self {
            total_size: chip.total_size,
            page_size: chip.page_size as u32,
            address_width: chip.address_width,
            features: chip.features,
            signature: chip.signature,
            write_cycle_ms: 5,
        }
    }

    /// Sector size for SE; the erase-capable parts have four sectors
    pub fn sector_size(&self) -> u32 {
        self.total_size / 4
    }
}

impl Default for DummyConfig {
    /// A 25LC256: 32 KiB, 64-byte pages, 16-bit addressing
    fn default() -> Self {
        Self {
            total_size: 32 * 1024,
            page_size: 64,
            address_width: AddressWidth::Bits16,
            features: Features::empty(),
            signature: None,
            write_cycle_ms: 5,
        }
    }
}

/// Fault injection switches
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// WIP never clears once a write cycle starts
    pub stuck_busy: bool,
    /// Every transfer after this many successful ones fails
    pub fail_transport_after: Option<u32>,
    /// [`Transport::now_ms`] stops advancing
    pub frozen_clock: bool,
    /// WREN is ignored (no device on the bus)
    pub ignore_write_enable: bool,
}

/// Transfer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyStats {
    /// `transmit` calls
    pub transmits: u32,
    /// `receive` calls
    pub receives: u32,
    /// READ instructions that returned array data
    pub array_reads: u32,
    /// WRITE instructions that modified the array
    pub page_writes: u32,
    /// WRSR instructions that modified the STATUS register
    pub status_writes: u32,
    /// PE/SE/CE instructions that erased something
    pub erases: u32,
}

/// Emulated 25xx EEPROM
///
/// # Example
///
/// ```ignore
/// let dummy = DummyEeprom::new(DummyConfig::default());
/// let config = DeviceConfig::new(AddressWidth::Bits16, 32 * 1024, 64)?;
/// let mut eeprom = Eeprom::new(dummy, config);
/// eeprom.init()?;
/// ```
#[cfg(feature = "alloc")]
pub struct DummyEeprom {
    config: DummyConfig,
    data: Vec<u8>,
    status: Status,
    clock: u32,
    cycle_started: Option<u32>,
    selected: bool,
    frame: Vec<u8>,
    read_cursor: Option<u32>,
    powered_down: bool,
    wp_asserted: bool,
    faults: Faults,
    transfers: u32,
    stats: DummyStats,
}

#[cfg(feature = "alloc")]
impl DummyEeprom {
    /// Create an erased device
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![opcodes::ERASED_VALUE; config.total_size as usize];
        Self {
            config,
            data,
            status: Status::empty(),
            clock: 0,
            cycle_started: None,
            selected: false,
            frame: Vec::new(),
            read_cursor: None,
            powered_down: false,
            wp_asserted: false,
            faults: Faults::default(),
            transfers: 0,
            stats: DummyStats::default(),
        }
    }

    /// Create an emulated 25LC256
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a device with pre-filled array contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut dev = Self::new(config);
        let len = core::cmp::min(initial_data.len(), dev.data.len());
        dev.data[..len].copy_from_slice(&initial_data[..len]);
        dev
    }

    /// Get a reference to the array contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the array contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Current STATUS register value
    pub fn status(&mut self) -> Status {
        self.update_write_cycle();
        self.status
    }

    /// Transfer counters
    pub fn stats(&self) -> DummyStats {
        self.stats
    }

    /// Mutable access to the fault injection switches
    pub fn faults_mut(&mut self) -> &mut Faults {
        &mut self.faults
    }

    /// Keep WIP set forever once a write cycle starts
    pub fn stuck_busy(mut self) -> Self {
        self.faults.stuck_busy = true;
        self
    }

    /// Fail every transfer after `n` successful ones
    pub fn fail_transport_after(mut self, n: u32) -> Self {
        self.faults.fail_transport_after = Some(n);
        self
    }

    /// Stop the simulated clock
    pub fn frozen_clock(mut self) -> Self {
        self.faults.frozen_clock = true;
        self
    }

    /// Drive the WP pin (true = asserted, i.e. held low)
    pub fn set_wp_pin(&mut self, asserted: bool) {
        self.wp_asserted = asserted;
    }

    /// Returns true while in deep power-down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    fn update_write_cycle(&mut self) {
        if let Some(start) = self.cycle_started {
            if !self.faults.stuck_busy && self.clock.wrapping_sub(start) >= self.config.write_cycle_ms {
                self.cycle_started = None;
                self.status.set_wip(false);
            }
        }
    }

    fn start_write_cycle(&mut self) {
        self.status.set_wel(false);
        if self.config.write_cycle_ms > 0 || self.faults.stuck_busy {
            self.status.set_wip(true);
            self.cycle_started = Some(self.clock);
        }
    }

    fn check_fault(&mut self) -> Result<()> {
        if let Some(limit) = self.faults.fail_transport_after {
            if self.transfers >= limit {
                log::debug!("dummy: injected transport failure");
                return Err(Error::TransportError);
            }
        }
        self.transfers += 1;
        Ok(())
    }

    fn select(&mut self) {
        self.selected = true;
        self.frame.clear();
        self.read_cursor = None;
    }

    /// Split the opcode byte into the instruction and the A8 bit
    fn decode_opcode(&self, raw: u8) -> (u8, u32) {
        if self.config.address_width == AddressWidth::Bits9 {
            let base = raw & !opcodes::A8_OPCODE_BIT;
            if raw & opcodes::A8_OPCODE_BIT != 0 && matches!(base, opcodes::READ | opcodes::WRITE) {
                return (base, 1 << 8);
            }
        }
        (raw, 0)
    }

    /// Decode the address following the opcode, if the frame carries one
    fn frame_address(&self) -> Option<u32> {
        let (_, a8) = self.decode_opcode(*self.frame.first()?);
        let bytes = self.config.address_width.bytes() as usize;
        let field = self.frame.get(1..1 + bytes)?;
        let addr = field.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32) | a8;
        Some(addr % self.config.total_size)
    }

    fn protected_start(&self) -> Option<u32> {
        self.status.block_protection().protected_start(self.config.total_size)
    }

    fn is_protected(&self, addr: u32) -> bool {
        self.protected_start().is_some_and(|start| addr >= start)
    }

    /// Execute the buffered command when chip-select is released
    fn deselect(&mut self) {
        self.selected = false;
        self.update_write_cycle();

        let Some(&raw) = self.frame.first() else {
            return;
        };
        let (opcode, _) = self.decode_opcode(raw);

        if self.powered_down {
            if opcode == opcodes::RDID {
                self.powered_down = false;
            }
            return;
        }
        if self.status.wip() {
            log::trace!("dummy: ignoring {:#04x} during write cycle", opcode);
            return;
        }

        match opcode {
            opcodes::WREN if !self.faults.ignore_write_enable => self.status.set_wel(true),
            opcodes::WRDI => self.status.set_wel(false),
            opcodes::WRSR => self.execute_write_status(),
            opcodes::WRITE => self.execute_write(),
            opcodes::PE if self.config.features.contains(Features::PAGE_ERASE) => {
                if let Some(addr) = self.frame_address() {
                    let start = addr - addr % self.config.page_size;
                    self.execute_erase(start, self.config.page_size);
                }
            }
            opcodes::SE if self.config.features.contains(Features::SECTOR_ERASE) => {
                if let Some(addr) = self.frame_address() {
                    let sector = self.config.sector_size();
                    self.execute_erase(addr - addr % sector, sector);
                }
            }
            opcodes::CE if self.config.features.contains(Features::CHIP_ERASE) => {
                if self.protected_start().is_none() {
                    self.execute_erase(0, self.config.total_size);
                } else {
                    self.status.set_wel(false);
                }
            }
            opcodes::DPD if self.config.features.contains(Features::DEEP_POWER_DOWN) => {
                self.powered_down = true;
            }
            _ => {}
        }
    }

    fn execute_write_status(&mut self) {
        if !self.status.wel() {
            return;
        }
        if self.status.wpen() && self.wp_asserted {
            log::debug!("dummy: WRSR blocked by WP pin");
            self.status.set_wel(false);
            return;
        }
        let Some(&value) = self.frame.get(1) else {
            return;
        };
        let kept = self.status.bits() & !Status::WRITABLE.bits();
        self.status = Status::from_raw(kept | (value & Status::WRITABLE.bits()));
        self.stats.status_writes += 1;
        self.start_write_cycle();
    }

    fn execute_write(&mut self) {
        if !self.status.wel() {
            return;
        }
        let Some(addr) = self.frame_address() else {
            return;
        };
        let header = 1 + self.config.address_width.bytes() as usize;
        if self.frame.len() <= header {
            return;
        }
        if self.is_protected(addr) {
            log::debug!("dummy: write to protected address {:#x} dropped", addr);
            self.status.set_wel(false);
            return;
        }

        let page = self.config.page_size;
        let page_start = addr - addr % page;
        let mut offset = addr % page;
        for i in header..self.frame.len() {
            self.data[(page_start + offset) as usize] = self.frame[i];
            // the address counter wraps within the page
            offset = (offset + 1) % page;
        }

        self.stats.page_writes += 1;
        self.start_write_cycle();
    }

    fn execute_erase(&mut self, start: u32, len: u32) {
        if !self.status.wel() {
            return;
        }
        if self.is_protected(start + len - 1) {
            self.status.set_wel(false);
            return;
        }
        self.data[start as usize..(start + len) as usize].fill(opcodes::ERASED_VALUE);
        self.stats.erases += 1;
        self.start_write_cycle();
    }

    /// Produce output bytes for the command currently selected
    fn respond(&mut self, buf: &mut [u8]) {
        self.update_write_cycle();

        let Some(&raw) = self.frame.first() else {
            buf.fill(0xFF);
            return;
        };
        let (opcode, _) = self.decode_opcode(raw);

        if opcode == opcodes::RDID && self.config.features.contains(Features::SIGNATURE) {
            self.powered_down = false;
            buf.fill(self.config.signature.unwrap_or(0xFF));
            return;
        }
        // nothing drives the bus; the line floats high
        if self.powered_down {
            buf.fill(0xFF);
            return;
        }

        match opcode {
            opcodes::RDSR => buf.fill(self.status.bits()),
            opcodes::READ if !self.status.wip() => {
                let mut cursor = match self.read_cursor {
                    Some(cursor) => cursor,
                    None => match self.frame_address() {
                        Some(addr) => {
                            self.stats.array_reads += 1;
                            addr
                        }
                        None => {
                            buf.fill(0xFF);
                            return;
                        }
                    },
                };
                for byte in buf.iter_mut() {
                    *byte = self.data[cursor as usize];
                    cursor = (cursor + 1) % self.config.total_size;
                }
                self.read_cursor = Some(cursor);
            }
            _ => buf.fill(0xFF),
        }
    }
}

#[cfg(feature = "alloc")]
impl Transport for DummyEeprom {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn transmit(&mut self, data: &[u8], cs: CsMode) -> Result<()> {
        self.check_fault()?;
        self.stats.transmits += 1;

        if cs.asserts() {
            self.select();
        }
        if !self.selected {
            log::warn!("dummy: transmit without chip select");
            return Err(Error::TransportError);
        }
        self.frame.extend_from_slice(data);
        if cs.deasserts() {
            self.deselect();
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], cs: CsMode) -> Result<()> {
        self.check_fault()?;
        self.stats.receives += 1;

        if cs.asserts() {
            self.select();
        }
        if !self.selected {
            log::warn!("dummy: receive without chip select");
            return Err(Error::TransportError);
        }
        self.respond(buf);
        if cs.deasserts() {
            self.deselect();
        }
        Ok(())
    }

    fn now_ms(&mut self) -> u32 {
        if !self.faults.frozen_clock {
            self.clock = self.clock.wrapping_add(1);
        }
        self.clock
    }

    // simulated time only moves with `now_ms`
    fn delay_us(&mut self, _us: u32) {}
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use eeprom25_core::chip::find_chip;
    use eeprom25_core::protocol;
    use eeprom25_core::{BlockProtection, DeviceConfig, Eeprom};

    fn device(part: &str) -> (DummyEeprom, DeviceConfig) {
        let chip = find_chip(part).unwrap();
        (
            DummyEeprom::new(DummyConfig::from_chip(chip)),
            DeviceConfig::from_chip(chip).unwrap(),
        )
    }

    fn ready(part: &str) -> Eeprom<DummyEeprom> {
        let (dummy, config) = device(part);
        let mut eeprom = Eeprom::new(dummy, config);
        eeprom.init().unwrap();
        eeprom
    }

    #[test]
    fn test_round_trip_across_pages() {
        let mut eeprom = ready("25LC256");
        let data: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();

        eeprom.write(60, &data).unwrap();
        eeprom.wait_idle().unwrap();

        let mut buf = vec![0u8; data.len()];
        eeprom.read(60, &mut buf).unwrap();
        assert_eq!(buf, data);
        // 60..64, 64..128, 128..192, 192..256, 256..260
        assert_eq!(eeprom.transport().stats().page_writes, 5);
    }

    #[test]
    fn test_raw_write_wraps_within_page() {
        let mut dummy = DummyEeprom::new_default();
        protocol::write_enable(&mut dummy).unwrap();
        protocol::program_page(&mut dummy, AddressWidth::Bits16, 60, &[1, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(&dummy.data()[60..64], &[1, 2, 3, 4]);
        assert_eq!(&dummy.data()[0..2], &[5, 6]);
        assert_eq!(dummy.data()[64], 0xFF);
    }

    #[test]
    fn test_write_without_wel_is_ignored() {
        let mut dummy = DummyEeprom::new_default();
        protocol::program_page(&mut dummy, AddressWidth::Bits16, 0, &[0]).unwrap();
        assert_eq!(dummy.data()[0], 0xFF);
        assert_eq!(dummy.stats().page_writes, 0);
    }

    #[test]
    fn test_read_while_busy_is_rejected() {
        let mut eeprom = ready("25LC256");
        eeprom.write(0, &[0x55; 8]).unwrap();

        let before = eeprom.transport().stats();
        let mut buf = [0u8; 8];
        assert_eq!(eeprom.read(0, &mut buf), Err(Error::Busy));

        let after = eeprom.transport().stats();
        // the WIP check is the only receive
        assert_eq!(after.receives, before.receives + 1);
        assert_eq!(after.array_reads, 0);
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn test_protection_round_trip() {
        let mut eeprom = ready("25LC256");
        eeprom.set_protection(BlockProtection::UpperHalf).unwrap();
        assert_eq!(eeprom.protection().unwrap(), BlockProtection::UpperHalf);
        assert_eq!(eeprom.read_status().unwrap().block_protection(), BlockProtection::UpperHalf);

        // the upper half no longer accepts writes, the lower half does
        eeprom.write(0x4000, &[0x12]).unwrap();
        eeprom.write(0x0000, &[0x34]).unwrap();
        eeprom.wait_idle().unwrap();
        assert_eq!(eeprom.transport().data()[0x4000], 0xFF);
        assert_eq!(eeprom.transport().data()[0x0000], 0x34);

        eeprom.set_protection(BlockProtection::None).unwrap();
        assert_eq!(eeprom.protection().unwrap(), BlockProtection::None);
    }

    #[test]
    fn test_wpen_with_wp_pin_locks_status() {
        let mut eeprom = ready("25LC256");
        eeprom.set_write_protect_enable(true).unwrap();
        eeprom.transport_mut().set_wp_pin(true);

        eeprom.set_protection(BlockProtection::All).unwrap();
        assert_eq!(eeprom.protection().unwrap(), BlockProtection::None);

        eeprom.transport_mut().set_wp_pin(false);
        eeprom.set_protection(BlockProtection::All).unwrap();
        assert_eq!(eeprom.protection().unwrap(), BlockProtection::All);
    }

    #[test]
    fn test_stuck_busy_times_out_between_pages() {
        let (dummy, config) = device("25LC256");
        let mut eeprom = Eeprom::new(dummy.stuck_busy(), config);
        eeprom.init().unwrap();

        assert_eq!(eeprom.write(0, &[0xAB; 100]), Err(Error::WriteTimeout));
        let dummy = eeprom.release();
        // first page written, second never attempted
        assert_eq!(dummy.stats().page_writes, 1);
        assert!(dummy.data()[..64].iter().all(|&b| b == 0xAB));
        assert_eq!(dummy.data()[64], 0xFF);
    }

    #[test]
    fn test_frozen_clock_hits_poll_ceiling() {
        let (dummy, config) = device("25LC256");
        let mut eeprom = Eeprom::new(dummy.frozen_clock(), config.with_max_poll_iterations(1000));
        eeprom.init().unwrap();

        assert_eq!(eeprom.write(0, &[0x01; 100]), Err(Error::PollLimitExceeded));
        assert_eq!(eeprom.transport().stats().page_writes, 1);
    }

    #[test]
    fn test_transport_failure_aborts_write() {
        let (dummy, config) = device("25LC256");
        // init uses 3 transfers, each page 5 (RDSR x2, WREN, frame, data)
        let mut eeprom = Eeprom::new(dummy.fail_transport_after(3 + 5 + 2), config);
        eeprom.init().unwrap();

        let err = eeprom.write(0, &[0xCD; 192]).unwrap_err();
        assert_eq!(err, Error::TransportError);
        assert!(!err.is_usage_error());
        assert_eq!(eeprom.transport().stats().page_writes, 1);
    }

    #[test]
    fn test_erase_through_staging_buffer() {
        let (_, config) = device("25LC256");
        let dummy = DummyEeprom::with_data(DummyConfig::default(), &[0u8; 512]);
        let mut eeprom = Eeprom::new(dummy, config);
        eeprom.init().unwrap();

        eeprom.erase(100, 200).unwrap();
        eeprom.wait_idle().unwrap();

        let data = eeprom.transport().data();
        assert!(data[100..300].iter().all(|&b| b == 0xFF));
        assert_eq!(data[99], 0);
        assert_eq!(data[300], 0);
        assert_eq!(eeprom.erase(0, 257), Err(Error::InvalidLength));
    }

    #[test]
    fn test_nine_bit_addressing() {
        let mut eeprom = ready("25AA040A");
        eeprom.write(0x1F8, b"upper").unwrap();
        eeprom.wait_idle().unwrap();
        eeprom.write(0x0F8, b"lower").unwrap();
        eeprom.wait_idle().unwrap();

        let mut buf = [0u8; 5];
        eeprom.read(0x1F8, &mut buf).unwrap();
        assert_eq!(&buf, b"upper");
        eeprom.read(0x0F8, &mut buf).unwrap();
        assert_eq!(&buf, b"lower");
        assert_eq!(eeprom.write(0x1FF, &[0, 0]), Err(Error::AddressOutOfBounds));
    }

    #[test]
    fn test_hardware_erase_and_power_down() {
        let mut eeprom = ready("25LC1024");
        eeprom.write(0x1_0000, &[0u8; 16]).unwrap();
        eeprom.wait_idle().unwrap();
        eeprom.write(0x0_0100, &[0u8; 16]).unwrap();
        eeprom.wait_idle().unwrap();

        eeprom.page_erase(0x0_0105).unwrap();
        eeprom.wait_idle().unwrap();
        assert!(eeprom.transport().data()[0x100..0x110].iter().all(|&b| b == 0xFF));
        assert_eq!(eeprom.transport().data()[0x1_0000], 0);

        eeprom.sector_erase(0x1_2345).unwrap();
        eeprom.wait_idle().unwrap();
        assert_eq!(eeprom.transport().data()[0x1_0000], 0xFF);

        assert_eq!(eeprom.read_signature().unwrap(), 0x29);
        eeprom.deep_power_down().unwrap();
        assert!(eeprom.transport().is_powered_down());
        assert_eq!(eeprom.read_signature().unwrap(), 0x29);
        assert!(!eeprom.transport().is_powered_down());

        eeprom.write(0, &[0u8; 4]).unwrap();
        eeprom.wait_idle().unwrap();
        eeprom.chip_erase().unwrap();
        eeprom.wait_idle().unwrap();
        assert!(eeprom.transport().data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_init_without_device_fails() {
        let mut dummy = DummyEeprom::new_default();
        dummy.faults_mut().ignore_write_enable = true;
        let mut eeprom = Eeprom::new(dummy, DeviceConfig::new(AddressWidth::Bits16, 32 * 1024, 64).unwrap());
        assert_eq!(eeprom.init(), Err(Error::InitFailed));
        assert!(!eeprom.is_initialized());
        assert_eq!(eeprom.write(0, &[1]), Err(Error::NotInitialized));
    }

    #[test]
    fn test_deinit_blocks_further_access() {
        let mut eeprom = ready("25LC256");
        eeprom.deinit().unwrap();
        assert!(!eeprom.is_initialized());
        assert!(!eeprom.read_status().unwrap().wel());

        let mut buf = [0u8; 1];
        assert_eq!(eeprom.read(0, &mut buf), Err(Error::NotInitialized));
        eeprom.init().unwrap();
        eeprom.read(0, &mut buf).unwrap();
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = ready("25LC256");
        let (dummy, config) = device("25LC640A");
        let mut b = Eeprom::new(dummy, config);

        a.write(0, b"a").unwrap();
        assert!(a.is_initialized());
        assert!(!b.is_initialized());
        assert_eq!(b.write(0, b"b"), Err(Error::NotInitialized));
    }
}
