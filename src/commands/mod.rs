//! CLI command implementations
//!
//! Every device command runs against an initialized [`Eeprom`] built by
//! [`open_eeprom`] and is followed by [`close_eeprom`], which waits for the
//! last write cycle and clears the write enable latch.

mod erase;
mod info;
mod list;
mod protect;
mod read;
mod write;

pub use erase::run_erase;
pub use info::{run_info, run_status};
pub use list::list_chips;
pub use protect::run_protect;
pub use read::run_read;
pub use write::run_write;

use crate::cli::{DeviceArgs, RangeArgs};
use crate::transports::{self, BoxedTransport};
use eeprom25_core::chip::{ChipDatabase, ChipEntry};
use eeprom25_core::{DeviceConfig, Eeprom};
use indicatif::{ProgressBar, ProgressStyle};

pub type Device = Eeprom<BoxedTransport>;

/// Look up the part, build the transport and initialize the driver
pub fn open_eeprom<'db>(
    args: &DeviceArgs,
    db: &'db ChipDatabase,
) -> Result<(Device, &'db ChipEntry), Box<dyn std::error::Error>> {
    let chip = db.find_by_name(&args.chip).ok_or_else(|| {
        format!(
            "Unknown chip: {}\nUse 'eeprom25 list-chips' to see known parts",
            args.chip
        )
    })?;

    let config = DeviceConfig::from_entry(chip)?.with_write_timeout(args.timeout_ms);
    let transport = transports::open_transport(&args.transport, chip)?;

    let mut eeprom = Eeprom::new(transport, config);
    eeprom
        .init()
        .map_err(|e| format!("Failed to initialize {}: {}", chip.name, e))?;

    log::info!(
        "{} {}: {} bytes, {}-byte pages, {}-bit addressing",
        chip.vendor,
        chip.name,
        chip.total_size,
        chip.page_size,
        chip.address_width.bits()
    );

    Ok((eeprom, chip))
}

/// Finish outstanding writes and leave the part write-disabled
pub fn close_eeprom(eeprom: &mut Device) -> Result<(), Box<dyn std::error::Error>> {
    eeprom.wait_idle()?;
    eeprom.deinit()?;
    Ok(())
}

/// Resolve `--start`/`--length` against the part size
fn resolve_range(range: &RangeArgs, total_size: u32) -> Result<(u32, u32), String> {
    if range.start >= total_size {
        return Err(format!(
            "Start address 0x{:X} is beyond the end of the array (0x{:X} bytes)",
            range.start, total_size
        ));
    }
    let length = range.length.unwrap_or(total_size - range.start);
    if length == 0 {
        return Err("Length must not be zero".into());
    }
    if range.start as u64 + length as u64 > total_size as u64 {
        return Err(format!(
            "Range 0x{:X}+0x{:X} extends past the end of the array (0x{:X} bytes)",
            range.start, length, total_size
        ));
    }
    Ok((range.start, length))
}

fn progress_bar(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
