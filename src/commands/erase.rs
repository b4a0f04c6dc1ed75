//! Erase command implementation

use super::{close_eeprom, progress_bar, resolve_range, Device};
use crate::cli::RangeArgs;
use eeprom25_core::chip::Features;
use eeprom25_core::eeprom::ERASE_BUFFER_SIZE;

/// Run the erase command
pub fn run_erase(
    eeprom: &mut Device,
    range: &RangeArgs,
    chip_erase: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if chip_erase {
        if !eeprom.config().features.contains(Features::CHIP_ERASE) {
            return Err("This part has no CHIP ERASE instruction; omit --chip-erase".into());
        }
        println!("Erasing entire array...");
        eeprom.chip_erase()?;
        close_eeprom(eeprom)?;
        println!("Done");
        return Ok(());
    }

    let (start, length) = resolve_range(range, eeprom.config().total_size)?;
    println!("Erasing {} bytes at 0x{:X}", length, start);

    let pb = progress_bar(length as u64, "Erasing");
    let end = start + length;
    let mut addr = start;
    while addr < end {
        let len = core::cmp::min(ERASE_BUFFER_SIZE as u32, end - addr);
        eeprom.erase(addr, len as usize)?;
        addr += len;
        pb.set_position((addr - start) as u64);
    }
    pb.finish_with_message("Erase complete");

    close_eeprom(eeprom)?;
    println!("Done");
    Ok(())
}
