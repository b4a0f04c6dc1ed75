//! Write command implementation

use super::read::read_with_progress;
use super::{close_eeprom, progress_bar, Device};
use std::fs;
use std::path::Path;

/// Run the write command
pub fn run_write(
    eeprom: &mut Device,
    start: u32,
    input: &Path,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    if data.is_empty() {
        return Err(format!("{:?} is empty", input).into());
    }

    let total_size = eeprom.config().total_size;
    if !eeprom.config().is_valid_range(start, data.len()) {
        return Err(format!(
            "{} bytes at 0x{:X} do not fit in a {}-byte array",
            data.len(),
            start,
            total_size
        )
        .into());
    }

    println!("Writing {} bytes at 0x{:X} from {:?}", data.len(), start, input);

    let page_size = eeprom.config().page_size as usize;
    let pb = progress_bar(data.len() as u64, "Writing");

    // Hand the engine one page-aligned piece at a time so the bar moves
    let splitter = eeprom.config().splitter();
    let mut written = 0usize;
    for (addr, len) in splitter.chunks(start, data.len() as u32) {
        let offset = (addr - start) as usize;
        eeprom.write(addr, &data[offset..offset + len as usize])?;
        written += len as usize;
        pb.set_position(written as u64);
    }
    eeprom.wait_idle()?;
    pb.finish_with_message("Write complete");

    log::debug!(
        "{} bytes written in {} pages of up to {} bytes",
        written,
        splitter.sector_count(start, data.len() as u32),
        page_size
    );

    if verify {
        let readback = read_with_progress(eeprom, start, data.len())?;
        if let Some(pos) = readback.iter().zip(&data).position(|(a, b)| a != b) {
            close_eeprom(eeprom)?;
            return Err(format!(
                "Verification failed at 0x{:X}: expected 0x{:02X}, read 0x{:02X}",
                start as usize + pos,
                data[pos],
                readback[pos]
            )
            .into());
        }
        println!("Verified OK");
    }

    close_eeprom(eeprom)?;
    println!("Done");
    Ok(())
}
