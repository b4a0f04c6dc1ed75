//! Read command implementation

use super::{close_eeprom, progress_bar, resolve_range, Device};
use crate::cli::RangeArgs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Bytes fetched per READ instruction
const READ_CHUNK_SIZE: usize = 1024;

/// Run the read command
pub fn run_read(
    eeprom: &mut Device,
    range: &RangeArgs,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, length) = resolve_range(range, eeprom.config().total_size)?;

    let data = read_with_progress(eeprom, start, length as usize)?;
    close_eeprom(eeprom)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}

/// Read `len` bytes starting at `start` with a progress bar
pub(super) fn read_with_progress(
    eeprom: &mut Device,
    start: u32,
    len: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; len];
    let pb = progress_bar(len as u64, "Reading");

    // A read is rejected while a write cycle runs
    eeprom.wait_idle()?;

    let mut offset = 0usize;
    for chunk in data.chunks_mut(READ_CHUNK_SIZE) {
        eeprom.read(start + offset as u32, chunk)?;
        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
