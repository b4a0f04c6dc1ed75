//! Status and part information

use super::{close_eeprom, Device};
use eeprom25_core::chip::{ChipEntry, Features};

/// Print the decoded STATUS register
pub fn run_status(eeprom: &mut Device) -> Result<(), Box<dyn std::error::Error>> {
    let status = eeprom.read_status()?;

    println!("STATUS: 0x{:02X}", status.bits());
    println!("  WIP  (write in progress):  {}", status.wip() as u8);
    println!("  WEL  (write enable latch): {}", status.wel() as u8);
    println!("  BP   (block protection):   {}", status.block_protection());
    println!("  WPEN (write-protect en.):  {}", status.wpen() as u8);

    close_eeprom(eeprom)
}

/// Print geometry and, on parts that have RDID, the electronic signature
pub fn run_info(eeprom: &mut Device, chip: &ChipEntry) -> Result<(), Box<dyn std::error::Error>> {
    let config = *eeprom.config();

    println!("Chip: {} {}", chip.vendor, chip.name);
    println!(
        "Size: {} ({} pages of {} bytes)",
        super::list::format_size(config.total_size),
        config.total_size / config.page_size as u32,
        config.page_size
    );
    println!("Addressing: {}-bit", config.address_width.bits());
    println!("Write timeout: {} ms", config.write_timeout_ms);

    let mut extras = Vec::new();
    for (flag, name) in [
        (Features::PAGE_ERASE, "page erase"),
        (Features::SECTOR_ERASE, "sector erase"),
        (Features::CHIP_ERASE, "chip erase"),
        (Features::DEEP_POWER_DOWN, "deep power-down"),
        (Features::SIGNATURE, "signature"),
    ] {
        if config.features.contains(flag) {
            extras.push(name);
        }
    }
    if !extras.is_empty() {
        println!("Instructions: {}", extras.join(", "));
    }

    if config.features.contains(Features::SIGNATURE) {
        let signature = eeprom.read_signature()?;
        match chip.signature {
            Some(expected) if expected != signature => {
                log::warn!(
                    "Signature 0x{:02X} does not match 0x{:02X} expected for {}",
                    signature,
                    expected,
                    chip.name
                );
                println!("Signature: 0x{:02X} (expected 0x{:02X})", signature, expected);
            }
            _ => println!("Signature: 0x{:02X}", signature),
        }
    }

    close_eeprom(eeprom)
}
