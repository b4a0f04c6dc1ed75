//! Block protection command

use super::{close_eeprom, Device};
use eeprom25_core::BlockProtection;

/// Show the current protection, or apply a new level and/or WPEN setting
pub fn run_protect(
    eeprom: &mut Device,
    level: Option<BlockProtection>,
    wpen: Option<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = level {
        eeprom.set_protection(level)?;
        eeprom.wait_idle()?;
    }
    if let Some(enable) = wpen {
        eeprom.set_write_protect_enable(enable)?;
        eeprom.wait_idle()?;
    }

    let status = eeprom.read_status()?;
    let current = status.block_protection();

    if level.is_some_and(|want| want != current) {
        close_eeprom(eeprom)?;
        return Err(format!(
            "Protection did not change (reads back {}); is WPEN set with WP asserted?",
            current
        )
        .into());
    }

    let total_size = eeprom.config().total_size;
    match current.protected_start(total_size) {
        Some(from) => println!(
            "Protection: {} (0x{:X}-0x{:X})",
            current,
            from,
            total_size - 1
        ),
        None => println!("Protection: {}", current),
    }
    println!(
        "WPEN: {}",
        if status.wpen() { "set" } else { "clear" }
    );

    close_eeprom(eeprom)
}
