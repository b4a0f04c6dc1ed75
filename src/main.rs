//! eeprom25 - A tool for 25LCxxxx/25AAxxxx SPI EEPROMs
//!
//! Reads, writes, erases and protects Microchip-style serial EEPROMs through
//! any transport compiled in (the in-memory emulator, or a Linux spidev
//! device). Parts are selected by name from the built-in table, optionally
//! extended with RON chip definitions.

mod cli;
mod commands;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use eeprom25_core::chip::ChipDatabase;
use std::path::{Path, PathBuf};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let db = match load_chip_database(cli.chip_db.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load chip database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Loaded {} chip definitions", db.len());

    if let Err(e) = run(cli.command, &db) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, db: &ChipDatabase) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Read {
            device,
            range,
            output,
        } => {
            let (mut eeprom, _) = commands::open_eeprom(&device, db)?;
            commands::run_read(&mut eeprom, &range, &output)
        }
        Commands::Write {
            device,
            start,
            input,
            verify,
        } => {
            let (mut eeprom, _) = commands::open_eeprom(&device, db)?;
            commands::run_write(&mut eeprom, start, &input, verify)
        }
        Commands::Erase {
            device,
            range,
            chip_erase,
        } => {
            let (mut eeprom, _) = commands::open_eeprom(&device, db)?;
            commands::run_erase(&mut eeprom, &range, chip_erase)
        }
        Commands::Protect {
            device,
            level,
            wpen,
            no_wpen,
        } => {
            let wpen = match (wpen, no_wpen) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let (mut eeprom, _) = commands::open_eeprom(&device, db)?;
            commands::run_protect(&mut eeprom, level.map(Into::into), wpen)
        }
        Commands::Status { device } => {
            let (mut eeprom, _) = commands::open_eeprom(&device, db)?;
            commands::run_status(&mut eeprom)
        }
        Commands::Info { device } => {
            let (mut eeprom, chip) = commands::open_eeprom(&device, db)?;
            commands::run_info(&mut eeprom, chip)
        }
        Commands::ListChips { vendor } => {
            commands::list_chips(db, vendor.as_deref());
            Ok(())
        }
        Commands::ListTransports => {
            transports::list_transports();
            Ok(())
        }
    }
}

/// Built-in parts, extended by `path` or by the default search locations
///
/// Entries loaded from files take precedence over built-in ones of the same
/// name.
fn load_chip_database(path: Option<&Path>) -> Result<ChipDatabase, Box<dyn std::error::Error>> {
    let mut db = ChipDatabase::builtin();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            db.load_dir(path)?;
        } else if path.is_file() {
            db.load_file(path)?;
        } else {
            return Err(format!("Chip database path not found: {}", path.display()).into());
        }
    } else {
        let default_paths = [
            PathBuf::from("chips"),
            PathBuf::from("/usr/share/eeprom25/chips"),
            PathBuf::from("/usr/local/share/eeprom25/chips"),
        ];

        for dir in &default_paths {
            if dir.is_dir() {
                match db.load_dir(dir) {
                    Ok(count) => log::debug!("Loaded {} chips from {}", count, dir.display()),
                    Err(e) => log::warn!("Failed to load chips from {}: {}", dir.display(), e),
                }
            }
        }
    }

    Ok(db)
}
