//! Writes the eeprom25(1) man page
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]   (default: ./man)

use clap::CommandFactory;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&output_dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut page)?;

    let path = output_dir.join("eeprom25.1");
    std::fs::write(&path, page)?;
    println!("{}", path.display());

    Ok(())
}
