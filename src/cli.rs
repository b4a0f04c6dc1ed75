//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use eeprom25_core::eeprom::DEFAULT_WRITE_TIMEOUT_MS;
use eeprom25_core::BlockProtection;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

const TRANSPORT_HELP: &str =
    "Transport to use, as name[:key=value,...] (see list-transports), e.g. dummy or linux_spi:dev=/dev/spidev0.0";

#[derive(Parser)]
#[command(name = "eeprom25")]
#[command(author, version, about = "25LCxxxx/25AAxxxx SPI EEPROM tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Extra chip definitions (.ron file or directory of .ron files)
    /// Defaults to looking in ./chips/ and /usr/share/eeprom25/chips/
    #[arg(long, global = true)]
    pub chip_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options selecting the transport and the part behind it
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    #[arg(short, long, help = TRANSPORT_HELP)]
    pub transport: String,

    /// Part name (e.g. 25LC256, 25AA040A); see list-chips
    #[arg(short, long)]
    pub chip: String,

    /// Write cycle timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_WRITE_TIMEOUT_MS)]
    pub timeout_ms: u32,
}

/// Address window within the array
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First address (hex with 0x prefix, or decimal)
    #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
    pub start: u32,

    /// Number of bytes (defaults to the rest of the array)
    #[arg(long, value_parser = parse_hex_u32)]
    pub length: Option<u32>,
}

/// Block protection level accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectLevel {
    /// Nothing protected
    None,
    /// Upper quarter of the array
    #[value(alias = "quarter")]
    UpperQuarter,
    /// Upper half of the array
    #[value(alias = "half")]
    UpperHalf,
    /// Whole array
    All,
}

impl From<ProtectLevel> for BlockProtection {
    fn from(level: ProtectLevel) -> Self {
        match level {
            ProtectLevel::None => BlockProtection::None,
            ProtectLevel::UpperQuarter => BlockProtection::UpperQuarter,
            ProtectLevel::UpperHalf => BlockProtection::UpperHalf,
            ProtectLevel::All => BlockProtection::All,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read EEPROM contents to a file
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a file to the EEPROM
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// Address to start writing at
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Fill a range with 0xFF
    Erase {
        #[command(flatten)]
        device: DeviceArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Use the CHIP ERASE instruction instead of programming 0xFF
        /// (parts with hardware erase only; ignores --start/--length)
        #[arg(long)]
        chip_erase: bool,
    },

    /// Show or change block protection
    Protect {
        #[command(flatten)]
        device: DeviceArgs,

        /// New protection level (omit to show the current one)
        #[arg(value_enum)]
        level: Option<ProtectLevel>,

        /// Set write-protect enable (WPEN) so the WP pin guards the STATUS register
        #[arg(long, conflicts_with = "no_wpen")]
        wpen: bool,

        /// Clear write-protect enable (WPEN)
        #[arg(long)]
        no_wpen: bool,
    },

    /// Print the decoded STATUS register
    Status {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Show part geometry and read the electronic signature if supported
    Info {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// List known parts
    ListChips {
        /// Filter by vendor name
        #[arg(long)]
        vendor: Option<String>,
    },

    /// List available transports
    ListTransports,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x100"), Ok(0x100));
        assert_eq!(parse_hex_u32("0XfF"), Ok(0xFF));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("-1").is_err());
    }

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write() {
        let cli = Cli::try_parse_from([
            "eeprom25", "write", "-t", "dummy", "-c", "25LC256", "-i", "in.bin", "--start",
            "0x40", "--verify",
        ])
        .unwrap();
        match cli.command {
            Commands::Write {
                device,
                start,
                verify,
                ..
            } => {
                assert_eq!(device.chip, "25LC256");
                assert_eq!(device.timeout_ms, DEFAULT_WRITE_TIMEOUT_MS);
                assert_eq!(start, 0x40);
                assert!(verify);
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_protect_level() {
        let cli =
            Cli::try_parse_from(["eeprom25", "protect", "-t", "dummy", "-c", "25LC256", "upper-half"])
                .unwrap();
        match cli.command {
            Commands::Protect { level, wpen, .. } => {
                assert_eq!(level.map(BlockProtection::from), Some(BlockProtection::UpperHalf));
                assert!(!wpen);
            }
            _ => panic!("expected protect"),
        }
    }

    #[test]
    fn test_protect_level_alias() {
        let cli = Cli::try_parse_from(["eeprom25", "protect", "-t", "dummy", "-c", "25LC256", "quarter"])
            .unwrap();
        match cli.command {
            Commands::Protect { level, .. } => assert_eq!(level, Some(ProtectLevel::UpperQuarter)),
            _ => panic!("expected protect"),
        }
    }

    #[test]
    fn test_wpen_flags_conflict() {
        assert!(Cli::try_parse_from([
            "eeprom25", "protect", "-t", "dummy", "-c", "25LC256", "--wpen", "--no-wpen",
        ])
        .is_err());
    }
}
