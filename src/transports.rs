//! Transport registration and dispatch
//!
//! Central registry of the transports compiled into this binary. Each one is
//! selected by name on the command line, with options appended after a colon:
//! `name:key=value,key=value`.

use eeprom25_core::chip::ChipEntry;
use eeprom25_core::transport::{Transport, TransportInfo};

/// A transport ready to be handed to [`eeprom25_core::Eeprom`]
pub type BoxedTransport = Box<dyn Transport + Send>;

/// All transports enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory EEPROM emulator (file=<image>,cycle=<ms>)",
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0|3>)",
    });

    transports
}

/// Resolve a name or alias to the primary name
pub fn find_transport(name: &str) -> Option<&'static str> {
    available_transports()
        .into_iter()
        .find(|t| t.name == name || t.aliases.contains(&name))
        .map(|t| t.name)
}

/// Split a transport string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_transport_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Build the transport named by `selector` for the part described by `chip`
///
/// The transport is not initialized; [`eeprom25_core::Eeprom::init`] does that.
pub fn open_transport(
    selector: &str,
    chip: &ChipEntry,
) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let (name, options) = parse_transport_string(selector);
    let canonical_name = find_transport(name).ok_or_else(|| unknown_transport_error(name))?;

    #[cfg(not(feature = "dummy"))]
    let _ = chip;

    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&options, chip),

        #[cfg(feature = "linux-spi")]
        "linux_spi" => {
            log::info!("Opening Linux SPI transport...");
            eeprom25_linux_spi::open_linux_spi(&options)
                .map_err(|e| format!("Invalid linux_spi parameters: {}", e).into())
        }

        _ => Err(unknown_transport_error(name)),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(
    options: &[(&str, &str)],
    chip: &ChipEntry,
) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    use eeprom25_dummy::{DummyConfig, DummyEeprom};

    let mut config = DummyConfig {
        total_size: chip.total_size,
        page_size: chip.page_size as u32,
        address_width: chip.address_width,
        features: chip.features,
        signature: chip.signature,
        ..DummyConfig::default()
    };

    let mut image = None;
    for (key, value) in options {
        match *key {
            "cycle" => {
                config.write_cycle_ms = value
                    .parse()
                    .map_err(|_| format!("Invalid write cycle time: {}", value))?;
            }
            "file" => image = Some(std::fs::read(value)?),
            _ => return Err(format!("Unknown dummy option: {}", key).into()),
        }
    }

    log::info!("Emulating {} ({} bytes)", chip.name, chip.total_size);

    let dummy = match image {
        Some(data) => {
            if data.len() > chip.total_size as usize {
                return Err(format!(
                    "Image is {} bytes but {} holds only {}",
                    data.len(),
                    chip.name,
                    chip.total_size
                )
                .into());
            }
            DummyEeprom::with_data(config, &data)
        }
        None => DummyEeprom::new(config),
    };
    Ok(Box::new(dummy))
}

fn transport_help() -> String {
    let transports = available_transports();
    if transports.is_empty() {
        return "No transports enabled. Rebuild with --features dummy or --features linux-spi.\n"
            .into();
    }

    let mut help = String::from("Available transports:\n");
    for t in &transports {
        help.push_str(&format!("  {:<10} - {}\n", t.name, t.description));
    }
    help
}

fn unknown_transport_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown transport: {}\n\n", name);
    msg.push_str(&transport_help());
    msg.push_str("\nUse 'eeprom25 list-transports' for more details");
    msg.into()
}

/// Print the transport registry
pub fn list_transports() {
    let transports = available_transports();
    if transports.is_empty() {
        print!("{}", transport_help());
        return;
    }

    println!("Available transports:");
    println!();
    for t in &transports {
        if t.aliases.is_empty() {
            println!("  {:<10} - {}", t.name, t.description);
        } else {
            println!(
                "  {:<10} - {} (aliases: {})",
                t.name,
                t.description,
                t.aliases.join(", ")
            );
        }
    }
}
