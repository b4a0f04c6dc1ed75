//! Errors raised by the spidev transport

use thiserror::Error;

/// Failure while opening or talking to a spidev node
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// No `dev=` option was given
    #[error("no spidev node given, use dev=/dev/spidevX.Y")]
    NoDevice,

    /// The device node could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// One of the mode/word-size/clock ioctls was refused
    #[error("spidev rejected {setting} = {value}: {source}")]
    Configure {
        setting: &'static str,
        value: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI_IOC_MESSAGE failed
    #[error("SPI message failed: {0}")]
    Message(#[source] std::io::Error),

    /// A message would not fit the spidev buffer
    #[error("{len} byte message exceeds the {limit} byte spidev buffer")]
    TooLong { len: usize, limit: usize },

    /// The transport was used before [`init`](eeprom25_core::transport::Transport::init)
    #[error("{0} has not been opened")]
    NotOpen(String),

    /// Malformed option value
    #[error("bad option: {0}")]
    Option(String),
}

/// Result type for spidev operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
