//! Error types for eeprom25-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Broad classification of an [`Error`]
///
/// Lets callers tell "the API was used wrong" apart from "the device or bus
/// misbehaved" without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller contract violation (uninitialized driver, zero length, bad config)
    Usage,
    /// Requested range lies outside the device
    AddressRange,
    /// The underlying transport failed
    Transport,
    /// The device did not finish its internal write cycle in time
    Timeout,
    /// The device is busy with an internal write cycle
    Busy,
    /// The device answered, but not the way the protocol requires
    Device,
    /// An internal invariant was violated (e.g. a stalled time source)
    Internal,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Usage errors
    /// Driver has not been initialized (or was deinitialized)
    NotInitialized,
    /// Zero-length request, or a length the operation cannot handle
    InvalidLength,
    /// Device configuration is inconsistent
    InvalidConfig,

    // Address errors
    /// Requested range extends beyond the device capacity
    AddressOutOfBounds,

    // Transport errors
    /// Transport send/receive failed
    TransportError,
    /// Transport has not been set up
    TransportNotReady,

    // Device errors
    /// Write-in-progress flag did not clear within the configured timeout
    WriteTimeout,
    /// Read attempted while an internal write cycle is active
    Busy,
    /// Write enable latch did not read back as set during init
    InitFailed,
    /// Write enable latch did not read back as clear during deinit
    DeinitFailed,
    /// The configured part does not implement this instruction
    OpcodeNotSupported,

    // Internal errors
    /// The time source stopped advancing while write-progress polling
    /// waited for the next tick
    PollLimitExceeded,
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized | Self::InvalidLength | Self::InvalidConfig => ErrorKind::Usage,
            Self::AddressOutOfBounds => ErrorKind::AddressRange,
            Self::TransportError | Self::TransportNotReady => ErrorKind::Transport,
            Self::WriteTimeout => ErrorKind::Timeout,
            Self::Busy => ErrorKind::Busy,
            Self::InitFailed | Self::DeinitFailed | Self::OpcodeNotSupported => ErrorKind::Device,
            Self::PollLimitExceeded => ErrorKind::Internal,
        }
    }

    /// Returns true if this error reports a caller contract violation
    pub const fn is_usage_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Usage | ErrorKind::AddressRange)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "EEPROM driver not initialized"),
            Self::InvalidLength => write!(f, "invalid length"),
            Self::InvalidConfig => write!(f, "invalid device configuration"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::TransportError => write!(f, "transport transfer failed"),
            Self::TransportNotReady => write!(f, "transport not ready"),
            Self::WriteTimeout => write!(f, "write cycle timed out"),
            Self::Busy => write!(f, "device busy: write in progress"),
            Self::InitFailed => write!(f, "initialization failed: write enable latch not set"),
            Self::DeinitFailed => write!(f, "deinitialization failed: write enable latch still set"),
            Self::OpcodeNotSupported => write!(f, "instruction not supported by this device"),
            Self::PollLimitExceeded => write!(f, "status polling limit exceeded (time source stalled?)"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_are_distinct_from_device_errors() {
        assert!(Error::NotInitialized.is_usage_error());
        assert!(Error::InvalidLength.is_usage_error());
        assert!(Error::AddressOutOfBounds.is_usage_error());
        assert!(!Error::TransportError.is_usage_error());
        assert!(!Error::WriteTimeout.is_usage_error());
        assert!(!Error::Busy.is_usage_error());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::WriteTimeout.kind(), ErrorKind::Timeout);
        assert_eq!(Error::Busy.kind(), ErrorKind::Busy);
        assert_eq!(Error::AddressOutOfBounds.kind(), ErrorKind::AddressRange);
        assert_eq!(Error::TransportError.kind(), ErrorKind::Transport);
        assert_eq!(Error::PollLimitExceeded.kind(), ErrorKind::Internal);
    }
}
