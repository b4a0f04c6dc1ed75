//! Chip-select handling for composed transfers

/// What the transport does with chip-select around a single transfer
///
/// A command phase followed by a data phase must run under one continuous
/// chip-select assertion. The driver expresses this by sending the command
/// with [`CsMode::Assert`] and the data with [`CsMode::Deassert`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CsMode {
    /// Assert before the transfer and deassert after it
    #[default]
    AssertDeassert,
    /// Assert before the transfer and leave it asserted
    Assert,
    /// Leave chip-select as is before, deassert after the transfer
    Deassert,
    /// Do not touch chip-select
    Hold,
}

impl CsMode {
    /// Returns true if chip-select is asserted before the transfer
    pub const fn asserts(&self) -> bool {
        matches!(self, Self::AssertDeassert | Self::Assert)
    }

    /// Returns true if chip-select is released after the transfer
    pub const fn deasserts(&self) -> bool {
        matches!(self, Self::AssertDeassert | Self::Deassert)
    }
}
