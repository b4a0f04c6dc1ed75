//! Transport trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use crate::spi::CsMode;
use maybe_async::maybe_async;

/// Transport trait (sync or async depending on `is_sync` feature)
///
/// A transport owns one chip-select line and the bus behind it. The driver
/// assumes exclusive access for the duration of each call; implementations
/// sharing a bus must arbitrate outside of this trait.
///
/// ## Chip-select composition
///
/// Each transfer carries a [`CsMode`]. A command phase immediately followed
/// by a data phase is sent as:
///
/// ```ignore
/// transport.transmit(&frame, CsMode::Assert).await?;
/// transport.receive(buf, CsMode::Deassert).await?;
/// ```
///
/// Implementations must keep chip-select asserted between the two calls.
///
/// ## Example
///
/// ```ignore
/// #[maybe_async]
/// impl Transport for MySpi {
///     async fn init(&mut self) -> Result<()> {
///         self.bus.configure(Mode::Mode0, 1_000_000).map_err(|_| Error::TransportNotReady)
///     }
///
///     async fn transmit(&mut self, data: &[u8], cs: CsMode) -> Result<()> {
///         if cs.asserts() { self.cs.set_low(); }
///         self.bus.write(data).map_err(|_| Error::TransportError)?;
///         if cs.deasserts() { self.cs.set_high(); }
///         Ok(())
///     }
///     // ...
/// }
/// ```
#[maybe_async(AFIT)]
pub trait Transport {
    /// One-time setup of the underlying bus
    async fn init(&mut self) -> Result<()>;

    /// Send all bytes of `data`
    async fn transmit(&mut self, data: &[u8], cs: CsMode) -> Result<()>;

    /// Fill `buf` with bytes clocked in from the device
    async fn receive(&mut self, buf: &mut [u8], cs: CsMode) -> Result<()>;

    /// Monotonic millisecond counter
    ///
    /// Only differences between two readings are used, so the counter may
    /// start anywhere and wrap.
    fn now_ms(&mut self) -> u32;

    /// Delay for the specified number of microseconds
    ///
    /// Called by the write-progress monitor between clock samples. Hosts
    /// should sleep here; bare-metal targets may spin.
    async fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed transports to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl Transport for alloc::boxed::Box<dyn Transport + Send> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn transmit(&mut self, data: &[u8], cs: CsMode) -> Result<()> {
        (**self).transmit(data, cs)
    }

    fn receive(&mut self, buf: &mut [u8], cs: CsMode) -> Result<()> {
        (**self).receive(buf, cs)
    }

    fn now_ms(&mut self) -> u32 {
        (**self).now_ms()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Registry entry describing a transport implementation
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Primary name, used for matching
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// One-line description shown in listings
    pub description: &'static str,
}
