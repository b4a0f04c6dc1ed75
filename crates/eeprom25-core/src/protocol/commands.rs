//! 25xx command sequences
//!
//! Every function here is a single chip-select transaction. Sequencing
//! (write enable, waiting for the write cycle) is left to the caller.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (for Embassy, tokio)

use crate::error::Result;
use crate::spi::{assemble, opcodes, AddressWidth, CsMode};
use crate::status::Status;
use crate::transport::Transport;
use maybe_async::maybe_async;

/// Send a single-byte instruction (WREN, WRDI, CE, DPD)
#[maybe_async]
pub async fn send_instruction<T: Transport + ?Sized>(transport: &mut T, opcode: u8) -> Result<()> {
    transport.transmit(&[opcode], CsMode::AssertDeassert).await
}

/// Read the STATUS register
#[maybe_async]
pub async fn read_status<T: Transport + ?Sized>(transport: &mut T) -> Result<Status> {
    let mut buf = [0u8; 1];
    transport.transmit(&[opcodes::RDSR], CsMode::Assert).await?;
    transport.receive(&mut buf, CsMode::Deassert).await?;
    Ok(Status::from_raw(buf[0]))
}

/// Write the STATUS register
///
/// Only the writable bits of `status` are sent. WEL must already be set.
#[maybe_async]
pub async fn write_status<T: Transport + ?Sized>(transport: &mut T, status: Status) -> Result<()> {
    transport
        .transmit(&[opcodes::WRSR, status.writable_bits()], CsMode::AssertDeassert)
        .await
}

/// Send the Write Enable command
#[maybe_async]
pub async fn write_enable<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    send_instruction(transport, opcodes::WREN).await
}

/// Send the Write Disable command
#[maybe_async]
pub async fn write_disable<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    send_instruction(transport, opcodes::WRDI).await
}

/// Check if the Write Enable Latch is set
#[maybe_async]
pub async fn check_wel<T: Transport + ?Sized>(transport: &mut T) -> Result<bool> {
    Ok(read_status(transport).await?.wel())
}

/// Check if a write cycle is in progress
#[maybe_async]
pub async fn is_busy<T: Transport + ?Sized>(transport: &mut T) -> Result<bool> {
    Ok(read_status(transport).await?.wip())
}

/// Read `buf.len()` bytes starting at `addr`
///
/// Reads are not limited by page boundaries; the device increments the
/// address internally and wraps at the end of the array.
#[maybe_async]
pub async fn read_array<T: Transport + ?Sized>(
    transport: &mut T,
    width: AddressWidth,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    let frame = assemble(width, opcodes::READ, addr);
    transport.transmit(&frame, CsMode::Assert).await?;
    transport.receive(buf, CsMode::Deassert).await
}

/// Program `data` starting at `addr`
///
/// The data must not cross a page boundary and WEL must already be set.
#[maybe_async]
pub async fn program_page<T: Transport + ?Sized>(
    transport: &mut T,
    width: AddressWidth,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    let frame = assemble(width, opcodes::WRITE, addr);
    transport.transmit(&frame, CsMode::Assert).await?;
    transport.transmit(data, CsMode::Deassert).await
}

/// Send an erase command (PE or SE) for the page/sector containing `addr`
///
/// WEL must already be set.
#[maybe_async]
pub async fn erase_at<T: Transport + ?Sized>(
    transport: &mut T,
    width: AddressWidth,
    opcode: u8,
    addr: u32,
) -> Result<()> {
    let frame = assemble(width, opcode, addr);
    transport.transmit(&frame, CsMode::AssertDeassert).await
}

/// Release from deep power-down and read the electronic signature
///
/// The instruction is followed by a dummy address of the configured width.
#[maybe_async]
pub async fn read_signature<T: Transport + ?Sized>(
    transport: &mut T,
    width: AddressWidth,
) -> Result<u8> {
    let mut buf = [0u8; 1];
    let frame = assemble(width, opcodes::RDID, 0);
    transport.transmit(&frame, CsMode::Assert).await?;
    transport.receive(&mut buf, CsMode::Deassert).await?;
    Ok(buf[0])
}
