//! Write-progress monitor
//!
//! After a WRITE, WRSR or erase instruction the device runs an internal
//! write cycle and sets WIP until it is done. The monitor re-reads WIP each
//! time the transport clock advances and charges every elapsed millisecond
//! against the timeout.
//!
//! The loop has two independent exits besides success: the millisecond
//! timeout, and a stall ceiling on consecutive clock samples that show no
//! progress. The ceiling is reset on every observed tick, so it only trips
//! when the time source stops advancing.

use super::commands::read_status;
use crate::error::{Error, Result};
use crate::transport::Transport;
use maybe_async::maybe_async;

/// Default ceiling on consecutive clock samples without a tick
///
/// Between samples the monitor sleeps for [`POLL_DELAY_US`], so a clock that
/// advances at all resets the count long before this is reached.
pub const DEFAULT_MAX_POLL_ITERATIONS: u32 = 1 << 24;

/// Delay between clock samples while waiting for the next tick
pub const POLL_DELAY_US: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Idle,
    Polling,
    Done,
    TimedOut,
}

/// Wait for the WIP bit to clear
///
/// Returns immediately, without sampling the clock, if WIP is already clear.
/// Otherwise re-reads WIP whenever [`Transport::now_ms`] advances and gives
/// up with [`Error::WriteTimeout`] once `timeout_ms` milliseconds have
/// elapsed with WIP still set. A clock that jumps by several milliseconds
/// between samples is charged for all of them. A timeout of 0 fails as soon
/// as WIP is seen set.
///
/// # Errors
/// * `WriteTimeout` - WIP still set after `timeout_ms` milliseconds
/// * `PollLimitExceeded` - `max_iterations` consecutive clock samples without
///   a tick (stalled time source)
/// * any transport error, unchanged
#[maybe_async]
pub async fn wait_for_write_completion<T: Transport + ?Sized>(
    transport: &mut T,
    timeout_ms: u32,
    max_iterations: u32,
) -> Result<()> {
    let mut state = PollState::Idle;
    let mut last_ms = 0u32;
    let mut elapsed_ms = 0u32;
    let mut stalled = 0u32;

    loop {
        match state {
            PollState::Idle => {
                if !read_status(transport).await?.wip() {
                    state = PollState::Done;
                } else if timeout_ms == 0 {
                    state = PollState::TimedOut;
                } else {
                    last_ms = transport.now_ms();
                    state = PollState::Polling;
                }
            }
            PollState::Polling => {
                let now = transport.now_ms();
                let advanced = now.wrapping_sub(last_ms);
                if advanced == 0 {
                    stalled += 1;
                    if stalled > max_iterations {
                        log::error!(
                            "clock stalled for {} samples while polling WIP ({} of {} ms elapsed)",
                            max_iterations,
                            elapsed_ms,
                            timeout_ms
                        );
                        return Err(Error::PollLimitExceeded);
                    }
                    transport.delay_us(POLL_DELAY_US).await;
                    continue;
                }
                stalled = 0;
                last_ms = now;
                elapsed_ms = elapsed_ms.saturating_add(advanced);

                if !read_status(transport).await?.wip() {
                    state = PollState::Done;
                } else if elapsed_ms >= timeout_ms {
                    state = PollState::TimedOut;
                }
            }
            PollState::Done => {
                log::trace!("write cycle complete after {} ms", elapsed_ms);
                return Ok(());
            }
            PollState::TimedOut => {
                log::warn!("write cycle did not complete within {} ms", timeout_ms);
                return Err(Error::WriteTimeout);
            }
        }
    }
}

#[cfg(all(test, feature = "is_sync"))]
mod tests {
    use super::*;
    use crate::spi::{opcodes, CsMode};

    /// Transport reporting WIP for a fixed number of status reads
    struct BusyFor {
        busy_reads: u32,
        status_reads: u32,
        clock: u32,
        clock_step: u32,
        /// Clock advances on every `tick_every`-th sample only
        tick_every: u32,
        clock_samples: u32,
        delays: u32,
        pending_rdsr: bool,
    }

    impl BusyFor {
        fn new(busy_reads: u32) -> Self {
            Self {
                busy_reads,
                status_reads: 0,
                clock: 1000,
                clock_step: 1,
                tick_every: 1,
                clock_samples: 0,
                delays: 0,
                pending_rdsr: false,
            }
        }

        fn frozen(mut self) -> Self {
            self.clock_step = 0;
            self
        }

        fn stepping(mut self, step: u32, every: u32) -> Self {
            self.clock_step = step;
            self.tick_every = every;
            self
        }
    }

    impl Transport for BusyFor {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn transmit(&mut self, data: &[u8], _cs: CsMode) -> Result<()> {
            self.pending_rdsr = data == [opcodes::RDSR];
            Ok(())
        }

        fn receive(&mut self, buf: &mut [u8], _cs: CsMode) -> Result<()> {
            assert!(self.pending_rdsr, "receive without RDSR");
            self.status_reads += 1;
            buf[0] = if self.status_reads <= self.busy_reads { opcodes::SR_WIP } else { 0 };
            Ok(())
        }

        fn now_ms(&mut self) -> u32 {
            self.clock_samples += 1;
            if self.clock_samples % self.tick_every == 0 {
                self.clock = self.clock.wrapping_add(self.clock_step);
            }
            self.clock
        }

        fn delay_us(&mut self, _us: u32) {
            self.delays += 1;
        }
    }

    #[test]
    fn test_idle_returns_without_sampling_time() {
        let mut t = BusyFor::new(0);
        wait_for_write_completion(&mut t, 5, 100).unwrap();
        assert_eq!(t.status_reads, 1);
        assert_eq!(t.clock_samples, 0);
    }

    #[test]
    fn test_completes_when_wip_clears() {
        let mut t = BusyFor::new(3);
        wait_for_write_completion(&mut t, 10, 1000).unwrap();
        // initial read plus one per elapsed ms until clear
        assert_eq!(t.status_reads, 4);
    }

    #[test]
    fn test_timeout_after_at_least_timeout_samples() {
        let mut t = BusyFor::new(u32::MAX);
        let result = wait_for_write_completion(&mut t, 5, 1000);
        assert_eq!(result, Err(Error::WriteTimeout));
        // one read on entry, then exactly one per elapsed millisecond
        assert_eq!(t.status_reads, 1 + 5);
    }

    #[test]
    fn test_zero_timeout_fails_when_busy() {
        let mut t = BusyFor::new(u32::MAX);
        assert_eq!(wait_for_write_completion(&mut t, 0, 1000), Err(Error::WriteTimeout));
        assert_eq!(t.status_reads, 1);
    }

    #[test]
    fn test_frozen_clock_hits_iteration_ceiling() {
        let mut t = BusyFor::new(u32::MAX).frozen();
        let result = wait_for_write_completion(&mut t, 5, 50);
        assert_eq!(result, Err(Error::PollLimitExceeded));
        // no millisecond ever elapsed, so only the entry read happened
        assert_eq!(t.status_reads, 1);
        assert_eq!(t.delays, 50);
    }

    #[test]
    fn test_slow_clock_reaches_timeout_not_ceiling() {
        // 100 samples per tick over a 50 ms timeout is 5000 samples in total,
        // far above the ceiling of 200
        let mut t = BusyFor::new(u32::MAX).stepping(1, 100);
        let result = wait_for_write_completion(&mut t, 50, 200);
        assert_eq!(result, Err(Error::WriteTimeout));
        assert_eq!(t.status_reads, 1 + 50);
        assert!(t.clock_samples > 200);
    }

    #[test]
    fn test_clock_jump_counts_every_millisecond() {
        // each observed tick is 4 ms, so a 10 ms timeout needs 3 reads
        let mut t = BusyFor::new(u32::MAX).stepping(4, 1);
        let result = wait_for_write_completion(&mut t, 10, 1000);
        assert_eq!(result, Err(Error::WriteTimeout));
        assert_eq!(t.status_reads, 1 + 3);
    }

    #[test]
    fn test_delay_between_stalled_samples() {
        let mut t = BusyFor::new(2).stepping(1, 3);
        wait_for_write_completion(&mut t, 10, 1000).unwrap();
        assert_eq!(t.status_reads, 3);
        assert!(t.delays > 0);
    }

    #[test]
    fn test_clock_wraparound_counts_as_tick() {
        let mut t = BusyFor::new(2);
        t.clock = u32::MAX - 1;
        wait_for_write_completion(&mut t, 10, 1000).unwrap();
        assert_eq!(t.status_reads, 3);
    }
}
