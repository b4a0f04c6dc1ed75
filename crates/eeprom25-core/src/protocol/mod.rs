//! Protocol implementations
//!
//! This module contains the 25xx command sequences and the write-progress
//! monitor built on top of them.

mod commands;
mod monitor;

pub use commands::*;
pub use monitor::{wait_for_write_completion, DEFAULT_MAX_POLL_ITERATIONS};
