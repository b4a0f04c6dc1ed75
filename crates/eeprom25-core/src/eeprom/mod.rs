//! EEPROM driver, configuration and page arithmetic

mod config;
mod device;
mod page;

pub use config::{DeviceConfig, DEFAULT_WRITE_TIMEOUT_MS};
pub use device::{Eeprom, ERASE_BUFFER_SIZE};
pub use page::{Chunks, PageSplitter};
