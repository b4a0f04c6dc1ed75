//! List commands implementation

use eeprom25_core::chip::ChipDatabase;

/// List all known parts
pub fn list_chips(db: &ChipDatabase, vendor_filter: Option<&str>) {
    println!("Known EEPROMs:");
    println!();
    println!(
        "{:<12} {:<12} {:>8} {:>6} {:>6} {:>6}",
        "Vendor", "Name", "Size", "Page", "Addr", "RDID"
    );
    println!("{}", "-".repeat(56));

    for chip in db.iter() {
        if let Some(vendor) = vendor_filter {
            if !chip.vendor.to_lowercase().contains(&vendor.to_lowercase()) {
                continue;
            }
        }

        let signature = chip
            .signature
            .map(|s| format!("{:02X}", s))
            .unwrap_or_else(|| "-".into());

        println!(
            "{:<12} {:<12} {:>8} {:>6} {:>6} {:>6}",
            chip.vendor,
            chip.name,
            format_size(chip.total_size),
            chip.page_size,
            format!("{}-bit", chip.address_width.bits()),
            signature
        );
    }
}

pub(super) fn format_size(bytes: u32) -> String {
    if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(128), "128 B");
        assert_eq!(format_size(32 * 1024), "32 KiB");
        assert_eq!(format_size(128 * 1024), "128 KiB");
        assert_eq!(format_size(1536), "1536 B");
    }
}
