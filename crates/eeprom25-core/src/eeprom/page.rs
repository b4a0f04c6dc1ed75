//! Page arithmetic
//!
//! A WRITE instruction latches its data into a page buffer. Bytes past the
//! end of the page wrap around to the start of the same page instead of
//! continuing into the next one, so every write is split at page boundaries.

/// Splits byte ranges into page-bounded sub-transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSplitter {
    page_size: u32,
}

impl PageSplitter {
    /// Create a splitter for `page_size`-byte pages
    ///
    /// `page_size` must be non-zero ([`DeviceConfig`](super::DeviceConfig)
    /// guarantees this).
    pub const fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Page size in bytes
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages touched by the inclusive range `[addr, addr + size - 1]`
    ///
    /// Returns 0 for an empty range.
    pub const fn sector_count(&self, addr: u32, size: u32) -> u32 {
        if size == 0 {
            return 0;
        }
        let first = addr / self.page_size;
        let last = ((addr as u64 + size as u64 - 1) / self.page_size as u64) as u32;
        last - first + 1
    }

    /// Length of the sub-transfer starting at `addr`
    ///
    /// The whole of `remaining` if it fits before the next page boundary,
    /// otherwise the distance to that boundary.
    pub const fn transfer_size(&self, addr: u32, remaining: u32) -> u32 {
        let to_boundary = self.page_size - addr % self.page_size;
        if remaining <= to_boundary {
            remaining
        } else {
            to_boundary
        }
    }

    /// Iterate over the `(address, length)` sub-transfers of a range
    pub fn chunks(&self, addr: u32, size: u32) -> Chunks {
        Chunks {
            splitter: *self,
            addr,
            remaining: size,
        }
    }
}

/// Iterator returned by [`PageSplitter::chunks`]
#[derive(Debug, Clone)]
pub struct Chunks {
    splitter: PageSplitter,
    addr: u32,
    remaining: u32,
}

impl Iterator for Chunks {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let addr = self.addr;
        let len = self.splitter.transfer_size(addr, self.remaining);
        self.addr = self.addr.wrapping_add(len);
        self.remaining -= len;
        Some((addr, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.splitter.sector_count(self.addr, self.remaining) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_spanning_two_pages() {
        let s = PageSplitter::new(32);
        assert_eq!(s.sector_count(30, 6), 2);
        assert_eq!(s.transfer_size(30, 6), 2);
        assert_eq!(s.transfer_size(32, 4), 4);

        let mut chunks = s.chunks(30, 6);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.next(), Some((30, 2)));
        assert_eq!(chunks.next(), Some((32, 4)));
        assert_eq!(chunks.next(), None);
    }

    #[test]
    fn test_aligned_full_page_is_one_sector() {
        let s = PageSplitter::new(64);
        for page in 0..8 {
            let addr = page * 64;
            assert_eq!(s.sector_count(addr, 64), 1);
            assert_eq!(s.transfer_size(addr, 64), 64);
        }
    }

    #[test]
    fn test_range_ending_on_boundary() {
        let s = PageSplitter::new(16);
        // [8, 15] ends exactly at the last byte of page 0
        assert_eq!(s.sector_count(8, 8), 1);
        // [8, 16] touches the first byte of page 1
        assert_eq!(s.sector_count(8, 9), 2);
        assert_eq!(s.transfer_size(8, 8), 8);
        assert_eq!(s.transfer_size(8, 9), 8);
    }

    #[test]
    fn test_single_byte() {
        let s = PageSplitter::new(16);
        assert_eq!(s.sector_count(15, 1), 1);
        assert_eq!(s.transfer_size(15, 1), 1);
        assert_eq!(s.sector_count(0, 0), 0);
    }

    #[test]
    fn test_top_of_address_space() {
        let s = PageSplitter::new(256);
        assert_eq!(s.sector_count(u32::MAX - 255, 256), 1);
        assert_eq!(s.sector_count(u32::MAX, 1), 1);
    }

    #[test]
    fn test_chunks_cover_range_without_crossing_pages() {
        for page_size in [16u32, 32, 64, 128, 256] {
            let s = PageSplitter::new(page_size);
            for addr in [0u32, 1, page_size - 1, page_size, 3 * page_size + 5] {
                for size in [1u32, 2, page_size - 1, page_size, page_size + 1, 5 * page_size + 3] {
                    let chunks: heapless::Vec<(u32, u32), 16> = s.chunks(addr, size).collect();
                    assert_eq!(chunks.len() as u32, s.sector_count(addr, size));
                    assert_eq!(chunks.iter().map(|&(_, len)| len).sum::<u32>(), size);

                    let mut next = addr;
                    for &(start, len) in &chunks {
                        assert_eq!(start, next);
                        assert!(len > 0);
                        assert!(start % page_size + len <= page_size);
                        next = start + len;
                    }
                }
            }
        }
    }
}
