// THEORY:
// The `VisitedSet` records which pixel indices have been finally classified,
// either absorbed into a region or skipped as transparent. It packs one bit per
// pixel, eight pixels per byte, so a 10-megapixel image needs only ~1.2 MB of
// bookkeeping. Bits are only ever set: a conversion allocates a fresh set and
// drops it when the scan ends, so there is no clear or reset.

/// Bit-packed, write-once membership over `0..len`.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    bits: Vec<u8>,
    len: usize,
}

impl VisitedSet {
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0u8; len.div_ceil(8)],
            len,
        }
    }

    #[inline]
    pub fn is_visited(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        self.bits[index >> 3] & (1 << (index & 7)) != 0
    }

    #[inline]
    pub fn mark_visited(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.bits[index >> 3] |= 1 << (index & 7);
    }

    /// Number of indices the set covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the backing storage in bytes.
    pub fn storage_len(&self) -> usize {
        self.bits.len()
    }

    pub fn visited_count(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }
}
