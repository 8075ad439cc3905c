//! Write footprints of IPS records

use std::fmt;

use crate::types::PatchRecord;

/// A half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteRange {
    /// First byte written
    pub start: u32,
    /// One past the last byte written
    pub end: u32,
}

impl WriteRange {
    /// Create a range, clamping `end` so the range is never inverted
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of bytes covered
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the range covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if `offset` falls inside the range
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Check if two ranges share at least one byte
    pub fn overlaps(&self, other: &WriteRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for WriteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "0x{:06X} (empty)", self.start)
        } else {
            write!(
                f,
                "0x{:06X} - 0x{:06X} ({} bytes)",
                self.start,
                self.end - 1,
                self.len()
            )
        }
    }
}

impl From<WriteRange> for std::ops::Range<usize> {
    fn from(range: WriteRange) -> Self {
        range.start as usize..range.end as usize
    }
}

/// Ranges written by `records`, one per record in record order
pub fn ranges_of(records: &[PatchRecord]) -> Vec<WriteRange> {
    records.iter().map(PatchRecord::write_range).collect()
}
