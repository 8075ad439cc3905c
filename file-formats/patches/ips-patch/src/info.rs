//! Read-only summaries of a patch

use std::fmt;

use crate::ranges::WriteRange;
use crate::types::PatchFile;

/// Summary of what a patch writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchInfo {
    /// Patch identifier
    pub name: String,
    /// Number of records
    pub record_count: usize,
    /// Sum of all record lengths; overlapping records count twice
    pub total_bytes_written: u64,
    /// The first [`PatchInfo::PREVIEW_LIMIT`] ranges in record order
    pub ranges_preview: Vec<WriteRange>,
    /// Ranges left out of the preview
    pub ranges_omitted: usize,
    /// One past the highest byte written, zero for an empty patch
    pub highest_end: u32,
}

impl PatchInfo {
    /// How many ranges the preview keeps
    pub const PREVIEW_LIMIT: usize = 20;

    /// Summarize `patch`
    pub fn of(patch: &PatchFile) -> Self {
        let ranges = patch.ranges();
        let total_bytes_written = ranges.iter().map(|r| u64::from(r.len())).sum();
        let ranges_omitted = ranges.len().saturating_sub(Self::PREVIEW_LIMIT);
        let highest_end = ranges.iter().map(|r| r.end).max().unwrap_or(0);

        Self {
            name: patch.name().to_string(),
            record_count: ranges.len(),
            total_bytes_written,
            ranges_preview: ranges.into_iter().take(Self::PREVIEW_LIMIT).collect(),
            ranges_omitted,
            highest_end,
        }
    }
}

impl fmt::Display for PatchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "Blocks: {}", self.record_count)?;
        writeln!(
            f,
            "Total bytes written (sum of blocks): {}",
            self.total_bytes_written
        )?;
        writeln!(f, "Ranges:")?;
        for range in &self.ranges_preview {
            writeln!(f, "  {range}")?;
        }
        if self.ranges_omitted > 0 {
            writeln!(f, "  ... (+{} more ranges)", self.ranges_omitted)?;
        }
        Ok(())
    }
}
