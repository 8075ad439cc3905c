//! Data structures for decoded IPS patches

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{DecodeError, Error, Result};
use crate::parser::decode_records;
use crate::ranges::{WriteRange, ranges_of};

/// Magic bytes every IPS patch starts with
pub const IPS_MAGIC: [u8; 5] = *b"PATCH";

/// Marker that terminates the record stream
pub const EOF_MARKER: [u8; 3] = *b"EOF";

/// The record offset whose encoding collides with [`EOF_MARKER`]
///
/// A record can never target this offset; a decoder reading these three
/// bytes in the offset position stops.
pub const EOF_MARKER_OFFSET: u32 = 0x45_4F_46;

/// Largest offset a 24-bit record field can express
pub const MAX_OFFSET: u32 = 0xFF_FF_FF;

/// What a record writes at its offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// Explicit replacement bytes (never empty)
    Literal(Vec<u8>),
    /// `length` copies of `fill`
    RunLength {
        /// Number of bytes to write, may be zero
        length: u16,
        /// The repeated byte
        fill: u8,
    },
}

/// A single decoded IPS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// Target offset (24-bit on the wire)
    pub offset: u32,
    /// Payload of the record
    pub kind: RecordKind,
}

impl PatchRecord {
    /// Create a literal record
    pub fn literal(offset: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            kind: RecordKind::Literal(data.into()),
        }
    }

    /// Create a run-length record
    pub fn run_length(offset: u32, length: u16, fill: u8) -> Self {
        Self {
            offset,
            kind: RecordKind::RunLength { length, fill },
        }
    }

    /// Number of bytes this record writes
    pub fn effective_len(&self) -> usize {
        match &self.kind {
            RecordKind::Literal(data) => data.len(),
            RecordKind::RunLength { length, .. } => usize::from(*length),
        }
    }

    /// The half-open byte range this record writes
    pub fn write_range(&self) -> WriteRange {
        WriteRange::new(self.offset, self.offset + self.effective_len() as u32)
    }

    /// Check if this is a run-length record
    pub fn is_run_length(&self) -> bool {
        matches!(self.kind, RecordKind::RunLength { .. })
    }
}

/// A named, fully decoded IPS patch
///
/// Immutable once decoded; the same value can be used for any number of
/// conflict checks and applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFile {
    name: String,
    records: Vec<PatchRecord>,
}

impl PatchFile {
    /// Decode a patch from raw bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use ips_patch::PatchFile;
    ///
    /// let bytes = b"PATCH\x00\x00\x10\x00\x02\xAA\xBBEOF";
    /// let patch = PatchFile::decode("fix.ips", bytes).unwrap();
    /// assert_eq!(patch.name(), "fix.ips");
    /// assert_eq!(patch.records().len(), 1);
    /// ```
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        Ok(Self {
            name: name.into(),
            records: decode_records(bytes)?,
        })
    }

    /// Build a patch from records that are already decoded
    pub fn from_records(name: impl Into<String>, records: Vec<PatchRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Read and decode the patch at `path`
    ///
    /// The patch is named after the file name component of `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("Decoding {} ({} bytes)", path.display(), bytes.len());
        Self::decode(name, &bytes).map_err(|e| Error::decode(path.display().to_string(), e))
    }

    /// Patch identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in file order
    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    /// Write ranges of every record, in file order
    pub fn ranges(&self) -> Vec<WriteRange> {
        ranges_of(&self.records)
    }

    /// Drop the payload and keep only what conflict analysis needs
    pub fn footprint(&self) -> PatchFootprint {
        PatchFootprint {
            name: self.name.clone(),
            ranges: self.ranges(),
        }
    }
}

impl fmt::Display for PatchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPS patch {} ({} records)", self.name, self.records.len())
    }
}

/// The name and write ranges of a patch, without payload bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFootprint {
    /// Patch identifier
    pub name: String,
    /// Ranges written by the patch, in record order
    pub ranges: Vec<WriteRange>,
}

impl From<&PatchFile> for PatchFootprint {
    fn from(patch: &PatchFile) -> Self {
        patch.footprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_len() {
        assert_eq!(PatchRecord::literal(0, vec![1, 2, 3]).effective_len(), 3);
        assert_eq!(PatchRecord::run_length(0, 0x200, 0xFF).effective_len(), 0x200);
        assert_eq!(PatchRecord::run_length(0, 0, 0xFF).effective_len(), 0);
    }

    #[test]
    fn test_write_range_at_top_of_address_space() {
        let record = PatchRecord::run_length(MAX_OFFSET, u16::MAX, 0);
        let range = record.write_range();
        assert_eq!(range.start, MAX_OFFSET);
        assert_eq!(range.end, MAX_OFFSET + 0xFFFF);
    }

    #[test]
    fn test_eof_marker_offset_matches_marker() {
        let encoded = EOF_MARKER_OFFSET.to_be_bytes();
        assert_eq!(&encoded[1..], &EOF_MARKER);
    }

    #[test]
    fn test_footprint_drops_payload() {
        let patch = PatchFile::from_records(
            "a.ips",
            vec![
                PatchRecord::literal(0x10, vec![0; 4]),
                PatchRecord::run_length(0x40, 8, 0xEE),
            ],
        );
        let footprint = patch.footprint();
        assert_eq!(footprint.name, "a.ips");
        assert_eq!(
            footprint.ranges,
            vec![WriteRange::new(0x10, 0x14), WriteRange::new(0x40, 0x48)]
        );
    }

    #[test]
    fn test_display() {
        let patch = PatchFile::from_records("a.ips", vec![]);
        assert_eq!(patch.to_string(), "IPS patch a.ips (0 records)");
    }
}
