//! Patch application
//!
//! Patches are applied in the order given and records in file order. Where
//! writes overlap, the last one applied wins. The image grows with zero bytes
//! whenever a record ends beyond the current length; it never shrinks.

use crate::error::{Error, Result};
use crate::types::{PatchFile, PatchRecord, RecordKind};

/// Working copy of the image being patched
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    data: Vec<u8>,
    base_len: usize,
}

impl ImageBuffer {
    /// Start a buffer from a copy of the base image
    pub fn new(base: &[u8]) -> Self {
        Self {
            data: base.to_vec(),
            base_len: base.len(),
        }
    }

    /// Current length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes appended beyond the base image so far
    pub fn grown_by(&self) -> usize {
        self.data.len() - self.base_len
    }

    /// Current contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn ensure_len(&mut self, end: usize) {
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
    }

    /// Apply a single record
    pub fn apply_record(&mut self, record: &PatchRecord) {
        let range: std::ops::Range<usize> = record.write_range().into();
        self.ensure_len(range.end);

        match &record.kind {
            RecordKind::Literal(data) => self.data[range].copy_from_slice(data),
            RecordKind::RunLength { fill, .. } => self.data[range].fill(*fill),
        }
    }

    /// Apply every record of `patch` in file order
    pub fn apply_patch(&mut self, patch: &PatchFile) {
        let before = self.data.len();
        for record in patch.records() {
            self.apply_record(record);
        }
        log::debug!(
            "Applied {} ({} records, {} -> {} bytes)",
            patch.name(),
            patch.records().len(),
            before,
            self.data.len()
        );
    }

    /// Finish and take the patched bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Apply already decoded patches in order
///
/// # Examples
///
/// ```
/// use ips_patch::{PatchFile, PatchRecord, apply_decoded};
///
/// let patch = PatchFile::from_records("a.ips", vec![PatchRecord::literal(2, vec![0xAA])]);
/// assert_eq!(apply_decoded(&[0, 0], &[patch]), vec![0, 0, 0xAA]);
/// ```
pub fn apply_decoded(base: &[u8], patches: &[PatchFile]) -> Vec<u8> {
    let mut image = ImageBuffer::new(base);
    for patch in patches {
        image.apply_patch(patch);
    }
    image.into_bytes()
}

/// Apply a sequence of patches that are loaded as they are reached
///
/// Each item is the outcome of loading one patch, typically
/// `paths.iter().map(PatchFile::open)`. The first failure aborts the whole
/// run with [`Error::ApplyAborted`]; the partially patched buffer is dropped
/// and the base image is left as it was.
///
/// Conflicts are not checked here. Callers that care run
/// [`detect_conflicts`](crate::detect_conflicts) first.
pub fn apply_patches<I>(base: &[u8], patches: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Result<PatchFile>>,
{
    let mut image = ImageBuffer::new(base);
    let mut applied = 0usize;

    for patch in patches {
        let patch = patch.map_err(|e| {
            log::warn!("Aborting after {applied} patches: {e}");
            Error::ApplyAborted {
                patch: e.subject(),
                source: Box::new(e),
            }
        })?;
        image.apply_patch(&patch);
        applied += 1;
    }

    log::info!(
        "Applied {applied} patches, image is {} bytes ({} appended)",
        image.len(),
        image.grown_by()
    );

    Ok(image.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn test_literal_in_place() {
        let mut image = ImageBuffer::new(&[0; 8]);
        image.apply_record(&PatchRecord::literal(2, vec![1, 2, 3]));
        assert_eq!(image.as_slice(), &[0, 0, 1, 2, 3, 0, 0, 0]);
        assert_eq!(image.grown_by(), 0);
    }

    #[test]
    fn test_growth_zero_fills_gap() {
        let mut image = ImageBuffer::new(&[0xFF; 2]);
        image.apply_record(&PatchRecord::literal(5, vec![0xAB, 0xCD]));
        assert_eq!(image.as_slice(), &[0xFF, 0xFF, 0, 0, 0, 0xAB, 0xCD]);
        assert_eq!(image.grown_by(), 5);
    }

    #[test]
    fn test_run_length_grows_and_fills() {
        let mut image = ImageBuffer::new(&[1, 2, 3]);
        image.apply_record(&PatchRecord::run_length(1, 4, 0x77));
        assert_eq!(image.as_slice(), &[1, 0x77, 0x77, 0x77, 0x77]);
    }

    #[test]
    fn test_empty_run_is_inert() {
        let mut image = ImageBuffer::new(&[1, 2, 3]);
        image.apply_record(&PatchRecord::run_length(1, 0, 0x77));
        assert_eq!(image.as_slice(), &[1, 2, 3]);

        // Even past the end it writes nothing and does not grow.
        image.apply_record(&PatchRecord::run_length(10, 0, 0x77));
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_buffer_never_shrinks() {
        let mut image = ImageBuffer::new(&[]);
        image.apply_record(&PatchRecord::literal(6, vec![9]));
        image.apply_record(&PatchRecord::run_length(0, 2, 1));
        assert_eq!(image.as_slice(), &[1, 1, 0, 0, 0, 0, 9]);
    }

    #[test]
    fn test_records_apply_in_file_order() {
        let patch = PatchFile::from_records(
            "p.ips",
            vec![
                PatchRecord::run_length(0, 4, 0x11),
                PatchRecord::literal(1, vec![0x22, 0x33]),
            ],
        );
        assert_eq!(apply_decoded(&[0; 4], &[patch]), vec![0x11, 0x22, 0x33, 0x11]);
    }

    #[test]
    fn test_abort_names_failing_patch() {
        let good = PatchFile::from_records("a.ips", vec![PatchRecord::literal(0, vec![1])]);
        let bad = Err(Error::decode(
            "b.ips",
            DecodeError::TruncatedStream {
                field: "length",
                position: 5,
            },
        ));

        let err = apply_patches(&[0; 4], vec![Ok(good), bad]).unwrap_err();
        match err {
            Error::ApplyAborted { patch, source } => {
                assert_eq!(patch, "b.ips");
                assert!(matches!(*source, Error::Decode { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
