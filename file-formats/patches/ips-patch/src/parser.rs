//! Decoder for the IPS record stream
//!
//! An IPS patch is the magic `PATCH` followed by records and the terminator
//! `EOF`. All integers are big-endian:
//!
//! | Field | Size | Notes |
//! |---|---|---|
//! | offset | 3 | target offset |
//! | length | 2 | `0` introduces a run-length record |
//! | data | `length` | literal records only |
//! | run length | 2 | run-length records only |
//! | fill | 1 | run-length records only |
//!
//! The terminator occupies the offset position, so offset `0x454F46` can
//! never be written by a patch. Decoders stop there; so does this one.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use std::iter::FusedIterator;

use crate::error::DecodeError;
use crate::types::{EOF_MARKER_OFFSET, IPS_MAGIC, PatchRecord};

/// Streaming reader over the records of an IPS patch
///
/// Yields records in file order. Iteration ends at the terminator or after
/// the first error; a truncated record is reported, never yielded.
///
/// # Examples
///
/// ```
/// use ips_patch::parser::RecordReader;
///
/// let bytes = b"PATCH\x00\x00\x04\x00\x00\x00\x10\x7FEOF";
/// let mut reader = RecordReader::new(bytes).unwrap();
/// let record = reader.next().unwrap().unwrap();
/// assert_eq!(record.offset, 4);
/// assert!(record.is_run_length());
/// assert!(reader.next().is_none());
/// ```
#[derive(Debug)]
pub struct RecordReader<'a> {
    cursor: Cursor<&'a [u8]>,
    finished: bool,
}

impl<'a> RecordReader<'a> {
    /// Validate the header and position the reader on the first record
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() < IPS_MAGIC.len() || bytes[..IPS_MAGIC.len()] != IPS_MAGIC {
            let found = bytes[..bytes.len().min(IPS_MAGIC.len())].to_vec();
            return Err(DecodeError::InvalidHeader { found });
        }

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(IPS_MAGIC.len() as u64);

        Ok(Self {
            cursor,
            finished: false,
        })
    }

    /// Current position in the underlying stream
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn read_record(&mut self) -> Result<Option<PatchRecord>, DecodeError> {
        let start = self.cursor.position();

        let offset = self
            .cursor
            .read_u24::<BigEndian>()
            .map_err(truncated("offset", start))?;
        if offset == EOF_MARKER_OFFSET {
            let trailing = self.cursor.get_ref().len() as u64 - self.cursor.position();
            if trailing > 0 {
                log::debug!("Ignoring {trailing} bytes after EOF marker");
            }
            return Ok(None);
        }

        let length = self
            .cursor
            .read_u16::<BigEndian>()
            .map_err(truncated("length", start))?;

        if length == 0 {
            let run_length = self
                .cursor
                .read_u16::<BigEndian>()
                .map_err(truncated("rle length", start))?;
            let fill = self
                .cursor
                .read_u8()
                .map_err(truncated("rle value", start))?;
            return Ok(Some(PatchRecord::run_length(offset, run_length, fill)));
        }

        let mut data = vec![0u8; usize::from(length)];
        self.cursor
            .read_exact(&mut data)
            .map_err(truncated("data", start))?;

        Ok(Some(PatchRecord::literal(offset, data)))
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<PatchRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for RecordReader<'_> {}

fn truncated(field: &'static str, position: u64) -> impl FnOnce(io::Error) -> DecodeError {
    move |_| DecodeError::TruncatedStream { field, position }
}

/// Decode every record of an IPS patch
///
/// Fails with [`DecodeError::InvalidHeader`] before looking at any record,
/// or with [`DecodeError::TruncatedStream`] if the input ends before the
/// terminator.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<PatchRecord>, DecodeError> {
    RecordReader::new(bytes)?.collect()
}
