//! Decoder, applier and conflict detector for IPS binary patches.
//!
//! IPS patches are a list of "write these bytes at this offset" records.
//! This crate decodes them, applies an ordered list of them to a base image,
//! and reports which bytes would be written by more than one patch before
//! anything is applied.
//!
//! # Examples
//!
//! ```
//! use ips_patch::{PatchFile, apply_decoded, detect_conflicts};
//!
//! let a = PatchFile::decode("a.ips", b"PATCH\x00\x00\x00\x00\x02\xAA\xBBEOF").unwrap();
//! let b = PatchFile::decode("b.ips", b"PATCH\x00\x00\x01\x00\x02\xCC\xDDEOF").unwrap();
//!
//! let report = detect_conflicts(&[a.clone(), b.clone()]);
//! assert_eq!(report.conflicting_bytes(), 1);
//!
//! // Later patches win where writes overlap.
//! let patched = apply_decoded(&[0; 4], &[a, b]);
//! assert_eq!(patched, vec![0xAA, 0xCC, 0xDD, 0x00]);
//! ```
//!
//! # Format limitation
//!
//! The terminator `EOF` sits where a record offset would be, so offset
//! `0x454F46` can never be targeted. [`parser::RecordReader`] stops there
//! like every other IPS decoder.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod apply;
pub mod conflict;
pub mod discovery;
pub mod error;
pub mod info;
pub mod parser;
pub mod ranges;
pub mod selection;
pub mod types;

pub use apply::{ImageBuffer, apply_decoded, apply_patches};
pub use conflict::{ConflictEntry, ConflictReport, detect_conflicts, detect_footprint_conflicts};
pub use discovery::{PatchDirectory, discover_patches};
pub use error::{DecodeError, Error, Result};
pub use info::PatchInfo;
pub use parser::decode_records;
pub use ranges::{WriteRange, ranges_of};
pub use selection::{SelectionEntry, SelectionState};
pub use types::{PatchFile, PatchFootprint, PatchRecord, RecordKind};
