//! Write conflicts between patches
//!
//! Two patches conflict at an offset when both write it, whatever order they
//! would later be applied in. Detection only looks at declared write ranges,
//! never at payload bytes, so it can run over [`PatchFootprint`]s.
//!
//! Ranges are merged with a sweep over their endpoints instead of expanding
//! every byte, which keeps large run-length records cheap.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;

use crate::ranges::WriteRange;
use crate::types::{PatchFile, PatchFootprint};

/// A run of bytes written by more than one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    /// Bytes sharing the same set of writers
    pub range: WriteRange,
    /// Every patch writing these bytes, sorted by name
    pub contributors: Vec<String>,
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written by: {}",
            self.range,
            self.contributors.join(", ")
        )
    }
}

/// Outcome of a conflict check
///
/// Entries are sorted by offset, never overlap, and adjacent bytes with the
/// same contributors share one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    entries: Vec<ConflictEntry>,
}

impl ConflictReport {
    /// Check if no byte is written twice
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of coalesced entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Coalesced entries in offset order
    pub fn entries(&self) -> &[ConflictEntry] {
        &self.entries
    }

    /// Iterate over the coalesced entries
    pub fn iter(&self) -> std::slice::Iter<'_, ConflictEntry> {
        self.entries.iter()
    }

    /// Take the coalesced entries
    pub fn into_entries(self) -> Vec<ConflictEntry> {
        self.entries
    }

    /// Patches writing `offset`, if more than one does
    pub fn contributors_at(&self, offset: u32) -> Option<&[String]> {
        let idx = self.entries.partition_point(|e| e.range.end <= offset);
        self.entries
            .get(idx)
            .filter(|e| e.range.contains(offset))
            .map(|e| e.contributors.as_slice())
    }

    /// Total number of conflicting bytes
    pub fn conflicting_bytes(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.range.len())).sum()
    }

    /// Every patch involved in at least one conflict, sorted by name
    pub fn involved_patches(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.contributors.iter().map(String::as_str))
            .collect()
    }

    /// Per-byte view: every conflicting offset with its contributors
    pub fn offsets(&self) -> impl Iterator<Item = (u32, &[String])> + '_ {
        self.entries.iter().flat_map(|e| {
            (e.range.start..e.range.end).map(move |offset| (offset, e.contributors.as_slice()))
        })
    }
}

impl<'a> IntoIterator for &'a ConflictReport {
    type Item = &'a ConflictEntry;
    type IntoIter = std::slice::Iter<'a, ConflictEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Find every byte written by two or more of `patches`
///
/// The result does not depend on the order of `patches`.
///
/// # Examples
///
/// ```
/// use ips_patch::{PatchFile, PatchRecord, detect_conflicts};
///
/// let a = PatchFile::from_records("a.ips", vec![PatchRecord::literal(0, vec![0xAA, 0xBB])]);
/// let b = PatchFile::from_records("b.ips", vec![PatchRecord::literal(1, vec![0xCC, 0xDD])]);
///
/// let report = detect_conflicts(&[a, b]);
/// assert_eq!(report.conflicting_bytes(), 1);
/// assert_eq!(report.contributors_at(1).unwrap(), ["a.ips", "b.ips"]);
/// ```
pub fn detect_conflicts(patches: &[PatchFile]) -> ConflictReport {
    let footprints: Vec<PatchFootprint> = patches.par_iter().map(PatchFile::footprint).collect();
    detect_footprint_conflicts(&footprints)
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    position: u32,
    writer: usize,
    opens: bool,
}

/// Find conflicts between footprints
///
/// Footprints sharing a name count as one writer.
pub fn detect_footprint_conflicts(footprints: &[PatchFootprint]) -> ConflictReport {
    // Writer ids follow name order so contributor sets come out sorted.
    let names: Vec<&str> = footprints
        .iter()
        .map(|f| f.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut edges: Vec<Edge> = footprints
        .par_iter()
        .flat_map_iter(|footprint| {
            let writer = names
                .binary_search(&footprint.name.as_str())
                .unwrap_or_default();
            footprint
                .ranges
                .iter()
                .filter(|r| !r.is_empty())
                .flat_map(move |r| {
                    [
                        Edge {
                            position: r.start,
                            writer,
                            opens: true,
                        },
                        Edge {
                            position: r.end,
                            writer,
                            opens: false,
                        },
                    ]
                })
        })
        .collect();
    edges.par_sort_unstable_by_key(|e| e.position);

    let mut open_ranges = vec![0usize; names.len()];
    let mut active: BTreeSet<usize> = BTreeSet::new();
    let mut segments: Vec<(WriteRange, Vec<usize>)> = Vec::new();

    let mut i = 0;
    while i < edges.len() {
        let position = edges[i].position;
        while i < edges.len() && edges[i].position == position {
            let edge = edges[i];
            if edge.opens {
                open_ranges[edge.writer] += 1;
                active.insert(edge.writer);
            } else {
                open_ranges[edge.writer] -= 1;
                if open_ranges[edge.writer] == 0 {
                    active.remove(&edge.writer);
                }
            }
            i += 1;
        }

        let Some(next) = edges.get(i).map(|e| e.position) else {
            break;
        };
        if active.len() < 2 {
            continue;
        }

        if let Some((range, writers)) = segments.last_mut()
            && range.end == position
            && writers.iter().eq(active.iter())
        {
            range.end = next;
        } else {
            segments.push((
                WriteRange::new(position, next),
                active.iter().copied().collect(),
            ));
        }
    }

    let entries: Vec<ConflictEntry> = segments
        .into_iter()
        .map(|(range, writers)| ConflictEntry {
            range,
            contributors: writers.into_iter().map(|w| names[w].to_string()).collect(),
        })
        .collect();

    log::debug!(
        "Checked {} patches ({} range edges): {} conflict entries",
        names.len(),
        edges.len(),
        entries.len()
    );

    ConflictReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatchRecord;

    fn footprint(name: &str, ranges: &[(u32, u32)]) -> PatchFootprint {
        PatchFootprint {
            name: name.to_string(),
            ranges: ranges.iter().map(|&(s, e)| WriteRange::new(s, e)).collect(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_conflicts(&[]).is_empty());
        assert!(detect_footprint_conflicts(&[footprint("a", &[(0, 10)])]).is_empty());
    }

    #[test]
    fn test_single_byte_overlap() {
        let a = PatchFile::from_records("A", vec![PatchRecord::literal(0, vec![0xAA, 0xBB])]);
        let b = PatchFile::from_records("B", vec![PatchRecord::literal(1, vec![0xCC, 0xDD])]);

        let report = detect_conflicts(&[a, b]);
        assert_eq!(
            report.entries(),
            &[ConflictEntry {
                range: WriteRange::new(1, 2),
                contributors: names(&["A", "B"]),
            }]
        );
    }

    #[test]
    fn test_touching_ranges_do_not_conflict() {
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(0, 4)]),
            footprint("b", &[(4, 8)]),
        ]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_self_overlap_is_not_a_conflict() {
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(0, 8), (4, 12)]),
            footprint("b", &[(20, 30)]),
        ]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_duplicate_records_count_once() {
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(0, 8), (2, 6)]),
            footprint("b", &[(4, 5)]),
        ]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].range, WriteRange::new(4, 5));
        assert_eq!(report.entries()[0].contributors, names(&["a", "b"]));
    }

    #[test]
    fn test_three_way_split() {
        let report = detect_footprint_conflicts(&[
            footprint("c", &[(0, 10)]),
            footprint("a", &[(5, 15)]),
            footprint("b", &[(8, 20)]),
        ]);

        let entries: Vec<(WriteRange, Vec<String>)> = report
            .iter()
            .map(|e| (e.range, e.contributors.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (WriteRange::new(5, 8), names(&["a", "c"])),
                (WriteRange::new(8, 10), names(&["a", "b", "c"])),
                (WriteRange::new(10, 15), names(&["a", "b"])),
            ]
        );
        assert_eq!(report.conflicting_bytes(), 10);
        assert_eq!(
            report.involved_patches().into_iter().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_adjacent_segments_coalesce() {
        // "b" is split into two records; the conflict stays one entry.
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(0, 10)]),
            footprint("b", &[(2, 5), (5, 8)]),
        ]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].range, WriteRange::new(2, 8));
    }

    #[test]
    fn test_empty_ranges_ignored() {
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(4, 4)]),
            footprint("b", &[(0, 10)]),
        ]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_per_offset_queries() {
        let report = detect_footprint_conflicts(&[
            footprint("a", &[(0, 4), (10, 12)]),
            footprint("b", &[(2, 11)]),
        ]);

        assert_eq!(report.contributors_at(1), None);
        assert_eq!(report.contributors_at(2).unwrap(), ["a", "b"]);
        assert_eq!(report.contributors_at(3).unwrap(), ["a", "b"]);
        assert_eq!(report.contributors_at(4), None);
        assert_eq!(report.contributors_at(10).unwrap(), ["a", "b"]);
        assert_eq!(report.contributors_at(11), None);

        let offsets: Vec<u32> = report.offsets().map(|(o, _)| o).collect();
        assert_eq!(offsets, vec![2, 3, 10]);
    }

    #[test]
    fn test_entry_display() {
        let entry = ConflictEntry {
            range: WriteRange::new(0x10, 0x12),
            contributors: names(&["a.ips", "b.ips"]),
        };
        assert_eq!(
            entry.to_string(),
            "0x000010 - 0x000011 (2 bytes) written by: a.ips, b.ips"
        );
    }
}
