//! Patch selection and application order
//!
//! [`SelectionState`] is plain data owned by whoever drives the patcher.
//! Every operation is total: unknown names and moves past either end are
//! ignored, and names never repeat.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One patch in the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// Patch identifier, usually its file name
    pub name: String,
    /// Whether the patch takes part in conflict checks and application
    pub included: bool,
}

/// Ordered list of patches with their inclusion flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SelectionEntry>", into = "Vec<SelectionEntry>")]
pub struct SelectionState {
    entries: Vec<SelectionEntry>,
}

impl SelectionState {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with `names`, all included, in the given order
    ///
    /// # Examples
    ///
    /// ```
    /// use ips_patch::SelectionState;
    ///
    /// let mut selection = SelectionState::new();
    /// selection.load(["a.ips", "b.ips"]);
    /// selection.move_down("a.ips");
    /// selection.set_included("b.ips", false);
    /// assert_eq!(selection.ordered_included(), vec!["a.ips"]);
    /// ```
    pub fn load<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = dedup(names.into_iter().map(|name| SelectionEntry {
            name: name.into(),
            included: true,
        }));
    }

    /// Reconcile with a fresh listing of available patches
    ///
    /// Known names keep their position and flag, names no longer listed are
    /// dropped, and new names are appended (included) in listing order.
    pub fn refresh<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let listed: Vec<String> = names.into_iter().map(Into::into).collect();
        let available: HashSet<&str> = listed.iter().map(String::as_str).collect();

        let mut entries: Vec<SelectionEntry> = self
            .entries
            .drain(..)
            .filter(|e| available.contains(e.name.as_str()))
            .collect();
        let known: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();

        entries.extend(
            listed
                .iter()
                .filter(|name| !known.contains(name.as_str()))
                .map(|name| SelectionEntry {
                    name: name.clone(),
                    included: true,
                }),
        );
        self.entries = dedup(entries);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Swap `name` with the entry before it
    pub fn move_up(&mut self, name: &str) {
        if let Some(idx) = self.position(name)
            && idx > 0
        {
            self.entries.swap(idx - 1, idx);
        }
    }

    /// Swap `name` with the entry after it
    pub fn move_down(&mut self, name: &str) {
        if let Some(idx) = self.position(name)
            && idx + 1 < self.entries.len()
        {
            self.entries.swap(idx, idx + 1);
        }
    }

    /// Include or exclude `name` without moving it
    pub fn set_included(&mut self, name: &str, included: bool) {
        if let Some(idx) = self.position(name) {
            self.entries[idx].included = included;
        }
    }

    /// Names of included patches in application order
    pub fn ordered_included(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.included)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// All entries in order
    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Check if `name` is part of the selection
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Whether `name` is included, or `None` if unknown
    pub fn is_included(&self, name: &str) -> Option<bool> {
        self.position(name).map(|idx| self.entries[idx].included)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn dedup(entries: impl IntoIterator<Item = SelectionEntry>) -> Vec<SelectionEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.name.clone()))
        .collect()
}

impl From<Vec<SelectionEntry>> for SelectionState {
    fn from(entries: Vec<SelectionEntry>) -> Self {
        Self {
            entries: dedup(entries),
        }
    }
}

impl From<SelectionState> for Vec<SelectionEntry> {
    fn from(state: SelectionState) -> Self {
        state.entries
    }
}
