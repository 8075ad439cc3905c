//! Caller-owned state shared by the patch commands
//!
//! Everything the engine needs is resolved here from the command line and
//! passed down explicitly.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use ips_patch::{PatchDirectory, PatchFile, SelectionState};

use crate::cli::SourceArgs;

/// File name of the selection file inside the patches folder
pub const DEFAULT_SELECTION_FILE: &str = "selection.json";

/// Patches folder plus the selection file that orders it
#[derive(Debug, Clone)]
pub struct PatcherContext {
    patches: PatchDirectory,
    selection_path: PathBuf,
}

impl From<SourceArgs> for PatcherContext {
    fn from(args: SourceArgs) -> Self {
        Self::new(args.patches_dir, args.selection)
    }
}

impl PatcherContext {
    /// Resolve the context; the selection file defaults to one inside `patches_dir`
    pub fn new(patches_dir: PathBuf, selection: Option<PathBuf>) -> Self {
        let selection_path = selection.unwrap_or_else(|| patches_dir.join(DEFAULT_SELECTION_FILE));
        Self {
            patches: PatchDirectory::new(patches_dir),
            selection_path,
        }
    }

    /// The patches folder
    pub fn patches(&self) -> &PatchDirectory {
        &self.patches
    }

    /// Location of the selection file
    pub fn selection_path(&self) -> &Path {
        &self.selection_path
    }

    /// Patch names currently in the folder
    pub fn list_patches(&self) -> Result<Vec<String>> {
        self.patches
            .list()
            .with_context(|| format!("Invalid patches folder: {}", self.patches.root().display()))
    }

    /// Load the saved selection, reconciled with the folder contents
    ///
    /// Without a saved selection every patch is included in name order.
    pub fn load_selection(&self) -> Result<SelectionState> {
        let names = self.list_patches()?;
        let mut selection = SelectionState::new();

        if self.selection_path.is_file() {
            let text = fs::read_to_string(&self.selection_path).with_context(|| {
                format!(
                    "Failed to read selection file: {}",
                    self.selection_path.display()
                )
            })?;
            selection = serde_json::from_str(&text).with_context(|| {
                format!(
                    "Failed to parse selection file: {}",
                    self.selection_path.display()
                )
            })?;
            selection.refresh(names);
            log::debug!(
                "Loaded selection from {} ({} entries)",
                self.selection_path.display(),
                selection.len()
            );
        } else {
            selection.load(names);
        }

        Ok(selection)
    }

    /// Persist `selection` to the selection file
    pub fn save_selection(&self, selection: &SelectionState) -> Result<()> {
        let json = serde_json::to_string_pretty(selection).context("Failed to encode selection")?;
        fs::write(&self.selection_path, json + "\n").with_context(|| {
            format!(
                "Failed to write selection file: {}",
                self.selection_path.display()
            )
        })?;
        log::info!("Saved selection to {}", self.selection_path.display());
        Ok(())
    }

    /// Open the named patches in order
    pub fn open_patches(&self, names: &[&str]) -> Result<Vec<PatchFile>> {
        names
            .iter()
            .map(|name| {
                self.patches
                    .open(name)
                    .with_context(|| format!("Error reading patch {name}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_with(names: &[&str]) -> (TempDir, PatcherContext) {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"PATCHEOF").unwrap();
        }
        let context = PatcherContext::new(dir.path().to_path_buf(), None);
        (dir, context)
    }

    #[test]
    fn test_default_selection_includes_everything() {
        let (_dir, context) = context_with(&["b.ips", "a.ips"]);
        let selection = context.load_selection().unwrap();
        assert_eq!(selection.ordered_included(), vec!["a.ips", "b.ips"]);
    }

    #[test]
    fn test_saved_selection_is_reconciled() {
        let (dir, context) = context_with(&["a.ips", "b.ips"]);

        let mut selection = context.load_selection().unwrap();
        selection.move_down("a.ips");
        selection.set_included("b.ips", false);
        context.save_selection(&selection).unwrap();

        fs::write(dir.path().join("c.ips"), b"PATCHEOF").unwrap();
        let reloaded = context.load_selection().unwrap();
        assert_eq!(reloaded.ordered_included(), vec!["a.ips", "c.ips"]);
        assert_eq!(reloaded.entries()[0].name, "b.ips");
    }

    #[test]
    fn test_selection_path_override() {
        let context = PatcherContext::new(
            PathBuf::from("patches"),
            Some(PathBuf::from("order.json")),
        );
        assert_eq!(context.selection_path(), Path::new("order.json"));

        let context = PatcherContext::new(PathBuf::from("patches"), None);
        assert_eq!(
            context.selection_path(),
            Path::new("patches").join(DEFAULT_SELECTION_FILE)
        );
    }
}
