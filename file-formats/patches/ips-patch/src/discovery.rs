//! Locating patches on disk

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::PatchFile;

/// File extension of IPS patches, matched case-insensitively
pub const IPS_EXTENSION: &str = "ips";

/// Check if `path` names an IPS patch by its extension
pub fn is_ips_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(IPS_EXTENSION))
}

/// File names of the IPS patches in `dir`, sorted
pub fn discover_patches<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !is_ips_path(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        } else {
            log::warn!("Skipping patch with non UTF-8 name: {}", path.display());
        }
    }

    names.sort();
    log::info!("Found {} patches in {}", names.len(), dir.display());
    Ok(names)
}

/// A folder of patches addressed by file name
#[derive(Debug, Clone)]
pub struct PatchDirectory {
    root: PathBuf,
}

impl PatchDirectory {
    /// Wrap `root`; nothing is read until asked
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The folder path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the patch called `name`
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Sorted names of the patches in the folder
    pub fn list(&self) -> Result<Vec<String>> {
        discover_patches(&self.root)
    }

    /// Read and decode the patch called `name`
    pub fn open(&self, name: &str) -> Result<PatchFile> {
        PatchFile::open(self.path_of(name))
    }

    /// Lazily open `names` in order, for [`apply_patches`](crate::apply_patches)
    pub fn open_all<'a, I>(&'a self, names: I) -> impl Iterator<Item = Result<PatchFile>> + 'a
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: 'a,
    {
        names.into_iter().map(move |name| self.open(name))
    }
}
