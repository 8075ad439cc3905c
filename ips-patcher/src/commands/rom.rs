//! ROM identification against known clean dumps

use anyhow::{Context, Result};
use console::style;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::utils::format_bytes;

/// A clean dump patches are usually made against
#[derive(Debug, Clone, Copy)]
pub struct KnownRom {
    pub name: &'static str,
    pub crc32: u32,
    pub sha1: &'static str,
}

/// Catalog of recognised base images
pub const KNOWN_ROMS: &[KnownRom] = &[KnownRom {
    name: "Pokemon FireRed USA v1.0",
    crc32: 0xDD88_761C,
    sha1: "41CB23D8DCCC8EBD7C649CD8FBB58EEACE6E2FDC",
}];

/// Checksums of a ROM image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomIdentity {
    pub size: u64,
    pub crc32: u32,
    /// Uppercase hex SHA-1
    pub sha1: String,
}

impl RomIdentity {
    /// Hash everything `reader` yields
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut crc = crc32fast::Hasher::new();
        let mut sha1 = Sha1::new();
        let mut size = 0u64;
        let mut chunk = [0u8; 8192];

        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            crc.update(&chunk[..read]);
            sha1.update(&chunk[..read]);
            size += read as u64;
        }

        Ok(Self {
            size,
            crc32: crc.finalize(),
            sha1: hex::encode_upper(sha1.finalize()),
        })
    }

    /// Hash the file at `path`
    pub fn of_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open ROM: {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read ROM: {}", path.display()))
    }

    /// The catalog entry matching both checksums
    pub fn known_match(&self) -> Option<&'static KnownRom> {
        KNOWN_ROMS
            .iter()
            .find(|rom| rom.crc32 == self.crc32 && rom.sha1.eq_ignore_ascii_case(&self.sha1))
    }
}

pub fn execute_identify(path: &Path) -> Result<()> {
    let identity = RomIdentity::of_file(path)?;

    println!("\n{}", style("ROM Identity").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Size: {}", format_bytes(identity.size));
    println!("CRC32: {}", style(format!("{:08X}", identity.crc32)).yellow());
    println!("SHA1: {}", style(&identity.sha1).yellow());

    match identity.known_match() {
        Some(rom) => println!("ROM match: {}", style(format!("Detected: {}", rom.name)).green()),
        None => println!("ROM match: {}", style("Unknown ROM (warning)").yellow()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_checksums() {
        let identity = RomIdentity::from_reader(&b"123456789"[..]).unwrap();
        assert_eq!(identity.size, 9);
        assert_eq!(identity.crc32, 0xCBF4_3926);
        assert_eq!(identity.sha1, "F7C3BC1D808E04732ADF679965CCC34CA7AE3441");
        assert!(identity.known_match().is_none());
    }

    #[test]
    fn test_catalog_match_needs_both_hashes() {
        let rom = &KNOWN_ROMS[0];
        let identity = RomIdentity {
            size: 16 * 1024 * 1024,
            crc32: rom.crc32,
            sha1: rom.sha1.to_lowercase(),
        };
        assert_eq!(identity.known_match().map(|r| r.name), Some(rom.name));

        let wrong_sha = RomIdentity {
            sha1: "0".repeat(40),
            ..identity
        };
        assert!(wrong_sha.known_match().is_none());
    }
}
