//! Common test utilities and fixtures

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Hand-assembles IPS byte streams record by record
#[derive(Debug, Default)]
pub struct IpsBuilder {
    bytes: Vec<u8>,
}

impl IpsBuilder {
    pub fn new() -> Self {
        Self {
            bytes: b"PATCH".to_vec(),
        }
    }

    pub fn literal(mut self, offset: u32, data: &[u8]) -> Self {
        assert!(!data.is_empty() && data.len() <= usize::from(u16::MAX));
        self.bytes.extend_from_slice(&offset.to_be_bytes()[1..]);
        self.bytes
            .extend_from_slice(&(data.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn run(mut self, offset: u32, length: u16, fill: u8) -> Self {
        self.bytes.extend_from_slice(&offset.to_be_bytes()[1..]);
        self.bytes.extend_from_slice(&[0, 0]);
        self.bytes.extend_from_slice(&length.to_be_bytes());
        self.bytes.push(fill);
        self
    }

    /// Terminated stream
    pub fn build(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(b"EOF");
        self.bytes
    }

    /// Stream without the terminator
    pub fn build_unterminated(self) -> Vec<u8> {
        self.bytes
    }
}

/// Create a test file with specific content
pub fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
