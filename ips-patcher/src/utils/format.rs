//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format an image offset the way ROM hacking tools print them
pub fn format_offset(offset: u32) -> String {
    format!("0x{offset:06X}")
}

/// Format how much of an image a patch covers
pub fn format_coverage(written: u64, image_len: u64) -> String {
    if image_len == 0 {
        "N/A".to_string()
    } else {
        format!("{:.1}%", written as f64 / image_len as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(16_777_216), "16.78 MB");
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0x1F), "0x00001F");
        assert_eq!(format_offset(0xFFFFFF), "0xFFFFFF");
    }

    #[test]
    fn test_format_coverage() {
        assert_eq!(format_coverage(50, 200), "25.0%");
        assert_eq!(format_coverage(0, 0), "N/A");
    }
}
