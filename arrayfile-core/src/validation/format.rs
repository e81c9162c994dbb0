//! Format-specific validation utilities
//!
//! This module provides pure validation functions for format constraints
//! such as magic bytes and compression levels.

use crate::format::constants::hierarchical::MAX_COMPRESSION;
use crate::ArrayError;

/// Validate magic bytes match expected pattern
pub const fn validate_magic_bytes(actual: &[u8; 4], expected: &[u8; 4]) -> Result<(), ArrayError> {
    if actual[0] != expected[0]
        || actual[1] != expected[1]
        || actual[2] != expected[2]
        || actual[3] != expected[3]
    {
        return Err(ArrayError::InvalidHeader);
    }
    Ok(())
}

/// Check that a compression level lies in `0..=9`
pub const fn is_valid_compression(level: u8) -> bool {
    level <= MAX_COMPRESSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_magic_bytes() {
        assert_eq!(validate_magic_bytes(b"ABIN", b"ABIN"), Ok(()));
        assert_eq!(
            validate_magic_bytes(b"ABIX", b"ABIN"),
            Err(ArrayError::InvalidHeader)
        );
    }

    #[test]
    fn test_compression_levels() {
        assert!(is_valid_compression(0));
        assert!(is_valid_compression(9));
        assert!(!is_valid_compression(10));
    }
}
