//! Parsing utilities for array format strings
//!
//! This module provides pure parsing functions for textual shapes, file
//! extensions and container path segments with no I/O dependencies.

use crate::format::constants::MAX_DIMENSIONS;
use crate::format::ArrayShape;
use crate::ArrayError;

/// Parse a shape string such as `"2x3"` or `"2,3"`
pub fn parse_shape(shape_str: &str) -> Result<ArrayShape, ArrayError> {
    if shape_str.is_empty() {
        return Err(ArrayError::InvalidShapeString);
    }

    let separator = if shape_str.contains('x') { 'x' } else { ',' };
    let mut extents = [0usize; MAX_DIMENSIONS];
    let mut count = 0;

    for part in shape_str.split(separator) {
        if count >= MAX_DIMENSIONS {
            return Err(ArrayError::InvalidDimensions);
        }
        extents[count] = parse_usize(part.trim())?;
        count += 1;
    }

    ArrayShape::new(&extents[..count])
}

/// Parse a usize from a string with error handling
fn parse_usize(s: &str) -> Result<usize, ArrayError> {
    if s.is_empty() {
        return Err(ArrayError::InvalidShapeString);
    }

    let mut result: usize = 0;

    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(ArrayError::InvalidShapeString);
        }

        let digit = (byte - b'0') as usize;

        if result > (usize::MAX - digit) / 10 {
            return Err(ArrayError::ArraySizeOverflow);
        }

        result = result * 10 + digit;
    }

    Ok(result)
}

/// Extract the extension of a file name, including the leading dot
///
/// Only the final component of the path is considered, and only its last
/// suffix: `"data/set.tar.bin"` yields `".bin"`. Names without a suffix,
/// and dot-files such as `".bin"`, yield an empty string.
pub fn file_extension(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) if pos + 1 == name.len() => "",
        Some(pos) => &name[pos..],
    }
}

/// Validate one segment of a hierarchical container path
///
/// Segments must be non-empty, at most 255 bytes, and free of control
/// characters.
pub fn validate_path_segment(segment: &str) -> Result<(), ArrayError> {
    if segment.is_empty() || segment.len() > 255 {
        return Err(ArrayError::InvalidPath);
    }

    if segment.bytes().any(|b| b < 32 || b == 127) {
        return Err(ArrayError::InvalidPath);
    }

    Ok(())
}
