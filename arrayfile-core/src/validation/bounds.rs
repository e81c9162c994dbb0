//! Array bounds and alignment validation
//!
//! This module provides pure validation functions for reinterpreting raw
//! payload bytes as typed element arrays.

use crate::ArrayError;

/// Validate array bounds for a given element type
///
/// Performs mathematical validation of array size calculations with
/// overflow protection. This is a pure function with no I/O.
pub const fn validate_array_bounds<T>(byte_len: usize) -> Result<usize, ArrayError> {
    let element_size = core::mem::size_of::<T>();

    if byte_len % element_size != 0 {
        return Err(ArrayError::ArrayAlignment);
    }

    let count = byte_len / element_size;

    // Reject arrays larger than usize::MAX / 8 so downstream offsets cannot overflow
    if count > usize::MAX / 8 {
        return Err(ArrayError::ArraySizeOverflow);
    }

    Ok(count)
}

/// Reinterpret a payload as a typed slice without copying
///
/// Fails with `ArrayAlignment` when the length is not a multiple of the
/// element size or the start address is misaligned for `T`.
pub fn cast_payload<T: bytemuck::Pod>(bytes: &[u8]) -> Result<&[T], ArrayError> {
    validate_array_bounds::<T>(bytes.len())?;
    bytemuck::try_cast_slice(bytes).map_err(|_| ArrayError::ArrayAlignment)
}

/// Checked byte size of `count` elements of `element_size` bytes
pub const fn checked_byte_size(count: usize, element_size: usize) -> Result<usize, ArrayError> {
    match count.checked_mul(element_size) {
        Some(size) => Ok(size),
        None => Err(ArrayError::ArraySizeOverflow),
    }
}
