//! Storage backend traits for binary array files
//!
//! This module defines the abstract interface for anything that exposes the
//! header and raw payloads of a binary array file, and a borrowed in-memory
//! implementation of it.

use crate::format::BinFileHeader;
use crate::scalar::Scalar;
use crate::traits::element::{decode_into, ArrayElement};
use crate::validation::cast_payload;
use crate::{ArrayError, Result};

/// Trait for backends that hold a complete binary array file
///
/// Implementations may be memory-mapped files, in-memory buffers, or any
/// other random-access byte storage. Payloads are returned in storage
/// (column-major) element order.
pub trait PayloadSource {
    /// Parsed header of the stored file
    fn header(&self) -> &BinFileHeader;

    /// Raw little-endian bytes of the array at `index`
    fn payload(&self, index: usize) -> Result<&[u8]>;

    /// Number of stored arrays
    fn n_samples(&self) -> usize {
        self.header().n_samples as usize
    }

    /// Borrow the payload as a typed slice when the layout allows it
    ///
    /// Returns `Ok(None)` when the element type matches but the bytes
    /// cannot be reinterpreted in place (misaligned buffer or big-endian
    /// target); callers then fall back to [`PayloadSource::decode`].
    fn try_view<T: ArrayElement + bytemuck::Pod>(&self, index: usize) -> Result<Option<&[T]>> {
        if self.header().element_type != T::ELEMENT_TYPE {
            return Err(ArrayError::TypeMismatch);
        }
        let bytes = self.payload(index)?;
        if cfg!(target_endian = "big") {
            return Ok(None);
        }
        match cast_payload::<T>(bytes) {
            Ok(slice) => Ok(Some(slice)),
            Err(ArrayError::ArrayAlignment) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decode the payload at `index` into a caller buffer of the stored type
    fn decode<T: ArrayElement>(&self, index: usize, dst: &mut [T]) -> Result<()> {
        if self.header().element_type != T::ELEMENT_TYPE {
            return Err(ArrayError::TypeMismatch);
        }
        decode_into(self.payload(index)?, dst)
    }

    /// Read a single element of the array at `index`
    fn element(&self, index: usize, offset: usize) -> Result<Scalar> {
        let header = self.header();
        if offset >= header.n_elements() {
            return Err(ArrayError::IndexOutOfBounds);
        }
        let size = header.element_type.size_bytes();
        let bytes = self.payload(index)?;
        let start = offset * size;
        Scalar::from_le_slice(header.element_type, &bytes[start..start + size])
    }
}

/// Binary array file held in a borrowed byte slice
#[derive(Debug, Clone, Copy)]
pub struct BinSlice<'a> {
    header: BinFileHeader,
    data: &'a [u8],
}

impl<'a> BinSlice<'a> {
    /// Parse a complete binary array file from memory
    ///
    /// The slice must contain at least as many payloads as the header
    /// claims; trailing bytes are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = BinFileHeader::from_bytes(data)?;
        let expected = header.expected_file_len()?;
        if (data.len() as u64) < expected {
            return Err(ArrayError::InsufficientBuffer);
        }
        Ok(Self { header, data })
    }

    /// Underlying bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

impl PayloadSource for BinSlice<'_> {
    fn header(&self) -> &BinFileHeader {
        &self.header
    }

    fn payload(&self, index: usize) -> Result<&[u8]> {
        payload_range(&self.header, self.data, index)
    }
}

/// Slice out the payload at `index` from a complete file image
pub fn payload_range<'d>(header: &BinFileHeader, data: &'d [u8], index: usize) -> Result<&'d [u8]> {
    if index as u64 >= header.n_samples {
        return Err(ArrayError::EndOfFile);
    }
    let start = header.payload_offset(index as u64)? as usize;
    let end = start + header.array_size_bytes()?;
    data.get(start..end).ok_or(ArrayError::InsufficientBuffer)
}
