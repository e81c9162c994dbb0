//! Binary array file header definitions
//!
//! The header is a fixed 64-byte little-endian block at the start of every
//! binary array file. It records the element type and shape shared by all
//! arrays in the file and the number of arrays stored after it.

use super::constants::{binfile, MAX_DIMENSIONS};
use super::{ArrayShape, ElementType};
use crate::{ArrayError, Result};

/// Header of a binary array file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinFileHeader {
    /// Format version
    pub version: u8,
    /// Element type shared by every array
    pub element_type: ElementType,
    /// Shape shared by every array
    pub shape: ArrayShape,
    /// Number of arrays stored after the header
    pub n_samples: u64,
}

impl BinFileHeader {
    /// Magic bytes for binary array files
    pub const MAGIC: [u8; 4] = binfile::MAGIC;

    /// Current format version
    pub const VERSION: u8 = binfile::VERSION;

    /// Size of the header in bytes
    pub const SIZE: usize = binfile::HEADER_SIZE;

    /// Create a header for an empty file
    pub const fn new(element_type: ElementType, shape: ArrayShape) -> Self {
        Self {
            version: Self::VERSION,
            element_type,
            shape,
            n_samples: 0,
        }
    }

    /// Number of dimensions of every array
    pub const fn n_dimensions(&self) -> usize {
        self.shape.ndim()
    }

    /// Number of elements per array
    pub fn n_elements(&self) -> usize {
        self.shape.n_elements()
    }

    /// Bytes occupied by one array payload
    pub fn array_size_bytes(&self) -> Result<usize> {
        self.shape.byte_size(self.element_type)
    }

    /// Byte offset of the payload at `index`
    pub fn payload_offset(&self, index: u64) -> Result<u64> {
        let size = self.array_size_bytes()? as u64;
        index
            .checked_mul(size)
            .and_then(|o| o.checked_add(Self::SIZE as u64))
            .ok_or(ArrayError::ArraySizeOverflow)
    }

    /// Total file length implied by the header
    pub fn expected_file_len(&self) -> Result<u64> {
        self.payload_offset(self.n_samples)
    }

    /// Check whether another array description matches this header
    ///
    /// The element type is checked first, so an array that differs in both
    /// type and shape reports a type mismatch.
    pub fn check_compatible(&self, element_type: ElementType, shape: &ArrayShape) -> Result<()> {
        if self.element_type != element_type {
            return Err(ArrayError::TypeMismatch);
        }
        if self.shape != *shape {
            return Err(ArrayError::ShapeMismatch);
        }
        Ok(())
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(ArrayError::InsufficientBuffer);
        }

        crate::validation::validate_magic_bytes(&[bytes[0], bytes[1], bytes[2], bytes[3]], &Self::MAGIC)?;

        let version = bytes[4];
        if version == 0 || version > Self::VERSION {
            return Err(ArrayError::UnsupportedVersion);
        }

        let element_type = ElementType::try_from(bytes[5])?;

        let ndim = bytes[6] as usize;
        if ndim == 0 || ndim > MAX_DIMENSIONS {
            return Err(ArrayError::InvalidDimensions);
        }

        let mut extents = [0usize; MAX_DIMENSIONS];
        for (dim, extent) in extents.iter_mut().enumerate().take(ndim) {
            let start = 8 + dim * 8;
            let raw = read_u64(&bytes[start..start + 8])?;
            *extent = usize::try_from(raw).map_err(|_| ArrayError::ArraySizeOverflow)?;
        }
        let shape = ArrayShape::new(&extents[..ndim])?;

        let n_samples = read_u64(&bytes[binfile::SAMPLE_COUNT_OFFSET..binfile::SAMPLE_COUNT_OFFSET + 8])?;

        Ok(Self {
            version,
            element_type,
            shape,
            n_samples,
        })
    }

    /// Convert header to a fixed byte array
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&Self::MAGIC);
        bytes[4] = self.version;
        bytes[5] = self.element_type.to_u8();
        bytes[6] = self.shape.ndim() as u8;
        // byte 7 is reserved
        for (dim, &extent) in self.shape.dims().iter().enumerate() {
            let start = 8 + dim * 8;
            bytes[start..start + 8].copy_from_slice(&(extent as u64).to_le_bytes());
        }
        bytes[binfile::SAMPLE_COUNT_OFFSET..binfile::SAMPLE_COUNT_OFFSET + 8]
            .copy_from_slice(&self.n_samples.to_le_bytes());
        bytes
    }
}

fn read_u64(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| ArrayError::InsufficientBuffer)?;
    Ok(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let shape = ArrayShape::new(&[2, 3]).unwrap();
        let mut header = BinFileHeader::new(ElementType::Float64, shape);
        header.n_samples = 3;

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"ABIN");
        assert_eq!(bytes[5], ElementType::Float64.to_u8());
        assert_eq!(bytes[6], 2);
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &3u64.to_le_bytes());
        assert_eq!(&bytes[24..40], &[0u8; 16]);
        assert_eq!(&bytes[40..48], &3u64.to_le_bytes());

        assert_eq!(BinFileHeader::from_bytes(&bytes), Ok(header));
    }

    #[test]
    fn test_header_offsets() {
        let shape = ArrayShape::new(&[2, 3]).unwrap();
        let mut header = BinFileHeader::new(ElementType::Int16, shape);
        assert_eq!(header.array_size_bytes(), Ok(12));
        assert_eq!(header.payload_offset(0), Ok(64));
        assert_eq!(header.payload_offset(2), Ok(88));
        header.n_samples = 4;
        assert_eq!(header.expected_file_len(), Ok(112));
    }

    #[test]
    fn test_header_rejects_garbage() {
        let shape = ArrayShape::new(&[4]).unwrap();
        let good = BinFileHeader::new(ElementType::UInt8, shape).to_bytes();

        assert_eq!(
            BinFileHeader::from_bytes(&good[..10]),
            Err(ArrayError::InsufficientBuffer)
        );

        let mut bad_magic = good;
        bad_magic[0] = b'X';
        assert_eq!(BinFileHeader::from_bytes(&bad_magic), Err(ArrayError::InvalidHeader));

        let mut bad_type = good;
        bad_type[5] = 12;
        assert_eq!(
            BinFileHeader::from_bytes(&bad_type),
            Err(ArrayError::UnknownElementType)
        );

        let mut bad_ndim = good;
        bad_ndim[6] = 5;
        assert_eq!(
            BinFileHeader::from_bytes(&bad_ndim),
            Err(ArrayError::InvalidDimensions)
        );

        let mut bad_version = good;
        bad_version[4] = 9;
        assert_eq!(
            BinFileHeader::from_bytes(&bad_version),
            Err(ArrayError::UnsupportedVersion)
        );
    }

    #[test]
    fn test_check_compatible() {
        let shape = ArrayShape::new(&[2, 3]).unwrap();
        let other = ArrayShape::new(&[3, 2]).unwrap();
        let header = BinFileHeader::new(ElementType::Float32, shape);
        assert_eq!(header.check_compatible(ElementType::Float32, &shape), Ok(()));
        assert_eq!(
            header.check_compatible(ElementType::Float64, &shape),
            Err(ArrayError::TypeMismatch)
        );
        assert_eq!(
            header.check_compatible(ElementType::Float32, &other),
            Err(ArrayError::ShapeMismatch)
        );
    }
}
