//! Array shape definitions
//!
//! Shapes are stored in a fixed-capacity array so they can live inside
//! headers and descriptors without allocation. Element order follows the
//! on-disk convention: the first index varies fastest (column-major).

use super::constants::MAX_DIMENSIONS;
use super::ElementType;
use crate::{ArrayError, Result};

/// Ordered extents of a dense array with 1 to 4 dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ShapeRepr", into = "ShapeRepr"))]
pub struct ArrayShape {
    ndim: u8,
    extents: [usize; MAX_DIMENSIONS],
}

/// Serialized form, validated on the way back in
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ShapeRepr {
    ndim: u8,
    extents: [usize; MAX_DIMENSIONS],
}

#[cfg(feature = "serde")]
impl From<ArrayShape> for ShapeRepr {
    fn from(shape: ArrayShape) -> Self {
        Self {
            ndim: shape.ndim,
            extents: shape.extents,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<ShapeRepr> for ArrayShape {
    type Error = ArrayError;

    fn try_from(repr: ShapeRepr) -> Result<Self> {
        let ndim = repr.ndim as usize;
        if ndim > MAX_DIMENSIONS {
            return Err(ArrayError::InvalidDimensions);
        }
        Self::new(&repr.extents[..ndim])
    }
}

impl ArrayShape {
    /// Create a shape from its extents
    ///
    /// Fails when the dimensionality is outside `1..=4`, when an extent is
    /// zero, or when the element count does not fit in `usize`.
    pub fn new(extents: &[usize]) -> Result<Self> {
        if extents.is_empty() || extents.len() > MAX_DIMENSIONS {
            return Err(ArrayError::InvalidDimensions);
        }
        if extents.iter().any(|&e| e == 0) {
            return Err(ArrayError::InvalidExtent);
        }
        extents
            .iter()
            .try_fold(1usize, |acc, &e| acc.checked_mul(e))
            .ok_or(ArrayError::ArraySizeOverflow)?;

        let mut stored = [0usize; MAX_DIMENSIONS];
        stored[..extents.len()].copy_from_slice(extents);
        Ok(Self {
            ndim: extents.len() as u8,
            extents: stored,
        })
    }

    /// One-dimensional shape
    pub fn vector(len: usize) -> Result<Self> {
        Self::new(&[len])
    }

    /// Shape used for a single scalar value
    pub const fn scalar() -> Self {
        Self {
            ndim: 1,
            extents: [1, 0, 0, 0],
        }
    }

    /// Number of dimensions
    pub const fn ndim(&self) -> usize {
        self.ndim as usize
    }

    /// Extents as a slice of length `ndim`
    pub fn dims(&self) -> &[usize] {
        &self.extents[..self.ndim()]
    }

    /// Extent along one dimension
    pub fn extent(&self, dim: usize) -> Option<usize> {
        self.dims().get(dim).copied()
    }

    /// Total number of elements
    pub fn n_elements(&self) -> usize {
        // Checked at construction.
        self.dims().iter().product()
    }

    /// Size in bytes of one array of this shape and element type
    pub fn byte_size(&self, element_type: ElementType) -> Result<usize> {
        self.n_elements()
            .checked_mul(element_type.size_bytes())
            .ok_or(ArrayError::ArraySizeOverflow)
    }

    /// Linear storage offset of a multi-index in column-major order
    pub fn col_major_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = 0usize;
        let mut stride = 1usize;
        for (&i, &extent) in index.iter().zip(self.dims()) {
            if i >= extent {
                return None;
            }
            offset += i * stride;
            stride *= extent;
        }
        Some(offset)
    }

    /// Linear offset of a multi-index in row-major order
    pub fn row_major_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, &extent) in index.iter().zip(self.dims()) {
            if i >= extent {
                return None;
            }
            offset = offset * extent + i;
        }
        Some(offset)
    }

    /// Multi-index at a column-major linear offset
    ///
    /// Only the first `ndim` entries of the returned array are meaningful.
    pub fn unravel_col_major(&self, mut offset: usize) -> Option<[usize; MAX_DIMENSIONS]> {
        if offset >= self.n_elements() {
            return None;
        }
        let mut index = [0usize; MAX_DIMENSIONS];
        for (slot, &extent) in index.iter_mut().zip(self.dims()) {
            *slot = offset % extent;
            offset /= extent;
        }
        Some(index)
    }

    /// Shape with an extra leading dimension of `count`
    pub fn with_leading(&self, count: usize) -> Result<Self> {
        let mut extents = [0usize; MAX_DIMENSIONS + 1];
        extents[0] = count;
        extents[1..=self.ndim()].copy_from_slice(self.dims());
        Self::new(&extents[..=self.ndim()])
    }
}

impl core::fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, extent) in self.dims().iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{extent}")?;
        }
        Ok(())
    }
}

impl TryFrom<&[usize]> for ArrayShape {
    type Error = ArrayError;

    fn try_from(extents: &[usize]) -> Result<Self> {
        Self::new(extents)
    }
}
