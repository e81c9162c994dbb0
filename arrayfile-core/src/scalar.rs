//! Tagged union over every supported scalar kind

use crate::format::ElementType;
use crate::traits::ArrayElement;
use crate::Result;
use num_complex::{Complex32, Complex64};

/// One value of any supported element type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex32),
    Complex128(Complex64),
}

impl Scalar {
    /// Element type of the held value
    pub const fn element_type(&self) -> ElementType {
        match self {
            Scalar::Bool(_) => ElementType::Bool,
            Scalar::Int8(_) => ElementType::Int8,
            Scalar::Int16(_) => ElementType::Int16,
            Scalar::Int32(_) => ElementType::Int32,
            Scalar::Int64(_) => ElementType::Int64,
            Scalar::UInt8(_) => ElementType::UInt8,
            Scalar::UInt16(_) => ElementType::UInt16,
            Scalar::UInt32(_) => ElementType::UInt32,
            Scalar::UInt64(_) => ElementType::UInt64,
            Scalar::Float32(_) => ElementType::Float32,
            Scalar::Float64(_) => ElementType::Float64,
            Scalar::Complex64(_) => ElementType::Complex64,
            Scalar::Complex128(_) => ElementType::Complex128,
        }
    }

    /// Convert to a concrete element type
    pub fn get<T: ArrayElement>(self) -> T {
        T::from_scalar(self)
    }

    /// Value-preserving cast to another element type
    pub fn cast(self, to: ElementType) -> Scalar {
        match to {
            ElementType::Bool => Scalar::Bool(self.get()),
            ElementType::Int8 => Scalar::Int8(self.get()),
            ElementType::Int16 => Scalar::Int16(self.get()),
            ElementType::Int32 => Scalar::Int32(self.get()),
            ElementType::Int64 => Scalar::Int64(self.get()),
            ElementType::UInt8 => Scalar::UInt8(self.get()),
            ElementType::UInt16 => Scalar::UInt16(self.get()),
            ElementType::UInt32 => Scalar::UInt32(self.get()),
            ElementType::UInt64 => Scalar::UInt64(self.get()),
            ElementType::Float32 => Scalar::Float32(self.get()),
            ElementType::Float64 => Scalar::Float64(self.get()),
            ElementType::Complex64 => Scalar::Complex64(self.get()),
            ElementType::Complex128 => Scalar::Complex128(self.get()),
        }
    }

    /// Decode one value of `element_type` from little-endian bytes
    pub fn from_le_slice(element_type: ElementType, bytes: &[u8]) -> Result<Scalar> {
        Ok(match element_type {
            ElementType::Bool => Scalar::Bool(bool::from_le_slice(bytes)?),
            ElementType::Int8 => Scalar::Int8(i8::from_le_slice(bytes)?),
            ElementType::Int16 => Scalar::Int16(i16::from_le_slice(bytes)?),
            ElementType::Int32 => Scalar::Int32(i32::from_le_slice(bytes)?),
            ElementType::Int64 => Scalar::Int64(i64::from_le_slice(bytes)?),
            ElementType::UInt8 => Scalar::UInt8(u8::from_le_slice(bytes)?),
            ElementType::UInt16 => Scalar::UInt16(u16::from_le_slice(bytes)?),
            ElementType::UInt32 => Scalar::UInt32(u32::from_le_slice(bytes)?),
            ElementType::UInt64 => Scalar::UInt64(u64::from_le_slice(bytes)?),
            ElementType::Float32 => Scalar::Float32(f32::from_le_slice(bytes)?),
            ElementType::Float64 => Scalar::Float64(f64::from_le_slice(bytes)?),
            ElementType::Complex64 => Scalar::Complex64(Complex32::from_le_slice(bytes)?),
            ElementType::Complex128 => Scalar::Complex128(Complex64::from_le_slice(bytes)?),
        })
    }
}

impl core::fmt::Display for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt8(v) => write!(f, "{v}"),
            Scalar::UInt16(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Complex64(v) => write!(f, "{v}"),
            Scalar::Complex128(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_dispatch() {
        assert_eq!(Scalar::Float64(2.9).cast(ElementType::Int16), Scalar::Int16(2));
        assert_eq!(Scalar::Int32(0).cast(ElementType::Bool), Scalar::Bool(false));
        assert_eq!(
            Scalar::UInt8(4).cast(ElementType::Complex64),
            Scalar::Complex64(Complex32::new(4.0, 0.0))
        );
        for ty in ElementType::ALL {
            assert_eq!(Scalar::Int8(1).cast(ty).element_type(), ty);
        }
    }

    #[test]
    fn test_decode() {
        let bytes = 7.5f32.to_le_bytes();
        assert_eq!(
            Scalar::from_le_slice(ElementType::Float32, &bytes),
            Ok(Scalar::Float32(7.5))
        );
    }
}
