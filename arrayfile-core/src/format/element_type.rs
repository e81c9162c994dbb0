//! Scalar element kinds supported by array files

use crate::ArrayError;

/// Element types supported by the array formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum ElementType {
    /// Boolean stored as a single byte
    Bool = 1,
    /// 8-bit signed integer
    Int8 = 2,
    /// 16-bit signed integer
    Int16 = 3,
    /// 32-bit signed integer
    Int32 = 4,
    /// 64-bit signed integer
    Int64 = 5,
    /// 8-bit unsigned integer
    UInt8 = 6,
    /// 16-bit unsigned integer
    UInt16 = 7,
    /// 32-bit unsigned integer
    UInt32 = 8,
    /// 64-bit unsigned integer
    UInt64 = 9,
    /// 32-bit floating point
    Float32 = 10,
    /// 64-bit floating point
    Float64 = 11,
    /// Complex number made of two 32-bit floats
    Complex64 = 13,
    /// Complex number made of two 64-bit floats
    Complex128 = 14,
}

impl ElementType {
    /// Every supported element type, in tag order
    pub const ALL: [ElementType; 13] = [
        ElementType::Bool,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::UInt8,
        ElementType::UInt16,
        ElementType::UInt32,
        ElementType::UInt64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Complex64,
        ElementType::Complex128,
    ];

    /// Convert from u8 representation
    ///
    /// Tags 12 and 15 (extended precision float and complex) are reserved
    /// and not accepted.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ElementType::Bool),
            2 => Some(ElementType::Int8),
            3 => Some(ElementType::Int16),
            4 => Some(ElementType::Int32),
            5 => Some(ElementType::Int64),
            6 => Some(ElementType::UInt8),
            7 => Some(ElementType::UInt16),
            8 => Some(ElementType::UInt32),
            9 => Some(ElementType::UInt64),
            10 => Some(ElementType::Float32),
            11 => Some(ElementType::Float64),
            13 => Some(ElementType::Complex64),
            14 => Some(ElementType::Complex128),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the size in bytes for this element type
    pub const fn size_bytes(self) -> usize {
        match self {
            ElementType::Bool | ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64
            | ElementType::UInt64
            | ElementType::Float64
            | ElementType::Complex64 => 8,
            ElementType::Complex128 => 16,
        }
    }

    /// Canonical lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::UInt8 => "uint8",
            ElementType::UInt16 => "uint16",
            ElementType::UInt32 => "uint32",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Complex64 => "complex64",
            ElementType::Complex128 => "complex128",
        }
    }

    /// Whether values of this type carry an imaginary part
    pub const fn is_complex(self) -> bool {
        matches!(self, ElementType::Complex64 | ElementType::Complex128)
    }
}

impl core::fmt::Display for ElementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl core::str::FromStr for ElementType {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or(ArrayError::UnknownElementTypeName)
    }
}

impl TryFrom<u8> for ElementType {
    type Error = ArrayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ElementType::from_u8(value).ok_or(ArrayError::UnknownElementType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::from_u8(ty.to_u8()), Some(ty));
        }
        assert_eq!(ElementType::from_u8(0), None);
        assert_eq!(ElementType::from_u8(12), None);
        assert_eq!(ElementType::from_u8(15), None);
    }

    #[test]
    fn test_names() {
        assert_eq!("float64".parse::<ElementType>(), Ok(ElementType::Float64));
        assert_eq!("complex64".parse::<ElementType>(), Ok(ElementType::Complex64));
        assert_eq!(
            "float128".parse::<ElementType>(),
            Err(ArrayError::UnknownElementTypeName)
        );
    }

    #[test]
    fn test_sizes() {
        assert_eq!(ElementType::Bool.size_bytes(), 1);
        assert_eq!(ElementType::UInt16.size_bytes(), 2);
        assert_eq!(ElementType::Complex64.size_bytes(), 8);
        assert_eq!(ElementType::Complex128.size_bytes(), 16);
    }
}
