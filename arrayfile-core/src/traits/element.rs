//! Array element type constraints
//!
//! This module defines the trait that constrains what types can be stored
//! as array elements, together with the value-preserving casts between them.

use crate::format::ElementType;
use crate::scalar::Scalar;
use crate::{ArrayError, Result};
use num_complex::Complex;

/// Trait for types that can be stored as array elements
///
/// Every element type has a fixed little-endian encoding of
/// `ELEMENT_TYPE.size_bytes()` bytes and converts to and from the
/// [`Scalar`] tagged union, which is how casts between kinds are expressed.
pub trait ArrayElement: Copy + PartialEq + Default + Send + Sync + core::fmt::Debug + 'static {
    /// Element type tag for this Rust type
    const ELEMENT_TYPE: ElementType;

    /// Encoded size in bytes
    const SIZE: usize = Self::ELEMENT_TYPE.size_bytes();

    /// Fixed-size little-endian encoding
    type Bytes: AsRef<[u8]>;

    /// Get the element type for this Rust type
    fn element_type() -> ElementType {
        Self::ELEMENT_TYPE
    }

    /// Convert from any scalar kind with a value-preserving cast
    fn from_scalar(value: Scalar) -> Self;

    /// Wrap in the scalar tagged union
    fn into_scalar(self) -> Scalar;

    /// Little-endian encoding
    fn to_le_array(self) -> Self::Bytes;

    /// Decode from the first `SIZE` bytes of a slice
    fn from_le_slice(bytes: &[u8]) -> Result<Self>;

    /// Cast this value to another element type
    fn cast<D: ArrayElement>(self) -> D {
        D::from_scalar(self.into_scalar())
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or(ArrayError::InsufficientBuffer)
}

macro_rules! impl_real_element {
    ($t:ty, $variant:ident, $n:expr) => {
        impl ArrayElement for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            type Bytes = [u8; $n];

            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Bool(v) => v as u8 as $t,
                    Scalar::Int8(v) => v as $t,
                    Scalar::Int16(v) => v as $t,
                    Scalar::Int32(v) => v as $t,
                    Scalar::Int64(v) => v as $t,
                    Scalar::UInt8(v) => v as $t,
                    Scalar::UInt16(v) => v as $t,
                    Scalar::UInt32(v) => v as $t,
                    Scalar::UInt64(v) => v as $t,
                    Scalar::Float32(v) => v as $t,
                    Scalar::Float64(v) => v as $t,
                    Scalar::Complex64(v) => v.re as $t,
                    Scalar::Complex128(v) => v.re as $t,
                }
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn to_le_array(self) -> Self::Bytes {
                self.to_le_bytes()
            }

            fn from_le_slice(bytes: &[u8]) -> Result<Self> {
                Ok(<$t>::from_le_bytes(fixed::<$n>(bytes)?))
            }
        }
    };
}

impl_real_element!(i8, Int8, 1);
impl_real_element!(i16, Int16, 2);
impl_real_element!(i32, Int32, 4);
impl_real_element!(i64, Int64, 8);
impl_real_element!(u8, UInt8, 1);
impl_real_element!(u16, UInt16, 2);
impl_real_element!(u32, UInt32, 4);
impl_real_element!(u64, UInt64, 8);
impl_real_element!(f32, Float32, 4);
impl_real_element!(f64, Float64, 8);

impl ArrayElement for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;
    type Bytes = [u8; 1];

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Bool(v) => v,
            Scalar::Int8(v) => v != 0,
            Scalar::Int16(v) => v != 0,
            Scalar::Int32(v) => v != 0,
            Scalar::Int64(v) => v != 0,
            Scalar::UInt8(v) => v != 0,
            Scalar::UInt16(v) => v != 0,
            Scalar::UInt32(v) => v != 0,
            Scalar::UInt64(v) => v != 0,
            Scalar::Float32(v) => v != 0.0,
            Scalar::Float64(v) => v != 0.0,
            Scalar::Complex64(v) => v.re != 0.0 || v.im != 0.0,
            Scalar::Complex128(v) => v.re != 0.0 || v.im != 0.0,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn to_le_array(self) -> Self::Bytes {
        [self as u8]
    }

    fn from_le_slice(bytes: &[u8]) -> Result<Self> {
        Ok(fixed::<1>(bytes)?[0] != 0)
    }
}

macro_rules! impl_complex_element {
    ($f:ty, $variant:ident, $n:expr, $half:expr) => {
        impl ArrayElement for Complex<$f> {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            type Bytes = [u8; $n];

            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Complex64(v) => Complex::new(v.re as $f, v.im as $f),
                    Scalar::Complex128(v) => Complex::new(v.re as $f, v.im as $f),
                    real => Complex::new(<$f>::from_scalar(real), 0.0),
                }
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn to_le_array(self) -> Self::Bytes {
                let mut bytes = [0u8; $n];
                bytes[..$half].copy_from_slice(&self.re.to_le_bytes());
                bytes[$half..].copy_from_slice(&self.im.to_le_bytes());
                bytes
            }

            fn from_le_slice(bytes: &[u8]) -> Result<Self> {
                let raw = fixed::<$n>(bytes)?;
                let re = <$f>::from_le_bytes(fixed::<$half>(&raw[..$half])?);
                let im = <$f>::from_le_bytes(fixed::<$half>(&raw[$half..])?);
                Ok(Complex::new(re, im))
            }
        }
    };
}

impl_complex_element!(f32, Complex64, 8, 4);
impl_complex_element!(f64, Complex128, 16, 8);

/// Cast every element of `src` into `dst`
///
/// Both slices must have the same length.
pub fn cast_into<S: ArrayElement, D: ArrayElement>(src: &[S], dst: &mut [D]) -> Result<()> {
    if src.len() != dst.len() {
        return Err(ArrayError::ShapeMismatch);
    }
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s.cast();
    }
    Ok(())
}

/// Decode a little-endian payload into a typed slice
pub fn decode_into<T: ArrayElement>(bytes: &[u8], dst: &mut [T]) -> Result<()> {
    let expected = dst
        .len()
        .checked_mul(T::SIZE)
        .ok_or(ArrayError::ArraySizeOverflow)?;
    if bytes.len() != expected {
        return Err(ArrayError::InsufficientBuffer);
    }
    for (d, chunk) in dst.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
        *d = T::from_le_slice(chunk)?;
    }
    Ok(())
}

/// Cast a slice into a newly allocated vector (requires alloc feature)
#[cfg(feature = "alloc")]
pub fn cast_slice<S: ArrayElement, D: ArrayElement>(src: &[S]) -> alloc::vec::Vec<D> {
    src.iter().map(|&s| s.cast()).collect()
}

/// Encode a typed slice as little-endian bytes (requires alloc feature)
#[cfg(feature = "alloc")]
pub fn encode_slice<T: ArrayElement>(src: &[T], out: &mut alloc::vec::Vec<u8>) {
    out.reserve(src.len() * T::SIZE);
    for &value in src {
        out.extend_from_slice(value.to_le_array().as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_casts() {
        assert_eq!(300i32.cast::<u8>(), 44);
        assert_eq!((-1i8).cast::<u16>(), u16::MAX);
        assert_eq!(2.75f64.cast::<i32>(), 2);
        assert_eq!((-3.5f32).cast::<u32>(), 0);
        assert_eq!(u64::MAX.cast::<i64>(), -1);
    }

    #[test]
    fn test_bool_casts() {
        assert_eq!(true.cast::<f64>(), 1.0);
        assert_eq!(false.cast::<i16>(), 0);
        assert!(7u8.cast::<bool>());
        assert!(!0.0f32.cast::<bool>());
        assert!(Complex::new(0.0f64, 1.0).cast::<bool>());
    }

    #[test]
    fn test_complex_casts() {
        let c = Complex::new(1.5f64, -2.0);
        assert_eq!(c.cast::<f32>(), 1.5);
        assert_eq!(c.cast::<Complex<f32>>(), Complex::new(1.5f32, -2.0));
        assert_eq!(3i8.cast::<Complex<f64>>(), Complex::new(3.0, 0.0));
    }

    #[test]
    fn test_le_encoding() {
        assert_eq!(0x0102i16.to_le_array(), [0x02, 0x01]);
        assert_eq!(i16::from_le_slice(&[0x02, 0x01]), Ok(0x0102));
        assert_eq!(i32::from_le_slice(&[1, 2]), Err(ArrayError::InsufficientBuffer));

        let c = Complex::new(1.0f32, 2.0);
        let bytes = c.to_le_array();
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &2.0f32.to_le_bytes());
        assert_eq!(Complex::<f32>::from_le_slice(&bytes), Ok(c));

        assert_eq!(bool::from_le_slice(&[2]), Ok(true));
    }

    #[test]
    fn test_decode_into() {
        let mut out = [0u16; 3];
        decode_into(&[1, 0, 2, 0, 3, 0], &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(
            decode_into(&[1, 0, 2], &mut out),
            Err(ArrayError::InsufficientBuffer)
        );
    }

    #[test]
    fn test_cast_into_length_mismatch() {
        let mut dst = [0.0f64; 2];
        assert_eq!(cast_into(&[1i32, 2, 3], &mut dst), Err(ArrayError::ShapeMismatch));
    }
}
