//! Dense typed arrays
//!
//! An [`Array`] holds a shape and one contiguous vector of elements of a
//! single element type. Elements are kept in column-major order (the first
//! index varies fastest), the same order used on disk, so payloads move
//! between memory and files without reordering.

use crate::{Error, Result};
use arrayfile_core::{
    decode_into, encode_slice, ArrayElement, ArrayError, ArrayShape, ElementType, Scalar,
};
use num_complex::{Complex32, Complex64};

/// Element storage for any supported element type
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex32>),
    Complex128(Vec<Complex64>),
}

/// Run `$body` with `$v` bound to the typed vector inside an `ArrayData`
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            $crate::array::ArrayData::Bool($v) => $body,
            $crate::array::ArrayData::Int8($v) => $body,
            $crate::array::ArrayData::Int16($v) => $body,
            $crate::array::ArrayData::Int32($v) => $body,
            $crate::array::ArrayData::Int64($v) => $body,
            $crate::array::ArrayData::UInt8($v) => $body,
            $crate::array::ArrayData::UInt16($v) => $body,
            $crate::array::ArrayData::UInt32($v) => $body,
            $crate::array::ArrayData::UInt64($v) => $body,
            $crate::array::ArrayData::Float32($v) => $body,
            $crate::array::ArrayData::Float64($v) => $body,
            $crate::array::ArrayData::Complex64($v) => $body,
            $crate::array::ArrayData::Complex128($v) => $body,
        }
    };
}

pub(crate) use with_data;

/// Element types that can be held in [`ArrayData`]
pub trait DataElement: ArrayElement {
    /// Wrap a vector in the matching variant
    fn wrap(values: Vec<Self>) -> ArrayData;

    /// Borrow the vector if `data` holds this element type
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Mutably borrow the vector if `data` holds this element type
    fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]>;

    /// Take the vector if `data` holds this element type
    fn unwrap_vec(data: ArrayData) -> std::result::Result<Vec<Self>, ArrayData>;
}

macro_rules! impl_data_element {
    ($t:ty, $variant:ident) => {
        impl DataElement for $t {
            fn wrap(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn unwrap_vec(data: ArrayData) -> std::result::Result<Vec<Self>, ArrayData> {
                match data {
                    ArrayData::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

impl_data_element!(bool, Bool);
impl_data_element!(i8, Int8);
impl_data_element!(i16, Int16);
impl_data_element!(i32, Int32);
impl_data_element!(i64, Int64);
impl_data_element!(u8, UInt8);
impl_data_element!(u16, UInt16);
impl_data_element!(u32, UInt32);
impl_data_element!(u64, UInt64);
impl_data_element!(f32, Float32);
impl_data_element!(f64, Float64);
impl_data_element!(Complex32, Complex64);
impl_data_element!(Complex64, Complex128);

impl ArrayData {
    /// Zero-filled storage of `len` elements
    pub fn zeros(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Bool => ArrayData::Bool(vec![false; len]),
            ElementType::Int8 => ArrayData::Int8(vec![0; len]),
            ElementType::Int16 => ArrayData::Int16(vec![0; len]),
            ElementType::Int32 => ArrayData::Int32(vec![0; len]),
            ElementType::Int64 => ArrayData::Int64(vec![0; len]),
            ElementType::UInt8 => ArrayData::UInt8(vec![0; len]),
            ElementType::UInt16 => ArrayData::UInt16(vec![0; len]),
            ElementType::UInt32 => ArrayData::UInt32(vec![0; len]),
            ElementType::UInt64 => ArrayData::UInt64(vec![0; len]),
            ElementType::Float32 => ArrayData::Float32(vec![0.0; len]),
            ElementType::Float64 => ArrayData::Float64(vec![0.0; len]),
            ElementType::Complex64 => ArrayData::Complex64(vec![Complex32::default(); len]),
            ElementType::Complex128 => ArrayData::Complex128(vec![Complex64::default(); len]),
        }
    }

    /// Element type of the stored values
    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayData::Bool(_) => ElementType::Bool,
            ArrayData::Int8(_) => ElementType::Int8,
            ArrayData::Int16(_) => ElementType::Int16,
            ArrayData::Int32(_) => ElementType::Int32,
            ArrayData::Int64(_) => ElementType::Int64,
            ArrayData::UInt8(_) => ElementType::UInt8,
            ArrayData::UInt16(_) => ElementType::UInt16,
            ArrayData::UInt32(_) => ElementType::UInt32,
            ArrayData::UInt64(_) => ElementType::UInt64,
            ArrayData::Float32(_) => ElementType::Float32,
            ArrayData::Float64(_) => ElementType::Float64,
            ArrayData::Complex64(_) => ElementType::Complex64,
            ArrayData::Complex128(_) => ElementType::Complex128,
        }
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    /// Whether no elements are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at a linear storage offset
    pub fn get(&self, offset: usize) -> Option<Scalar> {
        with_data!(self, v => v.get(offset).map(|&x| x.into_scalar()))
    }

    /// Cast every element into a typed destination slice
    pub fn cast_into<D: ArrayElement>(&self, dst: &mut [D]) -> Result<()> {
        with_data!(self, v => arrayfile_core::cast_into(v, dst))?;
        Ok(())
    }

    /// Copy of the storage converted to another element type
    pub fn cast(&self, to: ElementType) -> ArrayData {
        if to == self.element_type() {
            return self.clone();
        }
        with_data!(self, v => cast_vec(v, to))
    }

    /// Append the little-endian encoding of every element
    pub fn encode_le(&self, out: &mut Vec<u8>) {
        with_data!(self, v => encode_slice(v, out))
    }

    /// Overwrite the storage from a little-endian payload of the same type
    pub fn decode_le(&mut self, bytes: &[u8]) -> Result<()> {
        with_data!(self, v => decode_into(bytes, v))?;
        Ok(())
    }
}

fn cast_vec<S: ArrayElement>(src: &[S], to: ElementType) -> ArrayData {
    match to {
        ElementType::Bool => ArrayData::Bool(arrayfile_core::cast_slice(src)),
        ElementType::Int8 => ArrayData::Int8(arrayfile_core::cast_slice(src)),
        ElementType::Int16 => ArrayData::Int16(arrayfile_core::cast_slice(src)),
        ElementType::Int32 => ArrayData::Int32(arrayfile_core::cast_slice(src)),
        ElementType::Int64 => ArrayData::Int64(arrayfile_core::cast_slice(src)),
        ElementType::UInt8 => ArrayData::UInt8(arrayfile_core::cast_slice(src)),
        ElementType::UInt16 => ArrayData::UInt16(arrayfile_core::cast_slice(src)),
        ElementType::UInt32 => ArrayData::UInt32(arrayfile_core::cast_slice(src)),
        ElementType::UInt64 => ArrayData::UInt64(arrayfile_core::cast_slice(src)),
        ElementType::Float32 => ArrayData::Float32(arrayfile_core::cast_slice(src)),
        ElementType::Float64 => ArrayData::Float64(arrayfile_core::cast_slice(src)),
        ElementType::Complex64 => ArrayData::Complex64(arrayfile_core::cast_slice(src)),
        ElementType::Complex128 => ArrayData::Complex128(arrayfile_core::cast_slice(src)),
    }
}

/// Dense multi-dimensional array of one element type
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: ArrayShape,
    data: ArrayData,
}

impl Array {
    /// Create an array from column-major elements
    pub fn new<T: DataElement>(shape: ArrayShape, data: Vec<T>) -> Result<Self> {
        Self::from_data(shape, T::wrap(data))
    }

    /// Create an array from storage of any element type
    pub fn from_data(shape: ArrayShape, data: ArrayData) -> Result<Self> {
        if data.len() != shape.n_elements() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        Ok(Self { shape, data })
    }

    /// Create an array from row-major elements (last index fastest)
    pub fn from_row_major<T: DataElement>(shape: ArrayShape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.n_elements() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        let reordered = reorder(&shape, &data, |shape, index| shape.row_major_offset(index))?;
        Self::new(shape, reordered)
    }

    /// One-dimensional array
    pub fn from_vec<T: DataElement>(data: Vec<T>) -> Result<Self> {
        let shape = ArrayShape::vector(data.len())?;
        Self::new(shape, data)
    }

    /// Single-value array of shape `[1]`
    pub fn scalar<T: DataElement>(value: T) -> Self {
        Self {
            shape: ArrayShape::scalar(),
            data: T::wrap(vec![value]),
        }
    }

    /// Zero-filled array
    pub fn zeros(element_type: ElementType, shape: ArrayShape) -> Self {
        Self {
            shape,
            data: ArrayData::zeros(element_type, shape.n_elements()),
        }
    }

    /// Element type
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Shape
    pub fn shape(&self) -> &ArrayShape {
        &self.shape
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements (never true for a valid shape)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Underlying storage
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Mutable storage; callers must keep the element count
    pub(crate) fn data_mut(&mut self) -> &mut ArrayData {
        &mut self.data
    }

    /// Consume the array and return its storage
    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Column-major elements, if the array holds `T`
    pub fn as_slice<T: DataElement>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Mutable column-major elements, if the array holds `T`
    pub fn as_mut_slice<T: DataElement>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(&mut self.data)
    }

    /// Column-major elements as an owned vector; the type must match exactly
    pub fn to_vec<T: DataElement>(&self) -> Result<Vec<T>> {
        self.as_slice::<T>()
            .map(<[T]>::to_vec)
            .ok_or(Error::Format(ArrayError::TypeMismatch))
    }

    /// Consume the array and return its column-major elements
    pub fn into_vec<T: DataElement>(self) -> Result<Vec<T>> {
        T::unwrap_vec(self.data).map_err(|_| Error::Format(ArrayError::TypeMismatch))
    }

    /// Elements in row-major order; the type must match exactly
    pub fn to_row_major<T: DataElement>(&self) -> Result<Vec<T>> {
        let data = self
            .as_slice::<T>()
            .ok_or(Error::Format(ArrayError::TypeMismatch))?;
        // Inverse permutation of `from_row_major`
        let mut out = vec![T::default(); data.len()];
        for (offset, &value) in data.iter().enumerate() {
            let index = self
                .shape
                .unravel_col_major(offset)
                .ok_or(ArrayError::IndexOutOfBounds)?;
            let target = self
                .shape
                .row_major_offset(&index[..self.shape.ndim()])
                .ok_or(ArrayError::IndexOutOfBounds)?;
            out[target] = value;
        }
        Ok(out)
    }

    /// Element at a multi-index
    pub fn get(&self, index: &[usize]) -> Option<Scalar> {
        let offset = self.shape.col_major_offset(index)?;
        self.data.get(offset)
    }

    /// Value-preserving conversion to another element type
    pub fn cast(&self, to: ElementType) -> Array {
        Array {
            shape: self.shape,
            data: self.data.cast(to),
        }
    }

    /// Overwrite this array with the values of `src`, casting as needed
    ///
    /// Shapes must match.
    pub fn assign_cast(&mut self, src: &Array) -> Result<()> {
        if self.shape != src.shape {
            return Err(ArrayError::ShapeMismatch.into());
        }
        with_data!(&mut self.data, dst => src.data.cast_into(dst))
    }

    /// Little-endian column-major payload
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.element_type().size_bytes());
        self.data.encode_le(&mut out);
        out
    }

    /// Decode an array from a little-endian column-major payload
    pub fn from_le_bytes(element_type: ElementType, shape: ArrayShape, bytes: &[u8]) -> Result<Self> {
        let mut array = Self::zeros(element_type, shape);
        array.data.decode_le(bytes)?;
        Ok(array)
    }
}

fn reorder<T: Copy>(
    shape: &ArrayShape,
    src: &[T],
    source_offset: impl Fn(&ArrayShape, &[usize]) -> Option<usize>,
) -> Result<Vec<T>> {
    (0..src.len())
        .map(|offset| {
            let index = shape
                .unravel_col_major(offset)
                .ok_or(ArrayError::IndexOutOfBounds)?;
            let from = source_offset(shape, &index[..shape.ndim()])
                .ok_or(ArrayError::IndexOutOfBounds)?;
            Ok(src[from])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(extents: &[usize]) -> ArrayShape {
        ArrayShape::new(extents).unwrap()
    }

    #[test]
    fn test_row_major_roundtrip() {
        let array =
            Array::from_row_major(shape(&[2, 3]), vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        // Column-major storage walks down the first axis first
        assert_eq!(array.as_slice::<f64>().unwrap(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(array.get(&[1, 2]), Some(Scalar::Float64(6.0)));
        assert_eq!(array.get(&[0, 1]), Some(Scalar::Float64(2.0)));
        assert_eq!(
            array.to_row_major::<f64>().unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_length_must_match_shape() {
        let err = Array::new(shape(&[2, 2]), vec![1u8, 2, 3]).unwrap_err();
        assert_eq!(err.format_kind(), Some(ArrayError::ShapeMismatch));
    }

    #[test]
    fn test_typed_access() {
        let array = Array::from_vec(vec![1i32, 2, 3]).unwrap();
        assert!(array.as_slice::<i64>().is_none());
        assert_eq!(
            array.to_vec::<f32>().unwrap_err().format_kind(),
            Some(ArrayError::TypeMismatch)
        );
        assert_eq!(array.into_vec::<i32>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_cast() {
        let array = Array::from_vec(vec![0.0f32, 1.5, -2.5]).unwrap();
        let ints = array.cast(ElementType::Int16);
        assert_eq!(ints.as_slice::<i16>().unwrap(), &[0, 1, -2]);
        let flags = array.cast(ElementType::Bool);
        assert_eq!(flags.as_slice::<bool>().unwrap(), &[false, true, true]);
        let complex = array.cast(ElementType::Complex128);
        assert_eq!(complex.as_slice::<Complex64>().unwrap()[1], Complex64::new(1.5, 0.0));
    }

    #[test]
    fn test_assign_cast() {
        let src = Array::from_vec(vec![1u8, 2, 3]).unwrap();
        let mut dst = Array::zeros(ElementType::Float64, *src.shape());
        dst.assign_cast(&src).unwrap();
        assert_eq!(dst.as_slice::<f64>().unwrap(), &[1.0, 2.0, 3.0]);

        let mut wrong = Array::zeros(ElementType::Float64, shape(&[4]));
        assert!(wrong.assign_cast(&src).is_err());
    }

    #[test]
    fn test_le_bytes() {
        let array = Array::from_vec(vec![Complex32::new(1.0, -1.0)]).unwrap();
        let bytes = array.to_le_bytes();
        assert_eq!(bytes.len(), 8);
        let back = Array::from_le_bytes(ElementType::Complex64, *array.shape(), &bytes).unwrap();
        assert_eq!(back, array);

        assert!(Array::from_le_bytes(ElementType::Int32, shape(&[2]), &bytes[..4]).is_err());
    }
}
