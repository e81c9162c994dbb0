//! Dataset descriptions and the on-disk index

use crate::Result;
use arrayfile_core::{ArrayError, ArrayShape, ElementType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One way of reading a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub element_type: ElementType,
    pub shape: ArrayShape,
    /// Number of objects readable with this shape
    pub count: usize,
    /// Whether more objects can be appended
    pub expandable: bool,
}

/// Every way a dataset can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescription {
    /// Object-by-object readout
    pub object: DatasetDescriptor,
    /// Single readout of the whole dataset, if it fits in four dimensions
    pub readout: Option<DatasetDescriptor>,
}

impl DatasetDescription {
    /// Descriptors in order, object readout first
    pub fn descriptors(&self) -> Vec<DatasetDescriptor> {
        std::iter::once(self.object).chain(self.readout).collect()
    }
}

/// Location of one stored object blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ObjectRef {
    pub offset: u64,
    pub len: u64,
}

impl ObjectRef {
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.len)
    }
}

/// Index record of one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DatasetEntry {
    pub element_type: ElementType,
    pub shape: ArrayShape,
    pub expandable: bool,
    pub compression: u8,
    pub objects: Vec<ObjectRef>,
}

impl DatasetEntry {
    pub fn new(element_type: ElementType, shape: ArrayShape, expandable: bool, compression: u8) -> Self {
        Self {
            element_type,
            shape,
            expandable,
            compression,
            objects: Vec::new(),
        }
    }

    pub fn check(&self, element_type: ElementType, shape: &ArrayShape) -> Result<()> {
        if self.element_type != element_type {
            return Err(ArrayError::TypeMismatch.into());
        }
        if self.shape != *shape {
            return Err(ArrayError::ShapeMismatch.into());
        }
        Ok(())
    }

    /// Shape of the whole-dataset readout
    ///
    /// Single-value objects read out as a vector of `count` values; other
    /// shapes gain a leading dimension of `count`.
    pub fn readout_shape(&self) -> Option<ArrayShape> {
        let count = self.objects.len();
        if count == 0 {
            return None;
        }
        if self.shape == ArrayShape::scalar() {
            return ArrayShape::vector(count).ok();
        }
        self.shape.with_leading(count).ok()
    }

    pub fn describe(&self) -> DatasetDescription {
        let object = DatasetDescriptor {
            element_type: self.element_type,
            shape: self.shape,
            count: self.objects.len(),
            expandable: self.expandable,
        };
        let readout = self.readout_shape().map(|shape| DatasetDescriptor {
            element_type: self.element_type,
            shape,
            count: 1,
            expandable: false,
        });
        DatasetDescription { object, readout }
    }
}

/// Serialized table of contents stored at the tail of the container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Index {
    pub datasets: BTreeMap<String, DatasetEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(shape: &[usize], count: usize) -> DatasetEntry {
        let mut entry = DatasetEntry::new(
            ElementType::Float32,
            ArrayShape::new(shape).unwrap(),
            true,
            0,
        );
        entry.objects = vec![ObjectRef { offset: 24, len: 4 }; count];
        entry
    }

    #[test]
    fn test_readout_shapes() {
        assert_eq!(entry(&[1], 5).readout_shape().unwrap().dims(), &[5]);
        assert_eq!(entry(&[2, 3], 4).readout_shape().unwrap().dims(), &[4, 2, 3]);
        assert!(entry(&[2, 2, 2, 2], 3).readout_shape().is_none());
        assert!(entry(&[2], 0).readout_shape().is_none());
    }

    #[test]
    fn test_describe() {
        let description = entry(&[2, 3], 2).describe();
        assert_eq!(description.object.count, 2);
        assert!(description.object.expandable);
        let readout = description.readout.unwrap();
        assert_eq!(readout.count, 1);
        assert!(!readout.expandable);
        assert_eq!(description.descriptors().len(), 2);

        let four_d = entry(&[1, 2, 3, 4], 1).describe();
        assert_eq!(four_d.descriptors().len(), 1);
    }

    #[test]
    fn test_index_json() {
        let mut index = Index::default();
        index.datasets.insert("/a".into(), entry(&[3], 1));
        let json = serde_json::to_string(&index).unwrap();
        let back: Index = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }
}
