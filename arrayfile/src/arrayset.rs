//! Homogeneous collections of arrays

use crate::{Array, Result};
use arrayfile_core::{ArrayError, ArrayShape, ElementType};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Ordered set of arrays that share one element type and one shape
///
/// Arrays are keyed by 1-based ids. [`Arrayset::add`] assigns the next id
/// after the largest one in use.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrayset {
    element_type: ElementType,
    shape: ArrayShape,
    arrays: BTreeMap<usize, Array>,
}

impl Arrayset {
    /// Empty set for arrays of the given type and shape
    pub fn new(element_type: ElementType, shape: ArrayShape) -> Self {
        Self {
            element_type,
            shape,
            arrays: BTreeMap::new(),
        }
    }

    /// Build a set from arrays, taking type and shape from the first one
    ///
    /// Returns `None` when `arrays` is empty.
    pub fn from_arrays<I>(arrays: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = Array>,
    {
        let mut iter = arrays.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        let mut set = Self::new(first.element_type(), *first.shape());
        set.add(first)?;
        for array in iter {
            set.add(array)?;
        }
        Ok(Some(set))
    }

    /// Element type shared by every array
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Shape shared by every array
    pub fn shape(&self) -> &ArrayShape {
        &self.shape
    }

    /// Number of arrays
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the set holds no arrays
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Add an array under the next free id and return that id
    pub fn add(&mut self, array: Array) -> Result<usize> {
        let id = match self.arrays.keys().next_back() {
            Some(last) => last.checked_add(1).ok_or(ArrayError::IndexOutOfBounds)?,
            None => 1,
        };
        self.add_with_id(id, array)?;
        Ok(id)
    }

    /// Add or replace the array stored under `id`
    ///
    /// Id 0 is reserved and rejected with `IndexOutOfBounds`.
    pub fn add_with_id(&mut self, id: usize, array: Array) -> Result<Option<Array>> {
        if id == 0 {
            return Err(ArrayError::IndexOutOfBounds.into());
        }
        self.check(&array)?;
        Ok(self.arrays.insert(id, array))
    }

    /// Array stored under `id`
    pub fn get(&self, id: usize) -> Option<&Array> {
        self.arrays.get(&id)
    }

    /// Remove and return the array stored under `id`
    pub fn remove(&mut self, id: usize) -> Option<Array> {
        self.arrays.remove(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.arrays.keys().copied()
    }

    /// `(id, array)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Array)> + '_ {
        self.arrays.iter().map(|(&id, array)| (id, array))
    }

    /// Arrays in ascending id order
    pub fn arrays(&self) -> impl Iterator<Item = &Array> + '_ {
        self.arrays.values()
    }

    /// Copy of the set with every array cast to `to`, ids preserved
    pub fn cast(&self, to: ElementType) -> Arrayset {
        let arrays = self
            .arrays
            .par_iter()
            .map(|(&id, array)| (id, array.cast(to)))
            .collect::<Vec<_>>();
        Arrayset {
            element_type: to,
            shape: self.shape,
            arrays: arrays.into_iter().collect(),
        }
    }

    fn check(&self, array: &Array) -> Result<()> {
        if array.element_type() != self.element_type {
            return Err(ArrayError::TypeMismatch.into());
        }
        if *array.shape() != self.shape {
            return Err(ArrayError::ShapeMismatch.into());
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Arrayset {
    type Item = (&'a usize, &'a Array);
    type IntoIter = std::collections::btree_map::Iter<'a, usize, Array>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.iter()
    }
}
