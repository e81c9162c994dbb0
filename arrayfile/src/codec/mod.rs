//! Pluggable arrayset codecs
//!
//! A codec knows how to store an [`Arrayset`] in one on-disk format and how
//! to read it back. Codecs are registered in a
//! [`CodecRegistry`](crate::CodecRegistry) under a unique name and one or
//! more file extensions.

mod binary;
mod hierarchical;

pub use binary::BinaryCodec;
pub use hierarchical::HierarchicalCodec;

use crate::{Array, Arrayset, Result};
use arrayfile_core::{ArrayError, ArrayShape, ElementType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of a stored arrayset, available without loading any payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraysetInfo {
    pub element_type: ElementType,
    pub shape: ArrayShape,
    pub n_samples: usize,
}

/// Encoder/decoder for one arrayset storage format
pub trait ArraysetCodec: Send + Sync {
    /// Unique codec name, e.g. `"arrayfile.binary"`
    fn name(&self) -> &str;

    /// File extensions claimed by the codec, each with a leading dot
    fn extensions(&self) -> &[String];

    /// Write `set` to `path`, replacing any previous contents
    fn encode(&self, set: &Arrayset, path: &Path) -> Result<()>;

    /// Read the complete arrayset stored at `path`
    fn decode(&self, path: &Path) -> Result<Arrayset>;

    /// Element type, shape and sample count of the arrayset at `path`
    fn peek(&self, path: &Path) -> Result<ArraysetInfo>;

    /// Read the array at zero-based `index`
    fn decode_array(&self, path: &Path, index: usize) -> Result<Array> {
        let set = self.decode(path)?;
        let array = set.arrays().nth(index).cloned();
        array.ok_or(ArrayError::EndOfFile.into())
    }

    /// Add one array to the arrayset stored at `path`
    fn append(&self, path: &Path, array: &Array) -> Result<()> {
        let mut set = if path.exists() {
            self.decode(path)?
        } else {
            Arrayset::new(array.element_type(), *array.shape())
        };
        set.add(array.clone())?;
        self.encode(&set, path)
    }
}

impl std::fmt::Debug for dyn ArraysetCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraysetCodec")
            .field("name", &self.name())
            .field("extensions", &self.extensions())
            .finish()
    }
}

/// Normalize an extension so that it starts with a single dot
pub(crate) fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim_start_matches('.');
    format!(".{trimmed}")
}
