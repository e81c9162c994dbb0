//! Binary array files
//!
//! A binary array file is a 64-byte header followed by raw little-endian
//! payloads, one per array, all of the same element type and shape.
//! [`BinFile`] streams arrays in and out; [`MappedBinFile`] gives zero-copy
//! random access to a finished file.

#[cfg(feature = "mmap")]
mod mapped;
mod stream;

#[cfg(feature = "mmap")]
pub use mapped::MappedBinFile;
pub use stream::{BinFile, OpenMode};
