//! arrayfile - Typed Multi-dimensional Array Serialization
//!
//! This library stores homogeneous sequences of dense typed arrays in a
//! compact binary format, in a hierarchical container of named datasets, or
//! in any format provided by a pluggable codec.
//!
//! ## Architecture
//!
//! arrayfile separates format definitions from their implementation:
//!
//! - **arrayfile-core**: Element types, shapes, the binary header, casts and
//!   validation (no I/O)
//! - **arrayfile**: Arrays and arraysets, file I/O, codecs and the registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arrayfile::{Array, ArrayShape, BinFile, CodecRegistry, ElementType, OpenMode};
//!
//! fn example() -> arrayfile::Result<()> {
//!     let shape = ArrayShape::new(&[2, 3])?;
//!     let mut file = BinFile::create("samples.bin")?;
//!     file.write(&Array::from_row_major(shape, vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0])?)?;
//!     file.close()?;
//!
//!     let mut file = BinFile::open("samples.bin", OpenMode::In)?;
//!     let as_ints = file.read_cast(ElementType::Int32)?;
//!     println!("{:?}", as_ints.to_row_major::<i32>()?);
//!
//!     // Format chosen by file extension
//!     let set = CodecRegistry::global().load("samples.bin")?;
//!     CodecRegistry::global().save("samples.haf", &set)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Binary array files**: Sequential and random access with cast-on-read
//! - **Memory-mapped I/O**: Zero-copy typed views of finished files
//! - **Hierarchical containers**: Named datasets with gzip compression
//! - **Codec registry**: Format-agnostic load/save by file extension

// Re-export core abstractions and format definitions
pub use arrayfile_core::{
    // Element model
    ArrayElement, ArrayShape, ElementType, Scalar,
    // Format definitions
    BinFileHeader, BinSlice, PayloadSource,
    // Error handling
    ArrayError,
    // Parsing utilities
    file_extension, parse_shape,
    Complex32, Complex64,
};

pub mod array;
pub mod arrayset;
pub mod binfile;
pub mod codec;
pub mod config;
pub mod error;
pub mod hierarchical;
pub mod registry;

pub use array::{Array, ArrayData, DataElement};
pub use arrayset::Arrayset;
pub use binfile::{BinFile, OpenMode};
pub use codec::{ArraysetCodec, ArraysetInfo, BinaryCodec, HierarchicalCodec};
pub use config::IoConfig;
pub use error::{Error, Result};
pub use hierarchical::{AccessMode, DatasetDescription, DatasetDescriptor, HierarchicalFile};
pub use registry::CodecRegistry;

#[cfg(feature = "mmap")]
pub use binfile::MappedBinFile;
