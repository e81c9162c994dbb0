//! Hierarchical containers of named datasets
//!
//! [`HierarchicalFile`] stores any number of datasets under POSIX-like paths
//! in a single file, with per-dataset gzip compression.

mod descriptor;
mod file;
mod path;

pub use descriptor::{DatasetDescription, DatasetDescriptor};
pub use file::{AccessMode, HierarchicalFile};
pub use path::resolve;
