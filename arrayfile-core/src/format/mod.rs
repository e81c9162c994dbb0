//! Binary format definitions for typed array files
//!
//! This module contains pure data structure definitions for the wire format.
//! No I/O operations, only layout definitions.

pub mod constants;
pub mod element_type;
pub mod header;
pub mod shape;

pub use element_type::ElementType;
pub use header::BinFileHeader;
pub use shape::ArrayShape;
