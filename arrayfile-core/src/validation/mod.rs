//! Format validation utilities
//!
//! This module contains pure validation functions with no I/O dependencies.
//! All functions are checks on data layout, names and format constraints.

pub mod bounds;
pub mod format;
pub mod parsing;

pub use bounds::{cast_payload, checked_byte_size, validate_array_bounds};
pub use format::{is_valid_compression, validate_magic_bytes};
pub use parsing::{file_extension, parse_shape, validate_path_segment};
