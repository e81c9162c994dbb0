#![no_std]

//! arrayfile core - Typed Array File Format Definitions
//!
//! This crate provides the format definitions, element traits and pure
//! validation helpers shared by the array file implementations. It performs
//! no I/O.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod scalar;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use scalar::Scalar;
pub use traits::*;
pub use validation::{file_extension, is_valid_compression, parse_shape};

pub use num_complex::{Complex32, Complex64};
