//! Abstract interfaces for typed array storage
//!
//! This module defines the trait abstractions shared by the array backends.

pub mod backend;
pub mod element;

pub use backend::{BinSlice, PayloadSource};
pub use element::{cast_into, decode_into, ArrayElement};
#[cfg(feature = "alloc")]
pub use element::{cast_slice, encode_slice};
