//! Error types for array file format operations

/// Errors that can occur while describing, encoding or decoding typed arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayError {
    /// Header accessed before any array was written or parsed
    UninitializedHeader,
    /// Array shape differs from the established header shape
    ShapeMismatch,
    /// Element type differs from the established header type
    TypeMismatch,
    /// Read past the last stored array
    EndOfFile,
    /// Invalid header format
    InvalidHeader,
    /// Unsupported format version
    UnsupportedVersion,
    /// Element type tag not recognized
    UnknownElementType,
    /// Dimensionality outside the supported range
    InvalidDimensions,
    /// Zero extent along some dimension
    InvalidExtent,
    /// Index out of bounds
    IndexOutOfBounds,
    /// Size computation would overflow
    ArraySizeOverflow,
    /// Byte buffer length or alignment unsuitable for the element type
    ArrayAlignment,
    /// Insufficient buffer space
    InsufficientBuffer,
    /// Shape string could not be parsed
    InvalidShapeString,
    /// Element type name not recognized
    UnknownElementTypeName,
    /// Container path segment is empty or contains control characters
    InvalidPath,
}

impl core::fmt::Display for ArrayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ArrayError::UninitializedHeader => "Header has not been initialized",
            ArrayError::ShapeMismatch => "Array shape does not match",
            ArrayError::TypeMismatch => "Element type does not match",
            ArrayError::EndOfFile => "End of the binary file has been reached",
            ArrayError::InvalidHeader => "Invalid array file header",
            ArrayError::UnsupportedVersion => "Unsupported format version",
            ArrayError::UnknownElementType => "Unknown element type tag",
            ArrayError::InvalidDimensions => "Number of dimensions must be between 1 and 4",
            ArrayError::InvalidExtent => "Array extents must be positive",
            ArrayError::IndexOutOfBounds => "Index out of bounds",
            ArrayError::ArraySizeOverflow => "Array size calculation would overflow",
            ArrayError::ArrayAlignment => "Buffer not aligned to element size",
            ArrayError::InsufficientBuffer => "Insufficient buffer space",
            ArrayError::InvalidShapeString => "Invalid shape string",
            ArrayError::UnknownElementTypeName => "Unknown element type name",
            ArrayError::InvalidPath => "Invalid container path",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for ArrayError {}

/// Result type for array format operations
pub type Result<T> = core::result::Result<T, ArrayError>;
