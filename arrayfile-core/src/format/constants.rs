//! Format constants and magic bytes for array files

/// Maximum number of dimensions of a stored array
pub const MAX_DIMENSIONS: usize = 4;

/// Payload alignment guaranteed by the header size
pub const PAYLOAD_ALIGNMENT: usize = 8;

/// Binary array file constants
pub mod binfile {
    /// Magic bytes for binary array files
    pub const MAGIC: [u8; 4] = *b"ABIN";

    /// Current binary array file version
    pub const VERSION: u8 = 1;

    /// Fixed size of the binary array file header
    pub const HEADER_SIZE: usize = 64;

    /// Byte offset of the sample counter inside the header
    pub const SAMPLE_COUNT_OFFSET: usize = 40;

    /// Conventional file extension
    pub const EXTENSION: &str = ".bin";
}

/// Hierarchical container constants
pub mod hierarchical {
    /// Magic bytes for hierarchical array files
    pub const MAGIC: [u8; 4] = *b"AHAF";

    /// Current hierarchical format version
    pub const VERSION: u8 = 1;

    /// Fixed size of the superblock
    pub const SUPERBLOCK_SIZE: usize = 24;

    /// Highest accepted compression level
    pub const MAX_COMPRESSION: u8 = 9;
}
