//! Error type for array file I/O, codecs and the codec registry

use arrayfile_core::ArrayError;
use thiserror::Error;

/// Errors raised by the I/O layer
#[derive(Debug, Error)]
pub enum Error {
    /// Format-level failure (type/shape mismatch, end of file, bad header...)
    #[error(transparent)]
    Format(#[from] ArrayError),

    /// Underlying stream operation failed
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Operation attempted on a closed file
    #[error("file has been closed")]
    Closed,

    /// Operation not permitted in the mode the file was opened with
    #[error("operation not permitted: file opened in {0} mode")]
    InvalidMode(&'static str),

    /// A codec name or extension is already taken
    #[error("name already registered: {0}")]
    NameAlreadyRegistered(String),

    /// No codec registered under this name
    #[error("codec not found: {0}")]
    CodecNotFound(String),

    /// No codec claims this file extension
    #[error("extension not registered: '{0}'")]
    ExtensionNotRegistered(String),

    /// No dataset at this container path
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A dataset already exists at this container path
    #[error("path already exists: {0}")]
    PathExists(String),

    /// Compression level outside 0..=9
    #[error("invalid compression level {0}, expected 0..=9")]
    InvalidCompression(u8),

    /// File contents contradict their own metadata
    #[error("corrupted file: {0}")]
    Corrupted(String),

    /// Failure reported by an external collaborator (index codec, compressor, ...)
    #[error("external library error: {0}")]
    External(String),
}

impl Error {
    /// Wrap an I/O error with a short description of the failed step
    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Error::Io { context, source }
    }

    /// Format-level error kind, if this is one
    pub fn format_kind(&self) -> Option<ArrayError> {
        match self {
            Error::Format(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::External(e.to_string())
    }
}

/// Result type for I/O operations
pub type Result<T> = std::result::Result<T, Error>;
