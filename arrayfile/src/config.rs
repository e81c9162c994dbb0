//! I/O configuration shared by files and codecs

use crate::{Error, Result};
use arrayfile_core::is_valid_compression;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for buffered file I/O and default compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Capacity of the read/write buffers in bytes
    pub buffer_capacity: usize,
    /// Rewrite the sample count in the header after every write
    pub sync_header_on_write: bool,
    /// Compression level used by the hierarchical codec (0 = off)
    pub default_compression: u8,
}

impl IoConfig {
    /// Set the read/write buffer capacity
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity.max(1);
        self
    }

    /// Keep the on-disk sample count current after every write
    pub fn with_header_sync(mut self, sync: bool) -> Self {
        self.sync_header_on_write = sync;
        self
    }

    /// Set the default compression level, which must lie in `0..=9`
    pub fn with_default_compression(mut self, level: u8) -> Result<Self> {
        if !is_valid_compression(level) {
            return Err(Error::InvalidCompression(level));
        }
        self.default_compression = level;
        Ok(self)
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(Error::io("reading config file"))?;
        Self::from_json_str(&text)
    }

    fn validate(self) -> Result<Self> {
        if !is_valid_compression(self.default_compression) {
            return Err(Error::InvalidCompression(self.default_compression));
        }
        if self.buffer_capacity == 0 {
            return Err(Error::External("buffer_capacity must be positive".into()));
        }
        Ok(self)
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 64 * 1024,
            sync_header_on_write: false,
            default_compression: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = IoConfig::default()
            .with_buffer_capacity(4096)
            .with_header_sync(true)
            .with_default_compression(6)
            .unwrap();
        assert_eq!(config.buffer_capacity, 4096);
        assert!(config.sync_header_on_write);
        assert_eq!(config.default_compression, 6);

        assert!(matches!(
            IoConfig::default().with_default_compression(10),
            Err(Error::InvalidCompression(10))
        ));
    }

    #[test]
    fn test_json_defaults() {
        let config = IoConfig::from_json_str(r#"{ "sync_header_on_write": true }"#).unwrap();
        assert_eq!(config.buffer_capacity, 64 * 1024);
        assert!(config.sync_header_on_write);

        assert!(IoConfig::from_json_str(r#"{ "default_compression": 12 }"#).is_err());
        assert!(IoConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("io.json");
        std::fs::write(&path, r#"{ "buffer_capacity": 512, "default_compression": 3 }"#).unwrap();
        let config = IoConfig::from_json_file(&path).unwrap();
        assert_eq!(config.buffer_capacity, 512);
        assert_eq!(config.default_compression, 3);

        assert!(matches!(
            IoConfig::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }
}
