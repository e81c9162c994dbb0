use super::{ArraysetCodec, ArraysetInfo};
use crate::{Array, Arrayset, BinFile, IoConfig, OpenMode, Result};
use arrayfile_core::format::constants::binfile::EXTENSION;
use std::path::Path;

/// Codec storing arraysets as binary array files
#[derive(Debug, Clone)]
pub struct BinaryCodec {
    config: IoConfig,
    extensions: Vec<String>,
}

impl BinaryCodec {
    /// Registered codec name
    pub const NAME: &'static str = "arrayfile.binary";

    pub fn new(config: IoConfig) -> Self {
        Self {
            config,
            extensions: vec![EXTENSION.to_string()],
        }
    }

    fn open(&self, path: &Path, mode: OpenMode) -> Result<BinFile> {
        BinFile::open_with_config(path, mode, self.config)
    }
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::new(IoConfig::default())
    }
}

impl ArraysetCodec for BinaryCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn encode(&self, set: &Arrayset, path: &Path) -> Result<()> {
        let mut file = self.open(path, OpenMode::Out)?;
        file.write_arrayset(set)?;
        file.close()
    }

    fn decode(&self, path: &Path) -> Result<Arrayset> {
        self.open(path, OpenMode::In)?.read_arrayset()
    }

    fn peek(&self, path: &Path) -> Result<ArraysetInfo> {
        let file = self.open(path, OpenMode::In)?;
        let header = file.header()?;
        Ok(ArraysetInfo {
            element_type: header.element_type,
            shape: header.shape,
            n_samples: header.n_samples as usize,
        })
    }

    fn decode_array(&self, path: &Path, index: usize) -> Result<Array> {
        self.open(path, OpenMode::In)?.read_at(index)
    }

    fn append(&self, path: &Path, array: &Array) -> Result<()> {
        let mut file = self.open(path, OpenMode::Append)?;
        file.write(array)?;
        file.close()
    }
}
