use super::{ArraysetCodec, ArraysetInfo};
use crate::hierarchical::{AccessMode, HierarchicalFile};
use crate::{Array, Arrayset, IoConfig, Result};
use std::path::Path;

/// Codec storing an arrayset as one expandable dataset of a container file
#[derive(Debug, Clone)]
pub struct HierarchicalCodec {
    config: IoConfig,
    extensions: Vec<String>,
}

impl HierarchicalCodec {
    /// Registered codec name
    pub const NAME: &'static str = "arrayfile.hierarchical";

    /// Dataset path holding the arrays
    pub const DATASET: &'static str = "/arrayset";

    pub fn new(config: IoConfig) -> Self {
        Self {
            config,
            extensions: vec![".haf".to_string(), ".h5a".to_string()],
        }
    }

    fn open(&self, path: &Path, mode: AccessMode) -> Result<HierarchicalFile> {
        HierarchicalFile::open_with_config(path, mode, self.config)
    }
}

impl Default for HierarchicalCodec {
    fn default() -> Self {
        Self::new(IoConfig::default())
    }
}

impl ArraysetCodec for HierarchicalCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn encode(&self, set: &Arrayset, path: &Path) -> Result<()> {
        let mut file = self.open(path, AccessMode::Trunc)?;
        let level = self.config.default_compression;
        file.create(Self::DATASET, set.element_type(), *set.shape(), level)?;
        for array in set.arrays() {
            file.append(Self::DATASET, array, level)?;
        }
        file.close()
    }

    fn decode(&self, path: &Path) -> Result<Arrayset> {
        let file = self.open(path, AccessMode::In)?;
        let info = peek_file(&file)?;
        let mut set = Arrayset::new(info.element_type, info.shape);
        for pos in 0..info.n_samples {
            set.add(file.read(Self::DATASET, pos)?)?;
        }
        Ok(set)
    }

    fn peek(&self, path: &Path) -> Result<ArraysetInfo> {
        peek_file(&self.open(path, AccessMode::In)?)
    }

    fn decode_array(&self, path: &Path, index: usize) -> Result<Array> {
        self.open(path, AccessMode::In)?.read(Self::DATASET, index)
    }

    fn append(&self, path: &Path, array: &Array) -> Result<()> {
        let mut file = self.open(path, AccessMode::InOut)?;
        file.append(Self::DATASET, array, self.config.default_compression)?;
        file.close()
    }
}

fn peek_file(file: &HierarchicalFile) -> Result<ArraysetInfo> {
    let object = file.describe(HierarchicalCodec::DATASET)?.object;
    Ok(ArraysetInfo {
        element_type: object.element_type,
        shape: object.shape,
        n_samples: object.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use arrayfile_core::{ArrayShape, ElementType};

    #[test]
    fn test_roundtrip_with_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.h5a");
        let codec =
            HierarchicalCodec::new(IoConfig::default().with_default_compression(4).unwrap());

        let shape = ArrayShape::new(&[3, 2]).unwrap();
        let mut set = Arrayset::new(ElementType::Int64, shape);
        for i in 0..5i64 {
            set.add(Array::new(shape, vec![i; 6]).unwrap()).unwrap();
        }
        codec.encode(&set, &path).unwrap();
        assert_eq!(codec.decode(&path).unwrap(), set);

        codec
            .append(&path, &Array::new(shape, vec![9i64; 6]).unwrap())
            .unwrap();
        let info = codec.peek(&path).unwrap();
        assert_eq!(info.n_samples, 6);
        assert_eq!(info.element_type, ElementType::Int64);
        assert_eq!(
            codec.decode_array(&path, 5).unwrap().as_slice::<i64>().unwrap(),
            &[9; 6]
        );
    }

    #[test]
    fn test_empty_arrayset_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.haf");
        let codec = HierarchicalCodec::default();
        let set = Arrayset::new(ElementType::Float32, ArrayShape::vector(2).unwrap());

        codec.encode(&set, &path).unwrap();
        let info = codec.peek(&path).unwrap();
        assert_eq!(info.n_samples, 0);
        assert_eq!(info.element_type, ElementType::Float32);
        assert_eq!(codec.decode(&path).unwrap(), set);

        codec
            .append(&path, &Array::from_vec(vec![0.5f32, 1.5]).unwrap())
            .unwrap();
        assert_eq!(codec.decode(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.haf");
        let mut file = HierarchicalFile::open(&path, AccessMode::Trunc).unwrap();
        file.set_scalar("unrelated", 1u8).unwrap();
        file.close().unwrap();

        assert!(matches!(
            HierarchicalCodec::default().peek(&path),
            Err(Error::PathNotFound(_))
        ));
    }
}
