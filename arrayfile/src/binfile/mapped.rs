//! Memory-mapped, read-only access to binary array files

use crate::array::DataElement;
use crate::{Array, Arrayset, Error, Result};
use arrayfile_core::traits::backend::payload_range;
use arrayfile_core::{ArrayError, BinFileHeader, PayloadSource};
use memmap2::{Mmap, MmapOptions};
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of a closed binary array file backed by a memory map
pub struct MappedBinFile {
    mmap: Mmap,
    header: BinFileHeader,
    path: PathBuf,
}

impl MappedBinFile {
    /// Map a binary array file into memory and validate its header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(Error::io("opening binary file"))?;
        let len = file
            .metadata()
            .map_err(Error::io("reading file metadata"))?
            .len();
        if len == 0 {
            return Err(ArrayError::UninitializedHeader.into());
        }
        if len < BinFileHeader::SIZE as u64 {
            return Err(Error::Corrupted(format!(
                "{}: {len} bytes is shorter than the header",
                path.display()
            )));
        }

        // SAFETY: read-only mapping; the file must not be truncated while mapped
        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .map_err(Error::io("memory mapping binary file"))?
        };

        let header = BinFileHeader::from_bytes(&mmap[..BinFileHeader::SIZE])?;
        let expected = header.expected_file_len()?;
        if (mmap.len() as u64) < expected {
            return Err(Error::Corrupted(format!(
                "{}: header claims {} arrays but file has {} bytes",
                path.display(),
                header.n_samples,
                mmap.len()
            )));
        }

        debug!(path = %path.display(), n_samples = header.n_samples, "mapped binary array file");
        Ok(Self { mmap, header, path })
    }

    /// Path of the mapped file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed elements of the array at `index`
    ///
    /// Borrows the mapped bytes when they can be reinterpreted in place and
    /// decodes into an owned vector otherwise.
    pub fn view<T: DataElement + bytemuck::Pod>(&self, index: usize) -> Result<Cow<'_, [T]>> {
        if let Some(slice) = self.try_view::<T>(index)? {
            return Ok(Cow::Borrowed(slice));
        }
        let mut owned = vec![T::default(); self.header.n_elements()];
        self.decode(index, &mut owned)?;
        Ok(Cow::Owned(owned))
    }

    /// Copy of the array at `index`
    pub fn array(&self, index: usize) -> Result<Array> {
        Array::from_le_bytes(
            self.header.element_type,
            self.header.shape,
            self.payload(index)?,
        )
    }

    /// Copy of every stored array, ids `1..=n_samples`
    pub fn arrayset(&self) -> Result<Arrayset> {
        let mut set = Arrayset::new(self.header.element_type, self.header.shape);
        for index in 0..self.n_samples() {
            set.add(self.array(index)?)?;
        }
        Ok(set)
    }
}

impl PayloadSource for MappedBinFile {
    fn header(&self) -> &BinFileHeader {
        &self.header
    }

    fn payload(&self, index: usize) -> arrayfile_core::Result<&[u8]> {
        payload_range(&self.header, &self.mmap, index)
    }
}

impl std::fmt::Debug for MappedBinFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedBinFile")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("len", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinFile, Scalar};
    use arrayfile_core::ArrayShape;

    #[test]
    fn test_mapped_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapped.bin");
        let shape = ArrayShape::new(&[2, 2]).unwrap();
        let mut out = BinFile::create(&path).unwrap();
        out.write(&Array::new(shape, vec![1.0f32, 2.0, 3.0, 4.0]).unwrap())
            .unwrap();
        out.write(&Array::new(shape, vec![5.0f32, 6.0, 7.0, 8.0]).unwrap())
            .unwrap();
        out.close().unwrap();

        let mapped = MappedBinFile::open(&path).unwrap();
        assert_eq!(mapped.n_samples(), 2);
        assert_eq!(&*mapped.view::<f32>(1).unwrap(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(mapped.element(0, 3).unwrap(), Scalar::Float32(4.0));
        assert!(mapped.view::<f64>(0).is_err());
        assert_eq!(
            mapped.array(2).unwrap_err().format_kind(),
            Some(ArrayError::EndOfFile)
        );
        assert_eq!(mapped.arrayset().unwrap().len(), 2);
    }

    #[test]
    fn test_mapped_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            MappedBinFile::open(&path).unwrap_err().format_kind(),
            Some(ArrayError::UninitializedHeader)
        );
    }
}
