//! Hierarchical array container
//!
//! A container file holds named datasets addressed by POSIX-like paths. Each
//! dataset is a list of objects sharing one element type and shape. The file
//! layout is a fixed superblock, the object blobs, and a JSON index at the
//! tail:
//!
//! ```text
//! 0..4    magic "AHAF"
//! 4       version
//! 5..8    reserved
//! 8..16   index offset (u64, little-endian)
//! 16..24  index length (u64, little-endian)
//! 24..    object blobs, optionally gzip-compressed
//! ...     JSON index
//! ```
//!
//! New blobs are written where the index used to start; the index is
//! rewritten behind them on flush. Unlinking a dataset only drops it from the
//! index, so its bytes stay in the file until the reachable content is copied
//! into a fresh container with [`HierarchicalFile::copy`].

use super::descriptor::{DatasetDescription, DatasetEntry, Index, ObjectRef};
use super::path::{resolve, resolve_dataset, ROOT};
use crate::array::DataElement;
use crate::{Array, Error, IoConfig, Result};
use arrayfile_core::format::constants::hierarchical::{MAGIC, SUPERBLOCK_SIZE, VERSION};
use arrayfile_core::validation::validate_magic_bytes;
use arrayfile_core::{is_valid_compression, ArrayError, ArrayShape, ElementType};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// How a container file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Read only; the file must exist
    In,
    /// Read and write, creating the file if missing
    InOut,
    /// Read and write, truncating any previous contents
    Trunc,
    /// Read and write a new file; fails if the file exists
    Excl,
}

impl AccessMode {
    pub const fn name(self) -> &'static str {
        match self {
            AccessMode::In => "in",
            AccessMode::InOut => "inout",
            AccessMode::Trunc => "trunc",
            AccessMode::Excl => "excl",
        }
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    /// Parse the single-letter flags `r`, `w`, `t` and `x`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(AccessMode::In),
            "w" | "a" => Ok(AccessMode::InOut),
            "t" => Ok(AccessMode::Trunc),
            "x" => Ok(AccessMode::Excl),
            _ => Err(Error::InvalidMode("unknown container")),
        }
    }
}

/// Container of named, typed datasets
pub struct HierarchicalFile {
    file: Option<File>,
    path: PathBuf,
    mode: AccessMode,
    config: IoConfig,
    index: Index,
    cwd: String,
    /// First byte past the last object blob
    data_end: u64,
    /// First byte past the index the superblock points at; never overwritten
    committed_end: u64,
    dirty: bool,
}

impl HierarchicalFile {
    /// Open a container with the default configuration
    pub fn open<P: AsRef<Path>>(path: P, mode: AccessMode) -> Result<Self> {
        Self::open_with_config(path, mode, IoConfig::default())
    }

    /// Open a container
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        mode: AccessMode,
        config: IoConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            AccessMode::In => File::open(&path).map_err(Error::io("opening container")),
            AccessMode::InOut => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(Error::io("opening container")),
            AccessMode::Trunc => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .map_err(Error::io("creating container")),
            AccessMode::Excl => OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => Error::PathExists(path.display().to_string()),
                    _ => Error::Io {
                        context: "creating container",
                        source: e,
                    },
                }),
        }?;

        let len = file
            .metadata()
            .map_err(Error::io("reading container metadata"))?
            .len();

        let (index, data_end, committed_end, dirty) = if len == 0 {
            if mode == AccessMode::In {
                return Err(Error::Corrupted(format!("{}: empty container", path.display())));
            }
            let start = SUPERBLOCK_SIZE as u64;
            (Index::default(), start, start, true)
        } else {
            let (index, data_end, index_end) =
                read_index(&file, len, &path, config.buffer_capacity)?;
            (index, data_end, index_end, false)
        };

        debug!(
            path = %path.display(),
            mode = mode.name(),
            datasets = index.datasets.len(),
            "opened container"
        );

        Ok(Self {
            file: Some(file),
            path,
            mode,
            config,
            index,
            cwd: ROOT.to_string(),
            data_end,
            committed_end,
            dirty,
        })
    }

    /// Path the container was opened with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the container was opened with
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Configuration in use
    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    /// Current path prefix
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Change the current path prefix
    ///
    /// Relative paths extend the prefix, absolute paths replace it. The
    /// target does not need to exist.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        self.cwd = resolve(&self.cwd, path)?;
        Ok(())
    }

    /// Whether a dataset exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        resolve_dataset(&self.cwd, path).is_ok_and(|p| self.index.datasets.contains_key(&p))
    }

    /// Absolute paths of every dataset, sorted
    pub fn paths(&self) -> Vec<String> {
        self.index.datasets.keys().cloned().collect()
    }

    /// Describe the dataset at `path`
    pub fn describe(&self, path: &str) -> Result<DatasetDescription> {
        Ok(self.entry(path)?.1.describe())
    }

    /// Read the object at `pos`
    pub fn read(&self, path: &str, pos: usize) -> Result<Array> {
        let (_, entry) = self.entry(path)?;
        let object = entry
            .objects
            .get(pos)
            .ok_or(Error::Format(ArrayError::IndexOutOfBounds))?;
        let bytes = self.read_blob(object, entry.compression)?;
        Array::from_le_bytes(entry.element_type, entry.shape, &bytes)
    }

    /// Read every object of the dataset as one array
    ///
    /// The object index becomes the leading dimension. Single-value
    /// datasets read out as a vector.
    pub fn read_all(&self, path: &str) -> Result<Array> {
        let (_, entry) = self.entry(path)?;
        let shape = entry
            .readout_shape()
            .ok_or(Error::Format(ArrayError::InvalidDimensions))?;
        let count = entry.objects.len();
        let mut readout = Array::zeros(entry.element_type, shape);
        for (k, object) in entry.objects.iter().enumerate() {
            let bytes = self.read_blob(object, entry.compression)?;
            let array = Array::from_le_bytes(entry.element_type, entry.shape, &bytes)?;
            interleave(&mut readout, &array, k, count)?;
        }
        Ok(readout)
    }

    /// Read a single-value object
    pub fn read_scalar<T: DataElement>(&self, path: &str, pos: usize) -> Result<T> {
        let array = self.read(path, pos)?;
        if *array.shape() != ArrayShape::scalar() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        array
            .as_slice::<T>()
            .and_then(|s| s.first().copied())
            .ok_or(Error::Format(ArrayError::TypeMismatch))
    }

    /// Append an object, creating an expandable dataset on first use
    ///
    /// `compression` only applies when the dataset is created.
    pub fn append(&mut self, path: &str, array: &Array, compression: u8) -> Result<()> {
        self.writable()?;
        check_compression(compression)?;
        let key = resolve_dataset(&self.cwd, path)?;

        let level = match self.index.datasets.get(&key) {
            Some(entry) => {
                entry.check(array.element_type(), array.shape())?;
                if !entry.expandable {
                    return Err(ArrayError::ShapeMismatch.into());
                }
                entry.compression
            }
            None => compression,
        };

        let object = self.write_blob(array, level)?;
        self.index
            .datasets
            .entry(key.clone())
            .or_insert_with(|| DatasetEntry::new(array.element_type(), *array.shape(), true, level))
            .objects
            .push(object);
        trace!(path = %key, bytes = object.len, "appended object");
        Ok(())
    }

    /// Create an empty expandable dataset
    pub fn create(
        &mut self,
        path: &str,
        element_type: ElementType,
        shape: ArrayShape,
        compression: u8,
    ) -> Result<()> {
        self.writable()?;
        check_compression(compression)?;
        let key = resolve_dataset(&self.cwd, path)?;
        if self.index.datasets.contains_key(&key) {
            return Err(Error::PathExists(key));
        }
        self.index
            .datasets
            .insert(key.clone(), DatasetEntry::new(element_type, shape, true, compression));
        self.dirty = true;
        debug!(path = %key, %element_type, %shape, "created dataset");
        Ok(())
    }

    /// Append a single value as a shape-`[1]` object
    pub fn append_scalar<T: DataElement>(&mut self, path: &str, value: T) -> Result<()> {
        self.append(path, &Array::scalar(value), 0)
    }

    /// Overwrite the object at `pos`
    pub fn replace(&mut self, path: &str, pos: usize, array: &Array) -> Result<()> {
        self.writable()?;
        let (key, entry) = self.entry(path)?;
        entry.check(array.element_type(), array.shape())?;
        if pos >= entry.objects.len() {
            return Err(ArrayError::IndexOutOfBounds.into());
        }
        let level = entry.compression;

        let object = self.write_blob(array, level)?;
        if let Some(entry) = self.index.datasets.get_mut(&key) {
            entry.objects[pos] = object;
        }
        trace!(path = %key, pos, "replaced object");
        Ok(())
    }

    /// Overwrite a single-value object
    pub fn replace_scalar<T: DataElement>(&mut self, path: &str, pos: usize, value: T) -> Result<()> {
        self.replace(path, pos, &Array::scalar(value))
    }

    /// Write the object at position 0, creating a fixed-size dataset if needed
    pub fn set(&mut self, path: &str, array: &Array, compression: u8) -> Result<()> {
        self.writable()?;
        check_compression(compression)?;
        if self.contains(path) {
            return self.replace(path, 0, array);
        }

        let key = resolve_dataset(&self.cwd, path)?;
        let object = self.write_blob(array, compression)?;
        let mut entry = DatasetEntry::new(array.element_type(), *array.shape(), false, compression);
        entry.objects.push(object);
        self.index.datasets.insert(key, entry);
        Ok(())
    }

    /// Write a single value at position 0
    pub fn set_scalar<T: DataElement>(&mut self, path: &str, value: T) -> Result<()> {
        self.set(path, &Array::scalar(value), 0)
    }

    /// Move a dataset to a new path
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.writable()?;
        let (from_key, _) = self.entry(from)?;
        let to_key = resolve_dataset(&self.cwd, to)?;
        if self.index.datasets.contains_key(&to_key) {
            return Err(Error::PathExists(to_key));
        }
        if let Some(entry) = self.index.datasets.remove(&from_key) {
            self.index.datasets.insert(to_key, entry);
            self.dirty = true;
        }
        Ok(())
    }

    /// Remove a dataset from the index
    ///
    /// The object bytes stay in the file; use [`HierarchicalFile::copy`] to
    /// reclaim the space.
    pub fn unlink(&mut self, path: &str) -> Result<()> {
        self.writable()?;
        let (key, _) = self.entry(path)?;
        self.index.datasets.remove(&key);
        self.dirty = true;
        debug!(path = %key, "unlinked dataset");
        Ok(())
    }

    /// Write every reachable dataset into `other` under the same paths
    ///
    /// Fails without writing anything if `other` already holds one of them.
    pub fn copy(&self, other: &mut HierarchicalFile) -> Result<()> {
        other.writable()?;
        if let Some(existing) = self
            .index
            .datasets
            .keys()
            .find(|key| other.index.datasets.contains_key(*key))
        {
            return Err(Error::PathExists(existing.clone()));
        }

        for (key, entry) in &self.index.datasets {
            let mut copied =
                DatasetEntry::new(entry.element_type, entry.shape, entry.expandable, entry.compression);
            for object in &entry.objects {
                let stored = self.read_stored(object)?;
                copied.objects.push(other.write_stored(&stored)?);
            }
            other.index.datasets.insert(key.clone(), copied);
        }
        debug!(
            from = %self.path.display(),
            to = %other.path.display(),
            datasets = self.index.datasets.len(),
            "copied container"
        );
        Ok(())
    }

    /// Write the index and superblock
    pub fn flush(&mut self) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(Error::Closed);
        };
        if self.mode == AccessMode::In || !self.dirty {
            return Ok(());
        }

        let index = serde_json::to_vec(&self.index)?;
        let offset = self.data_end.max(self.committed_end);
        file.seek(SeekFrom::Start(offset))
            .map_err(Error::io("seeking to container index"))?;
        file.write_all(&index)
            .map_err(Error::io("writing container index"))?;
        let end = offset + index.len() as u64;
        file.set_len(end)
            .map_err(Error::io("truncating container"))?;

        let mut superblock = [0u8; SUPERBLOCK_SIZE];
        superblock[0..4].copy_from_slice(&MAGIC);
        superblock[4] = VERSION;
        superblock[8..16].copy_from_slice(&offset.to_le_bytes());
        superblock[16..24].copy_from_slice(&(index.len() as u64).to_le_bytes());
        file.seek(SeekFrom::Start(0))
            .map_err(Error::io("seeking to superblock"))?;
        file.write_all(&superblock)
            .map_err(Error::io("writing superblock"))?;
        file.flush().map_err(Error::io("flushing container"))?;

        self.data_end = offset;
        self.committed_end = end;
        self.dirty = false;
        trace!(path = %self.path.display(), index_bytes = index.len(), "flushed container");
        Ok(())
    }

    /// Flush and release the file
    pub fn close(&mut self) -> Result<()> {
        let result = self.flush();
        self.file = None;
        debug!(path = %self.path.display(), "closed container");
        result
    }

    fn writable(&self) -> Result<()> {
        if self.file.is_none() {
            return Err(Error::Closed);
        }
        if self.mode == AccessMode::In {
            return Err(Error::InvalidMode(self.mode.name()));
        }
        Ok(())
    }

    fn entry(&self, path: &str) -> Result<(String, &DatasetEntry)> {
        let key = resolve_dataset(&self.cwd, path)?;
        match self.index.datasets.get(&key) {
            Some(entry) => Ok((key, entry)),
            None => Err(Error::PathNotFound(key)),
        }
    }

    fn read_stored(&self, object: &ObjectRef) -> Result<Vec<u8>> {
        let mut file = self.file.as_ref().ok_or(Error::Closed)?;
        file.seek(SeekFrom::Start(object.offset))
            .map_err(Error::io("seeking to object"))?;
        let len = usize::try_from(object.len).map_err(|_| ArrayError::ArraySizeOverflow)?;
        let mut stored = vec![0u8; len];
        file.read_exact(&mut stored)
            .map_err(Error::io("reading object"))?;
        Ok(stored)
    }

    fn read_blob(&self, object: &ObjectRef, compression: u8) -> Result<Vec<u8>> {
        let stored = self.read_stored(object)?;
        if compression == 0 {
            return Ok(stored);
        }
        let mut decoded = Vec::new();
        GzDecoder::new(stored.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| Error::External(format!("gzip decode: {e}")))?;
        Ok(decoded)
    }

    /// Store `bytes` past both the objects and the committed index
    fn write_stored(&mut self, bytes: &[u8]) -> Result<ObjectRef> {
        let offset = self.data_end.max(self.committed_end);
        let file = self.file.as_mut().ok_or(Error::Closed)?;
        file.seek(SeekFrom::Start(offset))
            .map_err(Error::io("seeking to end of objects"))?;
        file.write_all(bytes)
            .map_err(Error::io("writing object"))?;

        let object = ObjectRef {
            offset,
            len: bytes.len() as u64,
        };
        self.data_end = offset + object.len;
        self.dirty = true;
        Ok(object)
    }

    fn write_blob(&mut self, array: &Array, compression: u8) -> Result<ObjectRef> {
        if array.len() != array.shape().n_elements() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        let payload = array.to_le_bytes();
        if compression == 0 {
            return self.write_stored(&payload);
        }
        let gzip = |e: std::io::Error| Error::External(format!("gzip encode: {e}"));
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(u32::from(compression)));
        encoder.write_all(&payload).map_err(gzip)?;
        let compressed = encoder.finish().map_err(gzip)?;
        self.write_stored(&compressed)
    }
}

impl Drop for HierarchicalFile {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "failed to close container");
            }
        }
    }
}

impl std::fmt::Debug for HierarchicalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalFile")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("cwd", &self.cwd)
            .field("datasets", &self.index.datasets.len())
            .field("open", &self.file.is_some())
            .finish()
    }
}

fn check_compression(level: u8) -> Result<()> {
    if !is_valid_compression(level) {
        return Err(Error::InvalidCompression(level));
    }
    Ok(())
}

/// Place `object` as slice `k` of `count` along the leading readout dimension
fn interleave(readout: &mut Array, object: &Array, k: usize, count: usize) -> Result<()> {
    crate::array::with_data!(readout.data_mut(), dst => scatter(dst, object, k, count))
}

fn scatter<T: DataElement>(dst: &mut [T], object: &Array, k: usize, count: usize) -> Result<()> {
    let src = object
        .as_slice::<T>()
        .ok_or(Error::Format(ArrayError::TypeMismatch))?;
    for (j, &value) in src.iter().enumerate() {
        dst[k + count * j] = value;
    }
    Ok(())
}

/// Parse the index; returns it with its offset and end
fn read_index(file: &File, len: u64, path: &Path, capacity: usize) -> Result<(Index, u64, u64)> {
    let corrupted = |what: &str| Error::Corrupted(format!("{}: {what}", path.display()));
    if len < SUPERBLOCK_SIZE as u64 {
        return Err(corrupted("shorter than the superblock"));
    }

    let mut reader = file;
    let mut superblock = [0u8; SUPERBLOCK_SIZE];
    reader
        .seek(SeekFrom::Start(0))
        .map_err(Error::io("seeking to superblock"))?;
    reader
        .read_exact(&mut superblock)
        .map_err(Error::io("reading superblock"))?;

    validate_magic_bytes(
        &[superblock[0], superblock[1], superblock[2], superblock[3]],
        &MAGIC,
    )?;
    if superblock[4] == 0 || superblock[4] > VERSION {
        return Err(ArrayError::UnsupportedVersion.into());
    }
    let index_offset = read_u64_le(&superblock[8..16]);
    let index_len = read_u64_le(&superblock[16..24]);
    let index_end = index_offset
        .checked_add(index_len)
        .ok_or_else(|| corrupted("index extends past end of file"))?;
    if index_offset < SUPERBLOCK_SIZE as u64 || index_end > len {
        return Err(corrupted("index extends past end of file"));
    }

    reader
        .seek(SeekFrom::Start(index_offset))
        .map_err(Error::io("seeking to container index"))?;
    let buffered = BufReader::with_capacity(capacity.max(1), reader.take(index_len));
    let index: Index = serde_json::from_reader(buffered)?;

    for (key, entry) in &index.datasets {
        let in_bounds = entry
            .objects
            .iter()
            .all(|o| o.offset >= SUPERBLOCK_SIZE as u64 && o.end().is_some_and(|e| e <= index_offset));
        if !in_bounds {
            return Err(corrupted(&format!("object of {key} lies outside the data region")));
        }
    }
    Ok((index, index_offset, index_end))
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrayfile_core::{ArrayShape, ElementType, Scalar};

    fn matrix(offset: f64) -> Array {
        let values = (0..6).map(|v| v as f64 + offset).collect();
        Array::from_row_major(ArrayShape::new(&[2, 3]).unwrap(), values).unwrap()
    }

    #[test]
    fn test_append_read_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.haf");
        {
            let mut file = HierarchicalFile::open(&path, AccessMode::Trunc).unwrap();
            file.append("/group/matrix", &matrix(0.0), 0).unwrap();
            file.append("group/matrix", &matrix(10.0), 0).unwrap();
            file.set_scalar("/group/answer", 42i64).unwrap();
            file.close().unwrap();
        }

        let file = HierarchicalFile::open(&path, AccessMode::In).unwrap();
        assert_eq!(file.paths(), vec!["/group/answer", "/group/matrix"]);
        assert_eq!(file.read("/group/matrix", 1).unwrap(), matrix(10.0));
        assert_eq!(file.read_scalar::<i64>("/group/answer", 0).unwrap(), 42);
        assert!(file.read_scalar::<i32>("/group/answer", 0).is_err());
        assert!(matches!(
            file.read("/group/matrix", 2),
            Err(Error::Format(ArrayError::IndexOutOfBounds))
        ));
        assert!(matches!(file.read("/nope", 0), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_describe_and_read_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = HierarchicalFile::open(dir.path().join("d.haf"), AccessMode::Trunc).unwrap();
        file.append("m", &matrix(0.0), 0).unwrap();
        file.append("m", &matrix(100.0), 0).unwrap();

        let description = file.describe("m").unwrap();
        assert_eq!(description.object.element_type, ElementType::Float64);
        assert_eq!(description.object.count, 2);
        assert!(description.object.expandable);
        assert_eq!(description.readout.unwrap().shape.dims(), &[2, 2, 3]);

        let all = file.read_all("m").unwrap();
        assert_eq!(all.shape().dims(), &[2, 2, 3]);
        assert_eq!(all.get(&[0, 1, 2]), Some(Scalar::Float64(5.0)));
        assert_eq!(all.get(&[1, 0, 1]), Some(Scalar::Float64(101.0)));

        for value in [1u8, 2, 3] {
            file.append_scalar("s", value).unwrap();
        }
        let scalars = file.read_all("s").unwrap();
        assert_eq!(scalars.as_slice::<u8>().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_cd_and_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = HierarchicalFile::open(dir.path().join("p.haf"), AccessMode::Trunc).unwrap();
        file.cd("experiments/run1").unwrap();
        assert_eq!(file.cwd(), "/experiments/run1");
        file.set_scalar("score", 0.5f32).unwrap();
        file.cd("..").unwrap();
        assert!(file.contains("run1/score"));
        assert!(file.contains("/experiments/run1/score"));
        file.cd("/").unwrap();
        assert!(!file.contains("score"));
        assert_eq!(file.paths(), vec!["/experiments/run1/score"]);
    }

    #[test]
    fn test_set_replace_and_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = HierarchicalFile::open(dir.path().join("s.haf"), AccessMode::Trunc).unwrap();
        file.set("fixed", &matrix(0.0), 0).unwrap();
        file.set("fixed", &matrix(1.0), 0).unwrap();
        assert_eq!(file.read("fixed", 0).unwrap(), matrix(1.0));
        assert!(!file.describe("fixed").unwrap().object.expandable);

        assert!(matches!(
            file.append("fixed", &matrix(2.0), 0),
            Err(Error::Format(ArrayError::ShapeMismatch))
        ));
        let ints = Array::from_vec(vec![1i32; 6]).unwrap();
        assert!(matches!(
            file.replace("fixed", 0, &ints),
            Err(Error::Format(ArrayError::TypeMismatch))
        ));
        assert!(matches!(
            file.replace("fixed", 1, &matrix(3.0)),
            Err(Error::Format(ArrayError::IndexOutOfBounds))
        ));

        file.append_scalar("counter", 1u32).unwrap();
        file.replace_scalar("counter", 0, 7u32).unwrap();
        assert_eq!(file.read_scalar::<u32>("counter", 0).unwrap(), 7);
    }

    #[test]
    fn test_rename_unlink_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("src.haf");
        let mut source = HierarchicalFile::open(&source_path, AccessMode::Trunc).unwrap();
        source.append("a", &matrix(0.0), 0).unwrap();
        source.append("b", &matrix(1.0), 0).unwrap();
        source.set_scalar("c", true).unwrap();

        assert!(matches!(source.rename("a", "b"), Err(Error::PathExists(_))));
        source.rename("a", "moved/a").unwrap();
        assert!(!source.contains("a"));
        assert!(matches!(source.unlink("a"), Err(Error::PathNotFound(_))));
        source.unlink("b").unwrap();
        source.flush().unwrap();
        let bloated = std::fs::metadata(&source_path).unwrap().len();

        let copy_path = dir.path().join("copy.haf");
        let mut copy = HierarchicalFile::open(&copy_path, AccessMode::Excl).unwrap();
        source.copy(&mut copy).unwrap();
        copy.close().unwrap();
        assert!(std::fs::metadata(&copy_path).unwrap().len() < bloated);

        let copy = HierarchicalFile::open(&copy_path, AccessMode::InOut).unwrap();
        assert_eq!(copy.paths(), vec!["/c", "/moved/a"]);
        assert_eq!(copy.read("moved/a", 0).unwrap(), matrix(0.0));
        assert!(copy.read_scalar::<bool>("c", 0).unwrap());

        let mut again = HierarchicalFile::open(&copy_path, AccessMode::InOut).unwrap();
        assert!(matches!(source.copy(&mut again), Err(Error::PathExists(_))));
    }

    #[test]
    fn test_create_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e.haf");
        let shape = ArrayShape::vector(2).unwrap();
        {
            let mut file = HierarchicalFile::open(&path, AccessMode::Trunc).unwrap();
            file.create("empty", ElementType::Float32, shape, 0).unwrap();
            assert!(matches!(
                file.create("empty", ElementType::Float32, shape, 0),
                Err(Error::PathExists(_))
            ));
            file.close().unwrap();
        }

        let mut file = HierarchicalFile::open(&path, AccessMode::InOut).unwrap();
        let description = file.describe("empty").unwrap();
        assert_eq!(description.object.count, 0);
        assert!(description.object.expandable);
        assert!(description.readout.is_none());
        assert!(matches!(
            file.append("empty", &Array::from_vec(vec![1i8, 2]).unwrap(), 0),
            Err(Error::Format(ArrayError::TypeMismatch))
        ));
        file.append("empty", &Array::from_vec(vec![1.0f32, 2.0]).unwrap(), 0)
            .unwrap();
        assert_eq!(file.describe("empty").unwrap().object.count, 1);
    }

    #[test]
    fn test_unflushed_writes_keep_committed_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.haf");
        {
            let mut file = HierarchicalFile::open(&path, AccessMode::Trunc).unwrap();
            file.append("kept", &matrix(0.0), 0).unwrap();
            file.close().unwrap();
        }

        let mut file = HierarchicalFile::open(&path, AccessMode::InOut).unwrap();
        file.append("lost", &matrix(1.0), 0).unwrap();
        file.set_scalar("also_lost", 3u16).unwrap();
        // Abandon the handle without flushing the new index
        std::mem::forget(file);

        let file = HierarchicalFile::open(&path, AccessMode::In).unwrap();
        assert_eq!(file.paths(), vec!["/kept"]);
        assert_eq!(file.read("kept", 0).unwrap(), matrix(0.0));
        drop(file);

        // A later writer still commits on top of the abandoned bytes
        let mut file = HierarchicalFile::open(&path, AccessMode::InOut).unwrap();
        file.append("kept", &matrix(2.0), 0).unwrap();
        file.close().unwrap();
        let file = HierarchicalFile::open(&path, AccessMode::In).unwrap();
        assert_eq!(file.read("kept", 1).unwrap(), matrix(2.0));
        assert_eq!(file.read("kept", 0).unwrap(), matrix(0.0));
    }

    #[test]
    fn test_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("z.haf");
        let zeros = Array::zeros(ElementType::Float64, ArrayShape::new(&[64, 64]).unwrap());
        {
            let mut file = HierarchicalFile::open(&path, AccessMode::Trunc).unwrap();
            assert!(matches!(
                file.append("z", &zeros, 10),
                Err(Error::InvalidCompression(10))
            ));
            file.append("z", &zeros, 9).unwrap();
            file.close().unwrap();
        }
        assert!(std::fs::metadata(&path).unwrap().len() < 64 * 64 * 8);
        let file = HierarchicalFile::open(&path, AccessMode::In).unwrap();
        assert_eq!(file.read("z", 0).unwrap(), zeros);
    }

    #[test]
    fn test_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.haf");
        assert!(matches!(
            HierarchicalFile::open(&path, AccessMode::In),
            Err(Error::Io { .. })
        ));
        HierarchicalFile::open(&path, AccessMode::InOut)
            .unwrap()
            .close()
            .unwrap();
        assert!(matches!(
            HierarchicalFile::open(&path, AccessMode::Excl),
            Err(Error::PathExists(_))
        ));

        let mut file = HierarchicalFile::open(&path, AccessMode::In).unwrap();
        assert!(file.paths().is_empty());
        assert!(matches!(
            file.set_scalar("x", 1i8),
            Err(Error::InvalidMode("in"))
        ));
        assert_eq!("t".parse::<AccessMode>().unwrap(), AccessMode::Trunc);
        assert!("rw".parse::<AccessMode>().is_err());

        std::fs::write(&path, b"not a container at all!!").unwrap();
        assert!(HierarchicalFile::open(&path, AccessMode::In).is_err());
    }
}
