//! Streaming reader/writer for binary array files
//!
//! A [`BinFile`] owns one buffered stream and at most one header. Arrays are
//! written one after another behind the 64-byte header and read back either
//! sequentially through a cursor or by index.

use crate::{Array, Arrayset, Error, IoConfig, Result};
use arrayfile_core::format::constants::binfile::{HEADER_SIZE, SAMPLE_COUNT_OFFSET};
use arrayfile_core::{ArrayError, ArrayShape, BinFileHeader, ElementType};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// How a binary array file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Write, continuing the sequence already stored in the file
    Append,
    /// Read only
    In,
    /// Write, truncating any previous contents
    Out,
}

impl OpenMode {
    /// Bit flag for [`OpenMode::Append`]
    pub const APPEND: u32 = 1 << 0;
    /// Bit flag for [`OpenMode::In`]
    pub const IN: u32 = 1 << 3;
    /// Bit flag for [`OpenMode::Out`]
    pub const OUT: u32 = 1 << 4;

    /// Convert a flag mask into a mode
    ///
    /// Exactly one flag must be set; combinations such as `IN | OUT` are
    /// rejected.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            Self::APPEND => Ok(OpenMode::Append),
            Self::IN => Ok(OpenMode::In),
            Self::OUT => Ok(OpenMode::Out),
            _ => Err(Error::InvalidMode("combined or unknown")),
        }
    }

    /// Flag mask of this mode
    pub const fn bits(self) -> u32 {
        match self {
            OpenMode::Append => Self::APPEND,
            OpenMode::In => Self::IN,
            OpenMode::Out => Self::OUT,
        }
    }

    /// Short mode name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            OpenMode::Append => "append",
            OpenMode::In => "in",
            OpenMode::Out => "out",
        }
    }

    /// Whether the mode permits writes
    pub const fn is_write(self) -> bool {
        !matches!(self, OpenMode::In)
    }
}

enum Stream {
    Read(BufReader<File>),
    Write(BufWriter<File>),
}

/// Binary file holding a homogeneous sequence of arrays
pub struct BinFile {
    path: PathBuf,
    mode: OpenMode,
    config: IoConfig,
    stream: Option<Stream>,
    header: Option<BinFileHeader>,
    /// Index of the next array returned by [`BinFile::read`]
    cursor: u64,
    /// Byte offset of the stream position, reading mode only
    position: u64,
    buffer: Vec<u8>,
}

impl BinFile {
    /// Open a file with the default configuration
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with_config(path, mode, IoConfig::default())
    }

    /// Create or truncate a file for writing
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::Out)
    }

    /// Open a file with explicit buffer and header-sync settings
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        config: IoConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let capacity = config.buffer_capacity.max(1);

        let (stream, header, position) = match mode {
            OpenMode::Out => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
                    .map_err(Error::io("creating binary file"))?;
                (Stream::Write(BufWriter::with_capacity(capacity, file)), None, 0)
            }
            OpenMode::Append => {
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)
                    .map_err(Error::io("opening binary file for append"))?;
                let header = read_existing_header(&mut file, &path, true)?;
                let end = match &header {
                    Some(h) => h.expected_file_len()?,
                    None => 0,
                };
                file.seek(SeekFrom::Start(end))
                    .map_err(Error::io("seeking to end of binary file"))?;
                (Stream::Write(BufWriter::with_capacity(capacity, file)), header, end)
            }
            OpenMode::In => {
                let mut file = File::open(&path).map_err(Error::io("opening binary file"))?;
                let header = read_existing_header(&mut file, &path, false)?;
                let position = if header.is_some() { HEADER_SIZE as u64 } else { 0 };
                (Stream::Read(BufReader::with_capacity(capacity, file)), header, position)
            }
        };

        debug!(
            path = %path.display(),
            mode = mode.name(),
            n_samples = header.map_or(0, |h| h.n_samples),
            "opened binary array file"
        );

        Ok(Self {
            path,
            mode,
            config,
            stream: Some(stream),
            header,
            cursor: 0,
            position,
            buffer: Vec::new(),
        })
    }

    /// Path the file was opened with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the file was opened with
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Whether the stream is still open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Index of the next array returned by [`BinFile::read`]
    pub fn cursor(&self) -> usize {
        self.cursor as usize
    }

    /// Parsed or established header
    pub fn header(&self) -> Result<&BinFileHeader> {
        if self.stream.is_none() {
            return Err(Error::Closed);
        }
        self.header
            .as_ref()
            .ok_or(Error::Format(ArrayError::UninitializedHeader))
    }

    /// Element type shared by every array
    pub fn element_type(&self) -> Result<ElementType> {
        Ok(self.header()?.element_type)
    }

    /// Number of dimensions of every array
    pub fn n_dimensions(&self) -> Result<usize> {
        Ok(self.header()?.n_dimensions())
    }

    /// Shape shared by every array
    pub fn shape(&self) -> Result<ArrayShape> {
        Ok(self.header()?.shape)
    }

    /// Number of arrays in the file
    pub fn n_samples(&self) -> Result<usize> {
        Ok(self.header()?.n_samples as usize)
    }

    /// Number of elements per array
    pub fn n_elements(&self) -> Result<usize> {
        Ok(self.header()?.n_elements())
    }

    /// Extent of every array along `dim`
    pub fn size(&self, dim: usize) -> Result<usize> {
        self.header()?
            .shape
            .extent(dim)
            .ok_or(Error::Format(ArrayError::IndexOutOfBounds))
    }

    /// Fix the element type and shape of a file opened for writing
    ///
    /// Calling it again with the same description is a no-op; a different
    /// type or shape fails.
    pub fn init_header(&mut self, element_type: ElementType, shape: ArrayShape) -> Result<()> {
        self.writer()?;
        if let Some(header) = &self.header {
            header.check_compatible(element_type, &shape)?;
            return Ok(());
        }

        let header = BinFileHeader::new(element_type, shape);
        let writer = self.writer()?;
        writer
            .seek(SeekFrom::Start(0))
            .map_err(Error::io("seeking to header"))?;
        writer
            .write_all(&header.to_bytes())
            .map_err(Error::io("writing header"))?;
        self.header = Some(header);
        debug!(path = %self.path.display(), %element_type, %shape, "initialized header");
        Ok(())
    }

    /// Append one array
    ///
    /// The first write on a fresh file establishes the element type and
    /// shape; later writes must match both exactly.
    pub fn write(&mut self, array: &Array) -> Result<()> {
        if array.len() != array.shape().n_elements() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        self.init_header(array.element_type(), *array.shape())?;

        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.clear();
        array.data().encode_le(&mut buffer);
        let written = self
            .writer()
            .and_then(|w| w.write_all(&buffer).map_err(Error::io("writing array payload")));
        let bytes = buffer.len();
        self.buffer = buffer;
        written?;

        let n_samples = match self.header.as_mut() {
            Some(header) => {
                header.n_samples += 1;
                header.n_samples
            }
            None => return Err(ArrayError::UninitializedHeader.into()),
        };
        trace!(index = n_samples - 1, bytes, "wrote array");

        if self.config.sync_header_on_write {
            self.sync_sample_count()?;
        }
        Ok(())
    }

    /// Append one array, casting it to the file's element type first
    ///
    /// On a fresh file this behaves exactly like [`BinFile::write`].
    pub fn write_cast(&mut self, array: &Array) -> Result<()> {
        match self.header {
            Some(header) if header.element_type != array.element_type() => {
                if header.shape != *array.shape() {
                    return Err(ArrayError::ShapeMismatch.into());
                }
                self.write(&array.cast(header.element_type))
            }
            _ => self.write(array),
        }
    }

    /// Append every array of a set in id order
    ///
    /// An empty set still fixes the header of a fresh file.
    pub fn write_arrayset(&mut self, set: &Arrayset) -> Result<()> {
        self.init_header(set.element_type(), *set.shape())?;
        for array in set.arrays() {
            self.write(array)?;
        }
        Ok(())
    }

    /// Read the array under the cursor and advance it
    pub fn read(&mut self) -> Result<Array> {
        let index = self.cursor;
        self.read_at(index as usize)
    }

    /// Read the array at `index`; the cursor moves to `index + 1`
    pub fn read_at(&mut self, index: usize) -> Result<Array> {
        let header = *self.readable_header()?;
        let mut array = Array::zeros(header.element_type, header.shape);
        self.load_payload(index as u64)?;
        array.data_mut().decode_le(&self.buffer)?;
        Ok(array)
    }

    /// Read the array under the cursor converted to `element_type`
    pub fn read_cast(&mut self, element_type: ElementType) -> Result<Array> {
        Ok(self.read()?.cast(element_type))
    }

    /// Read the array at `index` converted to `element_type`
    pub fn read_at_cast(&mut self, index: usize, element_type: ElementType) -> Result<Array> {
        Ok(self.read_at(index)?.cast(element_type))
    }

    /// Read the array under the cursor into a caller buffer of the stored type
    pub fn read_into(&mut self, dst: &mut Array) -> Result<()> {
        let header = *self.readable_header()?;
        header.check_compatible(dst.element_type(), dst.shape())?;
        self.load_payload(self.cursor)?;
        dst.data_mut().decode_le(&self.buffer)?;
        Ok(())
    }

    /// Read the array under the cursor into a caller buffer of any type
    ///
    /// A destination of the stored type is filled straight from the payload
    /// bytes; any other type goes through a scratch array and a cast.
    pub fn read_into_cast(&mut self, dst: &mut Array) -> Result<()> {
        let header = *self.readable_header()?;
        if header.shape != *dst.shape() {
            return Err(ArrayError::ShapeMismatch.into());
        }
        if header.element_type == dst.element_type() {
            return self.read_into(dst);
        }
        let mut scratch = Array::zeros(header.element_type, header.shape);
        self.load_payload(self.cursor)?;
        scratch.data_mut().decode_le(&self.buffer)?;
        dst.assign_cast(&scratch)
    }

    /// Read every array into a set with ids `1..=n_samples`
    pub fn read_arrayset(&mut self) -> Result<Arrayset> {
        let header = *self.readable_header()?;
        let mut set = Arrayset::new(header.element_type, header.shape);
        for index in 0..header.n_samples as usize {
            set.add(self.read_at(index)?)?;
        }
        Ok(set)
    }

    /// Write the sample count into the header and flush buffered bytes
    pub fn flush(&mut self) -> Result<()> {
        match self.stream {
            Some(Stream::Write(_)) => {
                self.sync_sample_count()?;
                self.writer()?.flush().map_err(Error::io("flushing binary file"))
            }
            Some(Stream::Read(_)) => Ok(()),
            None => Err(Error::Closed),
        }
    }

    /// Finalize the header, flush, and release the stream
    pub fn close(&mut self) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::Closed);
        }
        let result = self.flush();
        self.stream = None;
        debug!(
            path = %self.path.display(),
            n_samples = self.header.map_or(0, |h| h.n_samples),
            "closed binary array file"
        );
        result
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        match &mut self.stream {
            Some(Stream::Write(writer)) => Ok(writer),
            Some(Stream::Read(_)) => Err(Error::InvalidMode(self.mode.name())),
            None => Err(Error::Closed),
        }
    }

    fn readable_header(&self) -> Result<&BinFileHeader> {
        match &self.stream {
            Some(Stream::Read(_)) => self.header(),
            Some(Stream::Write(_)) => Err(Error::InvalidMode(self.mode.name())),
            None => Err(Error::Closed),
        }
    }

    /// Fill the scratch buffer with the payload at `index`
    fn load_payload(&mut self, index: u64) -> Result<()> {
        let header = *self.readable_header()?;
        if index >= header.n_samples {
            return Err(ArrayError::EndOfFile.into());
        }
        let offset = header.payload_offset(index)?;
        let size = header.array_size_bytes()?;

        let Some(Stream::Read(reader)) = &mut self.stream else {
            return Err(Error::InvalidMode(self.mode.name()));
        };
        if self.position != offset {
            reader
                .seek(SeekFrom::Start(offset))
                .map_err(Error::io("seeking to array payload"))?;
        }
        self.buffer.resize(size, 0);
        reader
            .read_exact(&mut self.buffer)
            .map_err(Error::io("reading array payload"))?;

        self.position = offset + size as u64;
        self.cursor = index + 1;
        trace!(index, bytes = size, "read array");
        Ok(())
    }

    fn sync_sample_count(&mut self) -> Result<()> {
        let Some(header) = self.header else {
            return Ok(());
        };
        let writer = self.writer()?;
        writer
            .seek(SeekFrom::Start(SAMPLE_COUNT_OFFSET as u64))
            .map_err(Error::io("seeking to sample count"))?;
        writer
            .write_all(&header.n_samples.to_le_bytes())
            .map_err(Error::io("writing sample count"))?;
        writer
            .seek(SeekFrom::End(0))
            .map_err(Error::io("seeking to end of binary file"))?;
        Ok(())
    }
}

impl Drop for BinFile {
    fn drop(&mut self) {
        if self.stream.is_some() {
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "failed to close binary array file");
            }
        }
    }
}

impl std::fmt::Debug for BinFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinFile")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("header", &self.header)
            .field("cursor", &self.cursor)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

/// Parse the header of an existing file and reconcile its length
///
/// Returns `None` for an empty file. When `truncate` is set, bytes past the
/// last complete payload are cut off; otherwise they are ignored.
fn read_existing_header(
    file: &mut File,
    path: &Path,
    truncate: bool,
) -> Result<Option<BinFileHeader>> {
    let len = file
        .metadata()
        .map_err(Error::io("reading file metadata"))?
        .len();
    if len == 0 {
        return Ok(None);
    }
    if len < HEADER_SIZE as u64 {
        return Err(Error::Corrupted(format!(
            "{}: {len} bytes is shorter than the header",
            path.display()
        )));
    }

    let mut bytes = [0u8; HEADER_SIZE];
    file.read_exact(&mut bytes)
        .map_err(Error::io("reading header"))?;
    let header = BinFileHeader::from_bytes(&bytes)?;

    let expected = header.expected_file_len()?;
    if len < expected {
        return Err(Error::Corrupted(format!(
            "{}: header claims {} arrays ({expected} bytes) but file has {len} bytes",
            path.display(),
            header.n_samples
        )));
    }
    if len > expected {
        let extra = len - expected;
        if truncate {
            warn!(path = %path.display(), extra, "truncating bytes past the last recorded array");
            file.set_len(expected)
                .map_err(Error::io("truncating binary file"))?;
        } else {
            warn!(path = %path.display(), extra, "ignoring bytes past the last recorded array");
        }
    }
    Ok(Some(header))
}
