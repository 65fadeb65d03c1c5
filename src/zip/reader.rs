//! High-level read API over an archive.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, ZipError};
use crate::io::{FileSource, MemorySource, ReadAt};

use super::index::ArchiveIndex;
use super::structures::{CompressionMethod, EntryFlags, EntryRecord, LFH_SIGNATURE, LFH_SIZE};

/// Random-access reader over a ZIP archive.
///
/// Owns the backing byte source and an index over its central
/// directory. The index is built on the first [`names`] or [`data`]
/// call and cached for the reader's lifetime; the archive is assumed
/// not to change underneath it.
///
/// All methods take `&self`; a single internal lock serializes the
/// one-time index build, after which lookups only read shared state.
/// [`close`] releases the byte source early; the same happens on drop.
///
/// [`names`]: ZipReader::names
/// [`data`]: ZipReader::data
/// [`close`]: ZipReader::close
///
/// ## Example
///
/// ```no_run
/// use zipread::ZipReader;
///
/// fn main() -> zipread::Result<()> {
///     let reader = ZipReader::open("archive.zip")?;
///     for name in reader.names()? {
///         println!("{name}");
///     }
///     if let Some(bytes) = reader.data("readme.txt")? {
///         println!("{} bytes", bytes.len());
///     }
///     Ok(())
/// }
/// ```
pub struct ZipReader<S: ReadAt> {
    inner: Mutex<Inner<S>>,
}

struct Inner<S> {
    /// `None` once the reader has been closed.
    source: Option<Arc<S>>,
    index: Option<Arc<ArchiveIndex>>,
}

impl ZipReader<MemorySource> {
    /// Open an archive held in an owned byte buffer, without copying it.
    pub fn from_buffer(data: Vec<u8>) -> Result<Self> {
        Self::new(MemorySource::new(data)?)
    }
}

impl ZipReader<FileSource> {
    /// Open an archive file from the filesystem.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(FileSource::open(path.as_ref())?)
    }
}

impl<S: ReadAt> ZipReader<S> {
    /// Wrap an arbitrary byte source.
    ///
    /// Fails with [`ZipError::NotZip`] when the source has no end of
    /// central directory record; a source acquired for the attempt is
    /// dropped on that path.
    pub fn new(source: S) -> Result<Self> {
        ArchiveIndex::find_eocd(&source)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                source: Some(Arc::new(source)),
                index: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Source and index, building the index on first use.
    ///
    /// A failed build caches nothing, so a later call retries it.
    fn parts(&self) -> Result<(Arc<S>, Arc<ArchiveIndex>)> {
        let mut inner = self.lock();
        let source = inner.source.as_ref().ok_or(ZipError::ZipClosed)?.clone();
        let index = match &inner.index {
            Some(index) => index.clone(),
            None => {
                let index = Arc::new(ArchiveIndex::build(source.as_ref())?);
                inner.index = Some(index.clone());
                index
            }
        };
        Ok((source, index))
    }

    /// All entry names in the archive, in no particular order.
    ///
    /// Duplicate names in the central directory collapse to one.
    pub fn names(&self) -> Result<Vec<String>> {
        let (_, index) = self.parts()?;
        Ok(index.names().map(str::to_owned).collect())
    }

    /// All entry records, ordered by central directory position.
    pub fn entries(&self) -> Result<Vec<EntryRecord>> {
        let (_, index) = self.parts()?;
        let mut records: Vec<EntryRecord> = index.records().cloned().collect();
        records.sort_by_key(|r| r.index);
        Ok(records)
    }

    /// Extract the named entry, fully decompressed and CRC-verified.
    ///
    /// Returns `Ok(None)` when no entry has that name; a miss is a
    /// normal outcome, not an error.
    pub fn data(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let (source, index) = self.parts()?;
        let Some(entry) = index.get(name) else {
            return Ok(None);
        };

        if entry.flags.is_encrypted() {
            return Err(ZipError::EncryptionMethodNotSupported);
        }

        let data_offset = validate_local_header(source.as_ref(), entry)?;
        let payload_end = data_offset
            .checked_add(entry.compressed_size)
            .ok_or(ZipError::Inconsistent)?;
        if payload_end > source.size() {
            return Err(ZipError::Eof);
        }

        let mut payload = vec![0u8; entry.compressed_size as usize];
        source.read_exact_at(data_offset, &mut payload)?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => {
                if entry.compressed_size != entry.uncompressed_size {
                    return Err(ZipError::Inconsistent);
                }
                payload
            }
            CompressionMethod::Deflate => inflate(&payload, entry.uncompressed_size)?,
            CompressionMethod::Unsupported(method) => {
                tracing::debug!(method, name, "unsupported compression method");
                return Err(ZipError::CompressionMethodNotSupported);
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ZipError::Inconsistent);
        }
        if crc32fast::hash(&data) != entry.crc32 {
            return Err(ZipError::Crc);
        }

        Ok(Some(data))
    }

    /// Release the backing byte source and the cached index.
    ///
    /// Idempotent; any later call on this reader fails with
    /// [`ZipError::ZipClosed`]. Dropping the reader has the same effect.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.source = None;
        inner.index = None;
    }
}

/// Read the local file header and cross-check it against the central
/// directory record, returning the payload offset.
///
/// The local header's variable-length fields (filename, extra field)
/// may differ in length from the central directory's, so the payload
/// offset can only come from here. Declared method, CRC and sizes must
/// agree with the record; entries written with a trailing data
/// descriptor legitimately leave CRC and sizes zero in the local
/// header, and ZIP64 entries may use size sentinels, so those cases are
/// exempted from the cross-check.
fn validate_local_header<S: ReadAt>(source: &S, entry: &EntryRecord) -> Result<u64> {
    let mut lfh_buf = vec![0u8; LFH_SIZE];
    source.read_exact_at(entry.lfh_offset, &mut lfh_buf)?;

    if &lfh_buf[0..4] != LFH_SIGNATURE {
        return Err(ZipError::Inconsistent);
    }

    let mut cursor = Cursor::new(&lfh_buf[4..]);
    let eof = |_| ZipError::Eof;
    let _version_needed = cursor.read_u16::<LittleEndian>().map_err(eof)?;
    let flags = EntryFlags(cursor.read_u16::<LittleEndian>().map_err(eof)?);
    let method = cursor.read_u16::<LittleEndian>().map_err(eof)?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>().map_err(eof)?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>().map_err(eof)?;
    let crc32 = cursor.read_u32::<LittleEndian>().map_err(eof)?;
    let compressed_size = cursor.read_u32::<LittleEndian>().map_err(eof)?;
    let uncompressed_size = cursor.read_u32::<LittleEndian>().map_err(eof)?;
    let file_name_length = cursor.read_u16::<LittleEndian>().map_err(eof)? as u64;
    let extra_field_length = cursor.read_u16::<LittleEndian>().map_err(eof)? as u64;

    if method != entry.compression_method.as_u16() {
        return Err(ZipError::Inconsistent);
    }
    if !flags.uses_data_descriptor() {
        let size_matches =
            |local: u32, central: u64| local == u32::MAX || u64::from(local) == central;
        if crc32 != entry.crc32
            || !size_matches(compressed_size, entry.compressed_size)
            || !size_matches(uncompressed_size, entry.uncompressed_size)
        {
            tracing::debug!(name = %entry.name, "local header disagrees with central directory");
            return Err(ZipError::Inconsistent);
        }
    }

    Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
}

/// Inflate a raw DEFLATE stream, sizing the output from the entry
/// metadata.
fn inflate(payload: &[u8], expected_size: u64) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(expected_size as usize);
    let mut decoder = DeflateDecoder::new(payload);
    decoder.read_to_end(&mut data).map_err(ZipError::Zlib)?;
    Ok(data)
}
