//! Central directory indexing.
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//!
//! [`ArchiveIndex::build`] runs all three steps in one pass over the
//! source and produces a name-to-record map. Every offset taken from the
//! archive is validated against the source length before it is read.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{Cursor, Read};

use crate::error::{Result, ZipError};
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Immutable mapping from entry name to its central directory record.
///
/// When the central directory carries several entries under the same
/// name, the last one wins; its `index` still reflects its own position
/// in the directory.
pub struct ArchiveIndex {
    entries: HashMap<String, EntryRecord>,
}

impl ArchiveIndex {
    /// Parse the archive's central directory into an index.
    ///
    /// A failed build leaves nothing behind; there is no partially
    /// usable index.
    pub fn build<S: ReadAt>(source: &S) -> Result<Self> {
        let (eocd, eocd_offset) = Self::find_eocd(source)?;

        // Resolve directory location, promoting to ZIP64 when the EOCD
        // carries sentinel values.
        let (disks, cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = Self::read_zip64_eocd(source, eocd_offset)?;
            tracing::debug!(entries = eocd64.total_entries, "using ZIP64 central directory");
            (
                (eocd64.disk_number, eocd64.disk_with_cd, eocd64.disk_entries),
                eocd64.cd_offset,
                eocd64.cd_size,
                eocd64.total_entries,
            )
        } else {
            (
                (
                    eocd.disk_number as u32,
                    eocd.disk_with_cd as u32,
                    eocd.disk_entries as u64,
                ),
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let (disk_number, disk_with_cd, disk_entries) = disks;
        if disk_number != 0 || disk_with_cd != 0 || disk_entries != total_entries {
            return Err(ZipError::Multidisk);
        }

        // The directory must fit inside the source and end before the
        // EOCD that describes it.
        let cd_end = cd_offset.checked_add(cd_size).ok_or(ZipError::Inconsistent)?;
        if cd_end > source.size() {
            return Err(ZipError::Eof);
        }
        if cd_end > eocd_offset {
            return Err(ZipError::Inconsistent);
        }
        // Each record is at least CDFH_MIN_SIZE bytes, which bounds the
        // credible entry count for a directory of this size.
        if total_entries.checked_mul(CDFH_MIN_SIZE as u64).ok_or(ZipError::Inconsistent)?
            > cd_size
        {
            return Err(ZipError::Inconsistent);
        }

        let mut cd_data = vec![0u8; cd_size as usize];
        source.read_exact_at(cd_offset, &mut cd_data)?;

        let mut entries = HashMap::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for index in 0..total_entries {
            let record = Self::parse_cdfh(&mut cursor, index, cd_offset)?;
            entries.insert(record.name.clone(), record);
        }

        tracing::debug!(
            records = total_entries,
            names = entries.len(),
            "central directory parsed"
        );

        Ok(Self { entries })
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the exact tail position first (no archive comment), then
    /// falls back to a bounded backward scan over the last 64 KiB. A
    /// candidate signature only counts when its comment length field
    /// matches the bytes that remain after it.
    ///
    /// Fails with [`ZipError::NotZip`] when no valid EOCD exists within
    /// the scan window.
    pub(crate) fn find_eocd<S: ReadAt>(
        source: &S,
    ) -> Result<(EndOfCentralDirectory, u64)> {
        let size = source.size();
        if size < EndOfCentralDirectory::SIZE as u64 {
            return Err(ZipError::NotZip);
        }

        // Common case: no comment, EOCD flush against the end.
        let offset = size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        source.read_exact_at(offset, &mut buf)?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        // EOCD not at the expected location; a trailing comment may have
        // pushed it back. Scan backward within the maximum comment span.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(size);
        let search_start = size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        source.read_exact_at(search_start, &mut buf)?;

        for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(
                        &buf[i..i + EndOfCentralDirectory::SIZE],
                    )?;
                    tracing::debug!(offset = search_start + i as u64, "EOCD found behind comment");
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        Err(ZipError::NotZip)
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD carries sentinel fields. The ZIP64
    /// EOCD Locator sits immediately before the regular EOCD and points
    /// at the ZIP64 EOCD itself.
    fn read_zip64_eocd<S: ReadAt>(source: &S, eocd_offset: u64) -> Result<Zip64EOCD> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or(ZipError::Inconsistent)?;
        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        source.read_exact_at(locator_offset, &mut locator_buf)?;

        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;
        if locator.total_disks > 1 {
            return Err(ZipError::Multidisk);
        }
        if locator.eocd64_offset + Zip64EOCD::MIN_SIZE as u64 > locator_offset {
            return Err(ZipError::Inconsistent);
        }

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        source.read_exact_at(locator.eocd64_offset, &mut eocd64_buf)?;

        Zip64EOCD::from_bytes(&eocd64_buf)
    }

    /// Parse one Central Directory File Header from the cursor.
    ///
    /// `index` is the record's position in the directory; `cd_offset`
    /// bounds the local header offsets the record may refer to.
    fn parse_cdfh(
        cursor: &mut Cursor<&[u8]>,
        index: u64,
        cd_offset: u64,
    ) -> Result<EntryRecord> {
        let eof = |_| ZipError::Eof;

        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig).map_err(eof)?;
        if sig != CDFH_SIGNATURE {
            return Err(ZipError::Inconsistent);
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let _version_needed = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let flags = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let compression_method = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let last_mod_time = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let last_mod_date = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let crc32 = cursor.read_u32::<LittleEndian>().map_err(eof)?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>().map_err(eof)? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>().map_err(eof)? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let extra_field_length = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let file_comment_length = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>().map_err(eof)?;
        let _external_attrs = cursor.read_u32::<LittleEndian>().map_err(eof)?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>().map_err(eof)? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes).map_err(eof)?;
        // Names must decode as UTF-8; raw bytes are not retained.
        let name = String::from_utf8(file_name_bytes).map_err(|_| ZipError::Internal)?;

        let is_directory = name.ends_with('/');

        // Walk the extra field for the ZIP64 extended information block
        // (header id 0x0001). Its values are present only for fields the
        // fixed header left at their sentinel.
        let extra_field_end = cursor
            .position()
            .checked_add(extra_field_length as u64)
            .ok_or(ZipError::Inconsistent)?;
        if extra_field_end > cursor.get_ref().len() as u64 {
            return Err(ZipError::Eof);
        }

        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>().map_err(eof)?;
            let field_size = cursor.read_u16::<LittleEndian>().map_err(eof)?;

            if header_id == 0x0001 {
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>().map_err(eof)?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    compressed_size = cursor.read_u64::<LittleEndian>().map_err(eof)?;
                }
                if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    lfh_offset = cursor.read_u64::<LittleEndian>().map_err(eof)?;
                }
                break;
            }
            cursor.set_position(
                (cursor.position() + field_size as u64).min(extra_field_end),
            );
        }

        cursor.set_position(extra_field_end);
        cursor.set_position(cursor.position() + file_comment_length as u64);
        if cursor.position() > cursor.get_ref().len() as u64 {
            return Err(ZipError::Eof);
        }

        // Local headers always precede the central directory.
        if lfh_offset.checked_add(LFH_SIZE as u64).ok_or(ZipError::Inconsistent)? > cd_offset {
            return Err(ZipError::Inconsistent);
        }

        Ok(EntryRecord {
            name,
            index,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            flags: EntryFlags(flags),
            lfh_offset,
            last_mod_time,
            last_mod_date,
            is_directory,
        })
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&EntryRecord> {
        self.entries.get(name)
    }

    /// All indexed entry names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All indexed records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &EntryRecord> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
